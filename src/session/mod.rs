pub mod draft;
pub mod history;
pub mod lifecycle;
pub mod ticker;

pub mod app;
pub mod format;
pub mod render;

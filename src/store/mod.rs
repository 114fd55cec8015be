pub mod json_file;
pub mod memory;

use thiserror::Error;

use crate::models::session::SessionRecord;

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read session history: {0}")]
    ReadFailure(String),
    #[error("failed to write session history: {0}")]
    WriteFailure(String),
}

/// Key-value style persistence for the full session list.
///
/// `save` always overwrites the stored collection with the list it is given,
/// newest session first.
pub trait SessionStore {
    fn load(&self) -> Result<Vec<SessionRecord>, StoreError>;
    fn save(&self, sessions: &[SessionRecord]) -> Result<(), StoreError>;
}

/// Loads the stored history, treating any read failure as an empty history.
pub fn load_or_empty(store: &dyn SessionStore) -> Vec<SessionRecord> {
    match store.load() {
        Ok(sessions) => {
            log::info!("Loaded {} sessions from store", sessions.len());
            sessions
        }
        Err(e) => {
            log::error!("{}", e);
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct BrokenStore;

    impl SessionStore for BrokenStore {
        fn load(&self) -> Result<Vec<SessionRecord>, StoreError> {
            Err(StoreError::ReadFailure("unreadable".to_string()))
        }

        fn save(&self, _sessions: &[SessionRecord]) -> Result<(), StoreError> {
            Err(StoreError::WriteFailure("read-only".to_string()))
        }
    }

    #[test]
    fn test_read_failure_yields_empty_history() {
        assert!(load_or_empty(&BrokenStore).is_empty());
    }

    #[test]
    fn test_error_messages() {
        let read = StoreError::ReadFailure("bad json".to_string());
        let write = StoreError::WriteFailure("disk full".to_string());
        assert_eq!(read.to_string(), "failed to read session history: bad json");
        assert_eq!(write.to_string(), "failed to write session history: disk full");
    }
}

use std::sync::{Arc, Mutex};

use crate::models::session::SessionRecord;
use crate::store::{SessionStore, StoreError};

/// Non-persistent store. Clones share the same backing list.
#[derive(Clone, Default)]
pub struct MemoryStore {
    sessions: Arc<Mutex<Vec<SessionRecord>>>,
    fail_writes: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn with_sessions(sessions: Vec<SessionRecord>) -> Self {
        Self {
            sessions: Arc::new(Mutex::new(sessions)),
            fail_writes: false,
        }
    }

    /// A store whose every `save` fails, leaving its contents untouched.
    #[cfg(test)]
    pub fn failing_writes() -> Self {
        Self {
            fail_writes: true,
            ..Self::default()
        }
    }

    #[cfg(test)]
    pub fn snapshot(&self) -> Vec<SessionRecord> {
        self.sessions.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

impl SessionStore for MemoryStore {
    fn load(&self) -> Result<Vec<SessionRecord>, StoreError> {
        self.sessions
            .lock()
            .map(|s| s.clone())
            .map_err(|e| StoreError::ReadFailure(e.to_string()))
    }

    fn save(&self, sessions: &[SessionRecord]) -> Result<(), StoreError> {
        if self.fail_writes {
            return Err(StoreError::WriteFailure("memory store is read-only".to_string()));
        }
        let mut stored = self
            .sessions
            .lock()
            .map_err(|e| StoreError::WriteFailure(e.to_string()))?;
        *stored = sessions.to_vec();
        Ok(())
    }
}

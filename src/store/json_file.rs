use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::models::session::SessionRecord;
use crate::store::{SessionStore, StoreError};

/// Session history kept as a single JSON array on disk.
///
/// Writes go to a sibling `.tmp` file first and are renamed over the target,
/// so a crash mid-write leaves the previous history intact.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "sessions.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl SessionStore for JsonFileStore {
    fn load(&self) -> Result<Vec<SessionRecord>, StoreError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::debug!("No session history at {}", self.path.display());
                return Ok(Vec::new());
            }
            Err(e) => {
                return Err(StoreError::ReadFailure(format!("{}: {}", self.path.display(), e)));
            }
        };

        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        serde_json::from_str(&content)
            .map_err(|e| StoreError::ReadFailure(format!("{}: {}", self.path.display(), e)))
    }

    fn save(&self, sessions: &[SessionRecord]) -> Result<(), StoreError> {
        let write_err = |e: String| StoreError::WriteFailure(format!("{}: {}", self.path.display(), e));

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| write_err(e.to_string()))?;
        }

        let json = serde_json::to_string_pretty(sessions).map_err(|e| write_err(e.to_string()))?;
        let tmp = self.tmp_path();
        fs::write(&tmp, json).map_err(|e| write_err(e.to_string()))?;
        fs::rename(&tmp, &self.path).map_err(|e| write_err(e.to_string()))?;

        log::debug!("Saved {} sessions to {}", sessions.len(), self.path.display());
        Ok(())
    }
}

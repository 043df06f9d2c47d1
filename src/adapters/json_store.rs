//! JSON file snapshot store.

use std::ffi::OsString;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::domain::error::FundMirrorError;
use crate::domain::snapshot::{Snapshot, SnapshotPatch};
use crate::ports::snapshot_port::SnapshotStore;

/// Keeps the ledger in a single pretty-printed JSON document.
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

    fn temp_path(&self) -> PathBuf {
        let mut name = OsString::from(self.path.as_os_str());
        name.push(".tmp");
        PathBuf::from(name)
    }
}

impl SnapshotStore for JsonFileStore {
    fn load(&self) -> Result<Option<SnapshotPatch>, FundMirrorError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(FundMirrorError::Storage {
                    reason: format!("failed to read {}: {}", self.path.display(), e),
                });
            }
        };
        if content.trim().is_empty() {
            return Ok(None);
        }
        tracing::debug!(path = %self.path.display(), "loading snapshot");
        SnapshotPatch::from_json(&content).map(Some)
    }

    /// Writes to a sibling temp file first, then renames it over the target.
    fn save(&self, snapshot: &Snapshot) -> Result<(), FundMirrorError> {
        let json = snapshot.to_json_pretty()?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| FundMirrorError::Storage {
                reason: format!("failed to create {}: {}", parent.display(), e),
            })?;
        }
        let temp = self.temp_path();
        fs::write(&temp, json).map_err(|e| FundMirrorError::Storage {
            reason: format!("failed to write {}: {}", temp.display(), e),
        })?;
        fs::rename(&temp, &self.path).map_err(|e| FundMirrorError::Storage {
            reason: format!("failed to replace {}: {}", self.path.display(), e),
        })?;
        tracing::debug!(path = %self.path.display(), "saved snapshot");
        Ok(())
    }
}

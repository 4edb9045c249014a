//! File store
//!
//! Persists inbound file payloads under one directory, keyed by file name.
//! A later file with the same name overwrites the earlier one.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::StoreError;

/// Default directory for received files
pub const DEFAULT_STORAGE_DIR: &str = "received_files";

#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Target path for a client-supplied file name
    ///
    /// Only the final path component is kept so a name can never escape the
    /// storage directory.
    pub fn path_for(&self, name: &str) -> Result<PathBuf, StoreError> {
        let file_name = Path::new(name)
            .file_name()
            .filter(|n| !n.is_empty())
            .ok_or_else(|| StoreError::InvalidName(name.to_string()))?;
        Ok(self.dir.join(file_name))
    }

    /// Write `data` to `<dir>/<name>`, creating the directory on demand
    pub async fn save(&self, name: &str, data: &[u8]) -> Result<PathBuf, StoreError> {
        let path = self.path_for(name)?;
        tokio::fs::create_dir_all(&self.dir).await?;
        tokio::fs::write(&path, data).await?;
        debug!("Stored {} bytes at {}", data.len(), path.display());
        Ok(path)
    }
}

impl Default for FileStore {
    fn default() -> Self {
        Self::new(DEFAULT_STORAGE_DIR)
    }
}

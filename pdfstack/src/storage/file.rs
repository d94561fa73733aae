//! Directory-backed key/value store.
//!
//! Each key is a `<key>.json` file in the state directory. Writes are
//! atomic: the value goes to a temp file first and is then renamed over
//! the target, so a crash never leaves half a record behind.

use std::io::Write;
use std::path::{Path, PathBuf};

use super::KeyValueStore;
use crate::error::{PdfStackError, Result};

/// Durable store rooted at a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Create a store rooted at `root`. The directory is created lazily on
    /// the first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory holding the records.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

        if !valid {
            return Err(PdfStackError::storage(key, "invalid storage key"));
        }

        Ok(self.root.join(format!("{key}.json")))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key)?;

        match std::fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(PdfStackError::FileNotAccessible { path, source: e }),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key)?;

        std::fs::create_dir_all(&self.root).map_err(|e| PdfStackError::FailedToCreateOutput {
            path: self.root.clone(),
            source: e,
        })?;

        let temp_path = path.with_extension("json.tmp");

        let mut file =
            std::fs::File::create(&temp_path).map_err(|e| PdfStackError::FailedToCreateOutput {
                path: temp_path.clone(),
                source: e,
            })?;

        file.write_all(value.as_bytes())
            .and_then(|_| file.sync_all())
            .map_err(|e| PdfStackError::FailedToWrite {
                path: temp_path.clone(),
                source: e,
            })?;

        std::fs::rename(&temp_path, &path)
            .map_err(|e| PdfStackError::FailedToWrite { path, source: e })?;

        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;

        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(PdfStackError::FailedToWrite { path, source: e }),
        }
    }
}

//! Durable key/value storage behind a typed repository.
//!
//! Persisted state lives under string keys, like browser local storage.
//! Business logic never touches the raw JSON: each persisted shape is a
//! [`Record`] with a fixed key, and the [`Repository`] converts between
//! records and the untyped [`KeyValueStore`] underneath.
//!
//! # Examples
//!
//! ```
//! use pdfstack::storage::{MemoryStore, Repository, FileListRecord};
//!
//! # fn example() -> pdfstack::Result<()> {
//! let repo = Repository::new(MemoryStore::new());
//! repo.save(&FileListRecord(vec!["a.pdf".to_string()]))?;
//!
//! let names = repo.load::<FileListRecord>()?.unwrap_or_default();
//! assert_eq!(names.0, vec!["a.pdf".to_string()]);
//! # Ok(())
//! # }
//! ```

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::sync::Arc;

use crate::error::{PdfStackError, Result};

/// Untyped string storage addressed by key.
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<()>;
}

/// A persisted shape stored as JSON under a fixed key.
pub trait Record: Serialize + DeserializeOwned {
    /// Storage key of this record.
    const KEY: &'static str;
}

/// Typed access to a [`KeyValueStore`].
///
/// Cloning a repository is cheap and every clone talks to the same store.
#[derive(Clone)]
pub struct Repository {
    store: Arc<dyn KeyValueStore>,
}

impl Repository {
    /// Wrap a store.
    pub fn new(store: impl KeyValueStore + 'static) -> Self {
        Self {
            store: Arc::new(store),
        }
    }

    /// Load a record, or `None` if it was never saved.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the stored JSON does not match the record.
    pub fn load<R: Record>(&self) -> Result<Option<R>> {
        let Some(raw) = self.store.get(R::KEY)? else {
            return Ok(None);
        };

        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| PdfStackError::storage(R::KEY, format!("malformed JSON: {e}")))
    }

    /// Serialize and store a record.
    pub fn save<R: Record>(&self, record: &R) -> Result<()> {
        let raw = serde_json::to_string(record)
            .map_err(|e| PdfStackError::storage(R::KEY, e.to_string()))?;

        tracing::debug!(key = R::KEY, bytes = raw.len(), "persisting record");
        self.store.set(R::KEY, &raw)
    }

    /// Remove a record.
    pub fn delete<R: Record>(&self) -> Result<()> {
        tracing::debug!(key = R::KEY, "removing record");
        self.store.remove(R::KEY)
    }
}

/// Names of the currently selected files, in order.
///
/// Display-only: it carries no file contents, so a restored list can
/// only be shown as placeholders.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileListRecord(pub Vec<String>);

impl Record for FileListRecord {
    const KEY: &'static str = "pdfFileList";
}

//! Merge history keyed by output name.
//!
//! Persisted under `mergeHistory` as a JSON object mapping each name to
//! `{ "url": <reference handle>, "timestamp": <epoch ms> }`. Object key
//! order is insertion order, and re-recording an existing name updates
//! it in place.

use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::blob::{BlobRegistry, ReferenceHandle};
use crate::config::SortOrder;
use crate::error::{PdfStackError, Result};
use crate::io::write_to;
use crate::platform::Platform;
use crate::storage::{Record, Repository};
use crate::utils::{check_file_name, sanitize_merge_name};

/// One past merge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    /// Output name, unique within the history.
    pub name: String,
    /// Where the merged bytes live, if this session still has them.
    pub reference: ReferenceHandle,
    /// When the merge happened, in epoch milliseconds.
    pub timestamp: i64,
}

/// Value half of a persisted entry.
#[derive(Serialize, Deserialize)]
struct StoredEntry {
    url: ReferenceHandle,
    #[serde(default)]
    timestamp: i64,
}

/// The persisted history: entries in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryRecord {
    entries: Vec<HistoryEntry>,
}

impl HistoryRecord {
    /// Entries in insertion order.
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.name == name)
    }

    /// Insert or replace by name. Returns the replaced entry.
    fn upsert(&mut self, entry: HistoryEntry) -> Option<HistoryEntry> {
        match self.position(&entry.name) {
            Some(index) => Some(std::mem::replace(&mut self.entries[index], entry)),
            None => {
                self.entries.push(entry);
                None
            }
        }
    }
}

impl Record for HistoryRecord {
    const KEY: &'static str = "mergeHistory";
}

impl Serialize for HistoryRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for entry in &self.entries {
            map.serialize_entry(
                &entry.name,
                &StoredEntry {
                    url: entry.reference.clone(),
                    timestamp: entry.timestamp,
                },
            )?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for HistoryRecord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct HistoryVisitor;

        impl<'de> Visitor<'de> for HistoryVisitor {
            type Value = HistoryRecord;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of merge names to {url, timestamp}")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> std::result::Result<Self::Value, A::Error> {
                let mut record = HistoryRecord::default();
                while let Some((name, stored)) = access.next_entry::<String, StoredEntry>()? {
                    record.upsert(HistoryEntry {
                        name,
                        reference: stored.url,
                        timestamp: stored.timestamp,
                    });
                }
                Ok(record)
            }

            fn visit_unit<E: de::Error>(self) -> std::result::Result<Self::Value, E> {
                Ok(HistoryRecord::default())
            }
        }

        deserializer.deserialize_any(HistoryVisitor)
    }
}

/// Whether an entry's bytes can still be reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability {
    /// The reference resolves in this session.
    Available,
    /// The reference was created by an earlier session.
    ContentUnavailable,
}

/// An entry as listed, with its availability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryListing {
    /// The entry.
    pub entry: HistoryEntry,
    /// Whether its content can be opened.
    pub availability: Availability,
}

impl HistoryListing {
    /// Whether the entry's bytes are reachable.
    pub fn is_available(&self) -> bool {
        self.availability == Availability::Available
    }
}

/// Name-keyed record of past merges.
pub struct HistoryStore {
    repo: Repository,
    record: HistoryRecord,
}

impl HistoryStore {
    /// Open the history persisted in `repo`.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the persisted history is malformed.
    pub fn load(repo: Repository) -> Result<Self> {
        let record = repo.load::<HistoryRecord>()?.unwrap_or_default();
        tracing::debug!(entries = record.entries.len(), "loaded merge history");
        Ok(Self { repo, record })
    }

    /// Record a merge. An existing entry with the same name is replaced in place.
    ///
    /// Returns the reference of the replaced entry so its bytes can be released.
    pub fn record(
        &mut self,
        name: &str,
        reference: ReferenceHandle,
        timestamp: i64,
    ) -> Result<Option<ReferenceHandle>> {
        let replaced = self.record.upsert(HistoryEntry {
            name: name.to_string(),
            reference,
            timestamp,
        });
        self.persist()?;
        Ok(replaced.map(|entry| entry.reference))
    }

    /// All entries sorted by timestamp. Equal timestamps keep insertion order.
    pub fn list(&self, sort: SortOrder, blobs: &BlobRegistry) -> Vec<HistoryListing> {
        let mut entries = self.record.entries.clone();
        match sort {
            SortOrder::Newest => entries.sort_by_key(|e| std::cmp::Reverse(e.timestamp)),
            SortOrder::Oldest => entries.sort_by_key(|e| e.timestamp),
        }

        entries
            .into_iter()
            .map(|entry| {
                let availability = if blobs.is_live(&entry.reference) {
                    Availability::Available
                } else {
                    Availability::ContentUnavailable
                };
                HistoryListing {
                    entry,
                    availability,
                }
            })
            .collect()
    }

    /// Look up an entry.
    pub fn get(&self, name: &str) -> Option<&HistoryEntry> {
        self.record.entries.iter().find(|e| e.name == name)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.record.entries.len()
    }

    /// Whether there is no history.
    pub fn is_empty(&self) -> bool {
        self.record.entries.is_empty()
    }

    /// Remove an entry. Returns whether it existed.
    pub fn delete(&mut self, name: &str) -> Result<bool> {
        let Some(index) = self.record.position(name) else {
            return Ok(false);
        };

        self.record.entries.remove(index);
        self.persist()?;
        Ok(true)
    }

    /// Give an entry a new name, keeping its reference, timestamp and position.
    ///
    /// `.pdf` is appended to `new_name` when missing. Returns the final name.
    ///
    /// # Errors
    ///
    /// Fails if `name` is unknown, `new_name` is blank or not a plain file
    /// name, or another entry already uses the new name.
    pub fn rename(&mut self, name: &str, new_name: &str) -> Result<String> {
        let index = self
            .record
            .position(name)
            .ok_or_else(|| PdfStackError::entry_not_found(name))?;

        if new_name.trim().is_empty() {
            return Err(PdfStackError::other("New name cannot be empty"));
        }

        let new_name = sanitize_merge_name(new_name)?;
        if new_name == name {
            return Ok(new_name);
        }

        if self.record.position(&new_name).is_some() {
            return Err(PdfStackError::HistoryNameTaken { name: new_name });
        }

        self.record.entries[index].name = new_name.clone();
        self.persist()?;
        tracing::debug!(from = name, to = %new_name, "renamed history entry");
        Ok(new_name)
    }

    /// The entry named `name` and its bytes.
    ///
    /// # Errors
    ///
    /// [`PdfStackError::EntryNotFound`] for unknown names and
    /// [`PdfStackError::ContentUnavailable`] when the bytes belong to an
    /// earlier session.
    pub fn content(&self, name: &str, blobs: &BlobRegistry) -> Result<(&HistoryEntry, Arc<[u8]>)> {
        let entry = self
            .get(name)
            .ok_or_else(|| PdfStackError::entry_not_found(name))?;

        let bytes = blobs
            .resolve(&entry.reference)
            .ok_or_else(|| PdfStackError::content_unavailable(name))?;

        Ok((entry, bytes))
    }

    /// Hand an entry to the platform share surface.
    ///
    /// The bytes are exported into `export_dir` under the entry name and
    /// the exported file is passed to `platform`. Returns the exported path.
    pub async fn share(
        &self,
        name: &str,
        blobs: &BlobRegistry,
        platform: &dyn Platform,
        export_dir: &Path,
    ) -> Result<PathBuf> {
        let (entry, bytes) = self.content(name, blobs)?;
        let path = export(export_dir, &entry.name, bytes).await?;

        platform.share(&path)?;
        Ok(path)
    }

    fn persist(&self) -> Result<()> {
        self.repo.save(&self.record)
    }
}

/// Write `bytes` as `name` inside `dir`, replacing an earlier export.
pub(crate) async fn export(dir: &Path, name: &str, bytes: Arc<[u8]>) -> Result<PathBuf> {
    check_file_name(name)?;
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| PdfStackError::FailedToCreateOutput {
            path: dir.to_path_buf(),
            source: e,
        })?;

    Ok(write_to(dir.join(name), bytes).await?.path)
}

//! The history list and its per-entry actions.
//!
//! Rename, share and delete live behind an overflow menu. At most one menu
//! is open at a time, and any action closes it.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::blob::BlobRegistry;
use crate::config::SortOrder;
use crate::error::{PdfStackError, Result};
use crate::history::save::{PDF_FILTER, SavePicker};
use crate::history::store::{Availability, HistoryStore, export};
use crate::io::{OutputWriter, WrittenFile, write_to};
use crate::output::Notifier;
use crate::platform::Platform;
use crate::utils::format_timestamp;

/// Notice shown after a successful save.
pub const SAVE_SUCCESS_NOTICE: &str = "Saved to disk!";

/// Notice shown when a save fails or the user backs out.
pub const SAVE_FAILURE_NOTICE: &str = "Save failed or cancelled.";

/// Something that can be done to a history entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowAction {
    /// Open in the default viewer.
    Open,
    /// Write into the download directory.
    Download,
    /// Ask where to save, then write there.
    Save,
    /// Give the entry a new name.
    Rename,
    /// Hand the file to the platform share surface.
    Share,
    /// Remove the entry.
    Delete,
}

impl RowAction {
    /// Actions shown directly on the row.
    pub const INLINE: [RowAction; 3] = [Self::Open, Self::Download, Self::Save];

    /// Actions behind the overflow menu.
    pub const MENU: [RowAction; 3] = [Self::Rename, Self::Share, Self::Delete];

    /// Whether this action lives in the overflow menu.
    pub fn in_menu(self) -> bool {
        Self::MENU.contains(&self)
    }

    /// Whether the action needs the entry's bytes.
    pub fn needs_content(self) -> bool {
        matches!(self, Self::Open | Self::Download | Self::Save | Self::Share)
    }

    /// Label shown to the user.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Download => "download",
            Self::Save => "save",
            Self::Rename => "rename",
            Self::Share => "share",
            Self::Delete => "delete",
        }
    }
}

/// One rendered history row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRow {
    /// Entry name.
    pub name: String,
    /// Merge time in epoch milliseconds.
    pub timestamp: i64,
    /// Merge time in local time.
    pub time: String,
    /// Whether the bytes are reachable.
    pub availability: Availability,
    /// Whether this row's overflow menu is open.
    pub menu_open: bool,
}

impl HistoryRow {
    /// Actions that can currently be taken on this row.
    pub fn actions(&self) -> Vec<RowAction> {
        RowAction::INLINE
            .into_iter()
            .chain(RowAction::MENU)
            .filter(|action| {
                self.availability == Availability::Available || !action.needs_content()
            })
            .collect()
    }
}

/// Drives the history list.
pub struct HistoryPanel {
    open_menu: Option<String>,
    platform: Arc<dyn Platform>,
    writer: OutputWriter,
    download_dir: PathBuf,
    export_dir: PathBuf,
}

impl HistoryPanel {
    /// Create a panel.
    ///
    /// Downloads land in `download_dir`. Files opened or shared are
    /// exported to `export_dir` first.
    pub fn new(
        platform: Arc<dyn Platform>,
        writer: OutputWriter,
        download_dir: impl Into<PathBuf>,
        export_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            open_menu: None,
            platform,
            writer,
            download_dir: download_dir.into(),
            export_dir: export_dir.into(),
        }
    }

    /// Name of the entry whose menu is open.
    pub fn open_menu(&self) -> Option<&str> {
        self.open_menu.as_deref()
    }

    /// Flip the menu of `name`, closing any other.
    pub fn toggle_menu(&mut self, name: &str) {
        self.open_menu = match self.open_menu.take() {
            Some(open) if open == name => None,
            _ => Some(name.to_string()),
        };
    }

    /// Close every menu.
    pub fn dismiss_menus(&mut self) {
        self.open_menu = None;
    }

    /// The history as rows, in `sort` order.
    pub fn rows(&self, store: &HistoryStore, sort: SortOrder, blobs: &BlobRegistry) -> Vec<HistoryRow> {
        store
            .list(sort, blobs)
            .into_iter()
            .map(|listing| HistoryRow {
                menu_open: self.open_menu.as_deref() == Some(listing.entry.name.as_str()),
                time: format_timestamp(listing.entry.timestamp),
                timestamp: listing.entry.timestamp,
                name: listing.entry.name,
                availability: listing.availability,
            })
            .collect()
    }

    /// Export the entry and open it with the platform viewer.
    pub async fn open(&mut self, store: &HistoryStore, blobs: &BlobRegistry, name: &str) -> Result<PathBuf> {
        self.dismiss_menus();
        let (entry, bytes) = store.content(name, blobs)?;
        let path = export(&self.export_dir, &entry.name, bytes).await?;

        self.platform.open(&path)?;
        Ok(path)
    }

    /// Write the entry into the download directory.
    pub async fn download(
        &mut self,
        store: &HistoryStore,
        blobs: &BlobRegistry,
        name: &str,
    ) -> Result<WrittenFile> {
        self.dismiss_menus();
        let (entry, bytes) = store.content(name, blobs)?;
        self.writer.write(&self.download_dir, &entry.name, bytes).await
    }

    /// Ask `picker` for a destination and write the entry there.
    ///
    /// Returns `None` if the user cancelled. Success and failure are both
    /// reported through `notifier`.
    pub async fn save(
        &mut self,
        store: &HistoryStore,
        blobs: &BlobRegistry,
        name: &str,
        picker: &mut dyn SavePicker,
        notifier: &dyn Notifier,
    ) -> Result<Option<PathBuf>> {
        self.dismiss_menus();

        match Self::save_to_picked(store, blobs, name, picker).await {
            Ok(Some(path)) => {
                notifier.alert(SAVE_SUCCESS_NOTICE);
                Ok(Some(path))
            }
            Ok(None) => {
                tracing::error!(name, "save cancelled");
                notifier.alert(SAVE_FAILURE_NOTICE);
                Ok(None)
            }
            Err(e) => {
                tracing::error!(name, error = %e, "save failed");
                notifier.alert(SAVE_FAILURE_NOTICE);
                Err(e)
            }
        }
    }

    async fn save_to_picked(
        store: &HistoryStore,
        blobs: &BlobRegistry,
        name: &str,
        picker: &mut dyn SavePicker,
    ) -> Result<Option<PathBuf>> {
        let (entry, bytes) = store.content(name, blobs)?;
        let Some(path) = picker.pick(&entry.name, &PDF_FILTER)? else {
            return Ok(None);
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            create_dir(parent).await?;
        }

        Ok(Some(write_to(path, bytes).await?.path))
    }

    /// Rename the entry. Returns the final name.
    pub fn rename(&mut self, store: &mut HistoryStore, name: &str, new_name: &str) -> Result<String> {
        self.dismiss_menus();
        store.rename(name, new_name)
    }

    /// Hand the entry to the platform share surface.
    pub async fn share(&mut self, store: &HistoryStore, blobs: &BlobRegistry, name: &str) -> Result<PathBuf> {
        self.dismiss_menus();
        store
            .share(name, blobs, self.platform.as_ref(), &self.export_dir)
            .await
    }

    /// Remove the entry. Returns whether it existed.
    pub fn delete(&mut self, store: &mut HistoryStore, name: &str) -> Result<bool> {
        self.dismiss_menus();
        store.delete(name)
    }
}

async fn create_dir(dir: &Path) -> Result<()> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| PdfStackError::save_failed(format!("{}: {e}", dir.display())))
}

//! The merge page: selection, previews, ordering, merging and history.
//!
//! [`Workspace`] owns every component and wires user actions to them. It
//! reports alerts and the status line through a [`Notifier`], and keeps
//! the last status so front ends can redraw it.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::blob::{BlobRegistry, ReferenceHandle};
use crate::config::{Config, SortOrder};
use crate::drag::{DragReorderController, RowLayout};
use crate::error::{PdfStackError, Result};
use crate::file_list::OrderedFileList;
use crate::history::{HistoryPanel, HistoryRow, HistoryStore, SavePicker};
use crate::io::{OutputWriter, WrittenFile};
use crate::merge::{LopdfMerger, MergeEngine, MergeStatistics};
use crate::output::Notifier;
use crate::platform::Platform;
use crate::preview::{PreviewRenderer, PreviewSlot};
use crate::selection::{FileSelector, Selection};
use crate::storage::{FileStore, Repository};
use crate::utils::{default_merge_name, now_millis, sanitize_merge_name};

/// Status after a previous session's file names were restored.
pub const RESTORED_STATUS: &str = "File list restored. Please reselect files for preview.";

/// Status after the previews were rebuilt.
pub const PREVIEW_STATUS: &str = "Preview loaded. Drag to reorder.";

/// Status after a successful merge.
pub const MERGED_STATUS: &str = "Merged and saved!";

/// Alert when merging with fewer than two files.
pub const INSUFFICIENT_SELECTION_NOTICE: &str = "Please select at least two PDF files.";

/// Result of a successful merge.
#[derive(Debug, Clone)]
pub struct MergeOutcome {
    /// History name of the merge.
    pub name: String,
    /// Handle to the merged bytes for this session.
    pub reference: ReferenceHandle,
    /// Where the merged file was downloaded to.
    pub written: WrittenFile,
    /// What the engine reported.
    pub statistics: MergeStatistics,
}

/// Everything on the merge page.
pub struct Workspace {
    selector: FileSelector,
    list: OrderedFileList,
    drag: DragReorderController,
    previews: PreviewRenderer,
    history: HistoryStore,
    panel: HistoryPanel,
    blobs: BlobRegistry,
    engine: Arc<dyn MergeEngine>,
    writer: OutputWriter,
    notifier: Arc<dyn Notifier>,
    output_dir: PathBuf,
    sort_order: SortOrder,
    placeholders: Vec<String>,
    status: String,
}

impl Workspace {
    /// Open the workspace persisted in `config.state_dir`.
    pub fn open(config: &Config, platform: Arc<dyn Platform>, notifier: Arc<dyn Notifier>) -> Result<Self> {
        let repo = Repository::new(FileStore::new(&config.state_dir));
        Self::with_repository(config, repo, platform, notifier)
    }

    /// Build a workspace on an arbitrary repository.
    ///
    /// # Errors
    ///
    /// Fails if the persisted history cannot be read.
    pub fn with_repository(
        config: &Config,
        repo: Repository,
        platform: Arc<dyn Platform>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self> {
        let writer = OutputWriter::new(config.overwrite_mode);
        let panel = HistoryPanel::new(
            platform,
            writer.clone(),
            &config.output_dir,
            std::env::temp_dir().join("pdfstack"),
        );

        Ok(Self {
            selector: FileSelector::new(),
            list: OrderedFileList::new(repo.clone()),
            drag: DragReorderController::new(RowLayout::default()),
            previews: PreviewRenderer::new(config.effective_jobs()),
            history: HistoryStore::load(repo)?,
            panel,
            blobs: BlobRegistry::new(),
            engine: Arc::new(LopdfMerger::new(config.compression)),
            writer,
            notifier,
            output_dir: config.output_dir.clone(),
            sort_order: config.sort_order,
            placeholders: Vec::new(),
            status: String::new(),
        })
    }

    /// Replace the merge engine.
    pub fn with_engine(mut self, engine: Arc<dyn MergeEngine>) -> Self {
        self.engine = engine;
        self
    }

    /// Show what an earlier session had selected.
    ///
    /// Returns the restored names. They are placeholders only and have to
    /// be reselected before they can be previewed or merged.
    pub fn restore(&mut self) -> Result<&[String]> {
        self.placeholders = self.list.restore_placeholders()?;
        if !self.placeholders.is_empty() {
            self.set_status(RESTORED_STATUS);
        }
        Ok(&self.placeholders)
    }

    /// Replace the selection with `inputs` and rebuild the previews.
    ///
    /// Non-PDF inputs are dropped with a single alert.
    pub async fn select<T>(&mut self, inputs: T) -> Result<&[PreviewSlot]>
    where
        T: IntoIterator,
        T::Item: AsRef<str>,
    {
        let selection = self.selector.select(inputs).await?;
        self.apply_selection(selection).await
    }

    /// Replace the selection with files that are already in memory.
    pub async fn apply_selection(&mut self, selection: Selection) -> Result<&[PreviewSlot]> {
        if let Some(notice) = selection.rejection_notice() {
            tracing::info!(rejected = ?selection.rejected, "rejected non-PDF files");
            self.notifier.alert(notice);
        }

        self.placeholders.clear();
        self.list.set_all(selection.accepted)?;
        self.refresh_previews().await
    }

    /// Drop a file from the selection and rebuild the previews.
    pub async fn remove(&mut self, name: &str) -> Result<&[PreviewSlot]> {
        self.list.remove(name)?;
        self.refresh_previews().await
    }

    /// Move a file to `index` by simulating a drag gesture.
    pub fn move_item(&mut self, name: &str, index: usize) -> Result<()> {
        self.drag.move_item(&mut self.list, name, index)?;
        self.previews.arrange(&self.list);
        Ok(())
    }

    /// Forget the selection, its previews and the status line.
    pub fn clear(&mut self) -> Result<()> {
        self.list.clear()?;
        self.previews.clear();
        self.placeholders.clear();
        self.set_status("");
        Ok(())
    }

    /// Merge the selection in list order.
    ///
    /// `None` uses the default `merged_<epoch ms>.pdf`. `.pdf` is appended
    /// to names without it. The result is downloaded to the output
    /// directory and recorded in history.
    ///
    /// # Errors
    ///
    /// [`PdfStackError::InsufficientSelection`] with fewer than two files,
    /// [`PdfStackError::Cancelled`] for a blank name,
    /// [`PdfStackError::InvalidName`] for a name that is not a plain file
    /// name, and any read, merge or write failure.
    pub async fn merge(&mut self, name: Option<&str>) -> Result<MergeOutcome> {
        if self.list.len() < 2 {
            self.notifier.alert(INSUFFICIENT_SELECTION_NOTICE);
            return Err(PdfStackError::InsufficientSelection {
                selected: self.list.len(),
            });
        }

        let name = match name {
            None => default_merge_name(now_millis()),
            Some(name) if name.trim().is_empty() => return Err(PdfStackError::Cancelled),
            Some(name) => sanitize_merge_name(name)?,
        };

        let mut inputs = Vec::with_capacity(self.list.len());
        for file in self.list.files() {
            inputs.push(file.read_bytes().await?);
        }

        let engine = Arc::clone(&self.engine);
        let (bytes, statistics) = tokio::task::spawn_blocking(move || engine.merge_with_stats(&inputs))
            .await
            .map_err(|e| PdfStackError::merge_failed(format!("Merge task failed: {e}")))??;

        let reference = self.blobs.register(bytes);
        let written = match self.download_and_record(&name, &reference).await {
            Ok(written) => written,
            Err(e) => {
                self.blobs.revoke(&reference);
                return Err(e);
            }
        };
        self.set_status(MERGED_STATUS);

        Ok(MergeOutcome {
            name,
            reference,
            written,
            statistics,
        })
    }

    /// The last status line; empty when cleared.
    pub fn status(&self) -> &str {
        &self.status
    }

    /// Selected file names in merge order.
    pub fn names(&self) -> Vec<String> {
        self.list.names()
    }

    /// Names restored by [`Self::restore`] that were not reselected yet.
    pub fn placeholders(&self) -> &[String] {
        &self.placeholders
    }

    /// The preview board.
    pub fn previews(&self) -> &[PreviewSlot] {
        self.previews.slots()
    }

    /// Where merged files are downloaded to.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// The history store.
    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    /// History rows in `sort` order, or the configured order.
    pub fn history_rows(&self, sort: Option<SortOrder>) -> Vec<HistoryRow> {
        self.panel
            .rows(&self.history, sort.unwrap_or(self.sort_order), &self.blobs)
    }

    /// Open or close the overflow menu of a history entry.
    pub fn toggle_menu(&mut self, name: &str) {
        self.panel.toggle_menu(name);
    }

    /// Close every overflow menu.
    pub fn dismiss_menus(&mut self) {
        self.panel.dismiss_menus();
    }

    /// Open a history entry in the default viewer.
    pub async fn open_entry(&mut self, name: &str) -> Result<PathBuf> {
        self.panel.open(&self.history, &self.blobs, name).await
    }

    /// Download a history entry again.
    pub async fn download_entry(&mut self, name: &str) -> Result<WrittenFile> {
        self.panel.download(&self.history, &self.blobs, name).await
    }

    /// Save a history entry wherever `picker` says.
    pub async fn save_entry(&mut self, name: &str, picker: &mut dyn SavePicker) -> Result<Option<PathBuf>> {
        self.panel
            .save(&self.history, &self.blobs, name, picker, self.notifier.as_ref())
            .await
    }

    /// Rename a history entry. Returns the final name.
    pub fn rename_entry(&mut self, name: &str, new_name: &str) -> Result<String> {
        self.panel.rename(&mut self.history, name, new_name)
    }

    /// Share a history entry.
    pub async fn share_entry(&mut self, name: &str) -> Result<PathBuf> {
        self.panel.share(&self.history, &self.blobs, name).await
    }

    /// Delete a history entry and release its bytes. Returns whether it existed.
    pub fn delete_entry(&mut self, name: &str) -> Result<bool> {
        let reference = self.history.get(name).map(|entry| entry.reference.clone());
        let deleted = self.panel.delete(&mut self.history, name)?;
        if let Some(reference) = reference.filter(|_| deleted) {
            self.blobs.revoke(&reference);
        }
        Ok(deleted)
    }

    /// Download freshly merged bytes and record them, releasing whatever
    /// entry of the same name they replace.
    async fn download_and_record(&mut self, name: &str, reference: &ReferenceHandle) -> Result<WrittenFile> {
        let content = self
            .blobs
            .resolve(reference)
            .ok_or_else(|| PdfStackError::content_unavailable(name))?;
        let written = self.writer.write(&self.output_dir, name, content).await?;

        if let Some(replaced) = self.history.record(name, reference.clone(), now_millis())? {
            self.blobs.revoke(&replaced);
        }
        Ok(written)
    }

    async fn refresh_previews(&mut self) -> Result<&[PreviewSlot]> {
        self.previews.render(&self.list).await?;
        self.set_status(PREVIEW_STATUS);
        Ok(self.previews.slots())
    }

    fn set_status(&mut self, status: &str) {
        self.status = status.to_string();
        self.notifier.status(status);
    }
}

//! Previews of the selected files.
//!
//! Rendering first lays out one [`PreviewSlot::Pending`] per file in list
//! order, then decodes the files concurrently. Each result is written back
//! into the slot at its own index, so completion order never changes what
//! is shown where. A file that fails to decode only fails its own slot.

use futures::stream::{self, StreamExt};
use lopdf::{Dictionary, Document, Object, ObjectId};

use crate::error::Result;
use crate::file_list::OrderedFileList;
use crate::io::{LoadedPdf, PdfReader};
use crate::utils::format_file_size;

/// What is known about a decoded file.
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewSummary {
    /// File name.
    pub name: String,
    /// Number of pages.
    pub page_count: usize,
    /// Size of the file in bytes.
    pub size_bytes: u64,
    /// PDF version from the header, e.g. `1.7`.
    pub version: String,
    /// Width and height of the first page in points.
    pub page_dimensions: Option<(f32, f32)>,
    /// Document title from the info dictionary.
    pub title: Option<String>,
    /// Document author from the info dictionary.
    pub author: Option<String>,
}

impl PreviewSummary {
    /// Describe a decoded file.
    pub fn from_loaded(loaded: &LoadedPdf) -> Self {
        let doc = &loaded.document;
        let info = info_dictionary(doc);

        Self {
            name: loaded.name.clone(),
            page_count: loaded.page_count,
            size_bytes: loaded.size_bytes,
            version: doc.version.clone(),
            page_dimensions: first_page_dimensions(doc),
            title: info.and_then(|dict| text_field(dict, b"Title")),
            author: info.and_then(|dict| text_field(dict, b"Author")),
        }
    }

    /// Human-readable size, e.g. `12.3 KB`.
    pub fn size(&self) -> String {
        format_file_size(self.size_bytes)
    }

    /// Caption shown under the preview.
    pub fn label(&self) -> String {
        let unit = if self.page_count > 1 { "pages" } else { "page" };
        format!("{} — {} {unit} — {}", self.name, self.page_count, self.size())
    }
}

/// State of one preview tile.
#[derive(Debug, Clone, PartialEq)]
pub enum PreviewSlot {
    /// Decode not finished yet.
    Pending {
        /// File name.
        name: String,
    },
    /// Decoded successfully.
    Ready(PreviewSummary),
    /// Decode failed.
    Failed {
        /// File name.
        name: String,
        /// Why the file could not be previewed.
        reason: String,
    },
}

impl PreviewSlot {
    /// File name this slot belongs to.
    pub fn name(&self) -> &str {
        match self {
            Self::Pending { name } | Self::Failed { name, .. } => name,
            Self::Ready(summary) => &summary.name,
        }
    }

    /// Whether the slot reached a final state.
    pub fn is_settled(&self) -> bool {
        !matches!(self, Self::Pending { .. })
    }
}

/// Builds the preview board for an [`OrderedFileList`].
#[derive(Debug)]
pub struct PreviewRenderer {
    reader: PdfReader,
    jobs: usize,
    slots: Vec<PreviewSlot>,
}

impl PreviewRenderer {
    /// Create a renderer decoding up to `jobs` files at once.
    pub fn new(jobs: usize) -> Self {
        Self {
            reader: PdfReader::new(),
            jobs: jobs.max(1),
            slots: Vec::new(),
        }
    }

    /// The board as last rendered.
    pub fn slots(&self) -> &[PreviewSlot] {
        &self.slots
    }

    /// Drop every tile.
    pub fn clear(&mut self) {
        self.slots.clear();
    }

    /// Reorder the existing tiles to follow `list` without decoding again.
    ///
    /// Files without a tile get a pending one; tiles of files no longer in
    /// `list` are dropped.
    pub fn arrange(&mut self, list: &OrderedFileList) {
        let mut previous = std::mem::take(&mut self.slots);

        self.slots = list
            .files()
            .iter()
            .map(|file| {
                previous
                    .iter()
                    .position(|slot| slot.name() == file.name())
                    .map(|idx| previous.swap_remove(idx))
                    .unwrap_or_else(|| PreviewSlot::Pending {
                        name: file.name().to_string(),
                    })
            })
            .collect();
    }

    /// Rebuild the board for `list`.
    pub async fn render(&mut self, list: &OrderedFileList) -> Result<&[PreviewSlot]> {
        self.render_with_progress(list, |_, _| {}).await
    }

    /// Rebuild the board, calling `on_settled` as each slot reaches its final state.
    pub async fn render_with_progress<F>(
        &mut self,
        list: &OrderedFileList,
        mut on_settled: F,
    ) -> Result<&[PreviewSlot]>
    where
        F: FnMut(usize, &PreviewSlot),
    {
        self.slots = list
            .files()
            .iter()
            .map(|file| PreviewSlot::Pending {
                name: file.name().to_string(),
            })
            .collect();

        let reader = self.reader.clone();
        let tasks = list.files().iter().enumerate().map(|(idx, file)| {
            let reader = reader.clone();
            async move { (idx, reader.load(file).await) }
        });

        let mut settled = stream::iter(tasks).buffer_unordered(self.jobs);

        while let Some((idx, result)) = settled.next().await {
            let slot = match result {
                Ok(loaded) => PreviewSlot::Ready(PreviewSummary::from_loaded(&loaded)),
                Err(e) => {
                    tracing::warn!(index = idx, error = %e, "preview failed");
                    PreviewSlot::Failed {
                        name: self.slots[idx].name().to_string(),
                        reason: e.to_string(),
                    }
                }
            };

            self.slots[idx] = slot;
            on_settled(idx, &self.slots[idx]);
        }

        Ok(&self.slots)
    }
}

fn info_dictionary(doc: &Document) -> Option<&Dictionary> {
    let info_ref = doc.trailer.get(b"Info").and_then(Object::as_reference).ok()?;
    doc.get_dictionary(info_ref).ok()
}

/// Read a text string, honoring the UTF-16BE byte order mark.
fn text_field(dict: &Dictionary, key: &[u8]) -> Option<String> {
    let Ok(Object::String(bytes, _)) = dict.get(key) else {
        return None;
    };

    let text = match bytes.strip_prefix(&[0xFE, 0xFF]) {
        Some(utf16) => {
            let units: Vec<u16> = utf16
                .chunks_exact(2)
                .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
                .collect();
            String::from_utf16_lossy(&units)
        }
        None => String::from_utf8_lossy(bytes).into_owned(),
    };

    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

fn first_page_dimensions(doc: &Document) -> Option<(f32, f32)> {
    let (_, page_id) = doc.get_pages().into_iter().next()?;

    let Object::Array(media_box) = inherited_attribute(doc, page_id, b"MediaBox")? else {
        return None;
    };
    if media_box.len() < 4 {
        return None;
    }

    let coords: Vec<f32> = media_box
        .iter()
        .take(4)
        .map(|value| value.as_float().ok())
        .collect::<Option<_>>()?;

    Some(((coords[2] - coords[0]).abs(), (coords[3] - coords[1]).abs()))
}

/// Look up a page attribute, walking up the page tree for inherited values.
fn inherited_attribute<'a>(doc: &'a Document, page_id: ObjectId, key: &[u8]) -> Option<&'a Object> {
    let mut node = doc.get_dictionary(page_id).ok()?;

    // Page trees are shallow; the bound stops reference cycles.
    for _ in 0..32 {
        if let Ok(value) = node.get(key) {
            return match value {
                Object::Reference(id) => doc.get_object(*id).ok(),
                other => Some(other),
            };
        }

        let parent = node.get(b"Parent").and_then(Object::as_reference).ok()?;
        node = doc.get_dictionary(parent).ok()?;
    }

    None
}

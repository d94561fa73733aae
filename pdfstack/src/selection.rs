//! File selection: the picker and drop-zone entry point.
//!
//! Inputs are paths, glob patterns or directories. A dropped directory
//! contributes the files directly inside it, in name order. Every
//! resulting file is classified by media type; only `application/pdf`
//! is accepted and everything else ends up in [`Selection::rejected`].

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::{PdfStackError, Result};
use crate::utils::collect_paths_for_patterns;

/// Media type of PDF documents.
pub const PDF_MEDIA_TYPE: &str = "application/pdf";

/// Notice shown once when a selection contained non-PDF files.
pub const REJECTION_NOTICE: &str = "Only PDF files are allowed!";

/// Media type derived from a file name's extension, as a browser does.
///
/// Returns `None` for unknown extensions.
pub fn media_type_for(name: &str) -> Option<&'static str> {
    let extension = Path::new(name).extension()?.to_str()?.to_ascii_lowercase();

    let media_type = match extension.as_str() {
        "pdf" => PDF_MEDIA_TYPE,
        "txt" => "text/plain",
        "html" | "htm" => "text/html",
        "json" => "application/json",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "zip" => "application/zip",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        _ => return None,
    };

    Some(media_type)
}

/// Opaque access to a selected file's bytes.
#[derive(Debug, Clone)]
pub enum BinaryHandle {
    /// Bytes live on disk and are read on demand.
    Path(PathBuf),
    /// Bytes already held in memory.
    Memory(Arc<[u8]>),
}

impl BinaryHandle {
    /// Read the full contents.
    pub async fn read(&self) -> std::io::Result<Vec<u8>> {
        match self {
            Self::Path(path) => tokio::fs::read(path).await,
            Self::Memory(bytes) => Ok(bytes.to_vec()),
        }
    }
}

/// A file picked by the user.
#[derive(Debug, Clone)]
pub struct SelectedFile {
    name: String,
    source: BinaryHandle,
    size_bytes: u64,
    media_type: Option<&'static str>,
}

impl SelectedFile {
    /// Describe a file on disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the path does not exist or is not a regular file.
    pub async fn from_path(path: &Path) -> Result<Self> {
        let metadata = tokio::fs::metadata(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                PdfStackError::file_not_found(path.to_path_buf())
            } else {
                PdfStackError::FileNotAccessible {
                    path: path.to_path_buf(),
                    source: e,
                }
            }
        })?;

        if !metadata.is_file() {
            return Err(PdfStackError::other(format!(
                "Not a file: {}",
                path.display()
            )));
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        Ok(Self {
            media_type: media_type_for(&name),
            name,
            source: BinaryHandle::Path(path.to_path_buf()),
            size_bytes: metadata.len(),
        })
    }

    /// Wrap bytes that are already in memory.
    pub fn from_bytes(name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        let name = name.into();
        let bytes: Arc<[u8]> = bytes.into();

        Self {
            media_type: media_type_for(&name),
            size_bytes: bytes.len() as u64,
            source: BinaryHandle::Memory(bytes),
            name,
        }
    }

    /// File name, without directories. Unique within a file list.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Size in bytes at selection time.
    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    /// Media type derived from the name, if known.
    pub fn media_type(&self) -> Option<&'static str> {
        self.media_type
    }

    /// Whether this file is a PDF.
    pub fn is_pdf(&self) -> bool {
        self.media_type == Some(PDF_MEDIA_TYPE)
    }

    /// Handle to the file's bytes.
    pub fn source(&self) -> &BinaryHandle {
        &self.source
    }

    /// Read the file's bytes.
    pub async fn read_bytes(&self) -> Result<Vec<u8>> {
        self.source.read().await.map_err(|e| match &self.source {
            BinaryHandle::Path(path) => PdfStackError::FileNotAccessible {
                path: path.clone(),
                source: e,
            },
            BinaryHandle::Memory(_) => PdfStackError::from(e),
        })
    }
}

/// Outcome of one pick or drop.
#[derive(Debug, Default)]
pub struct Selection {
    /// PDF files, in the order they were given.
    pub accepted: Vec<SelectedFile>,
    /// Names of the files that were not PDFs.
    pub rejected: Vec<String>,
}

impl Selection {
    /// Split files into PDFs and everything else, keeping order.
    pub fn partition(files: impl IntoIterator<Item = SelectedFile>) -> Self {
        let mut selection = Self::default();

        for file in files {
            if file.is_pdf() {
                selection.accepted.push(file);
            } else {
                selection.rejected.push(file.name);
            }
        }

        selection
    }

    /// The single notice to show for this selection, if anything was rejected.
    pub fn rejection_notice(&self) -> Option<&'static str> {
        if self.rejected.is_empty() {
            None
        } else {
            Some(REJECTION_NOTICE)
        }
    }
}

/// Turns user input into a [`Selection`].
#[derive(Debug, Clone, Default)]
pub struct FileSelector;

impl FileSelector {
    /// Create a new selector.
    pub fn new() -> Self {
        Self
    }

    /// Resolve paths, glob patterns and directories into a selection.
    ///
    /// # Errors
    ///
    /// Returns an error if a glob pattern is invalid or an explicitly
    /// named file does not exist.
    pub async fn select<T>(&self, inputs: T) -> Result<Selection>
    where
        T: IntoIterator,
        T::Item: AsRef<str>,
    {
        let mut files = Vec::new();

        for path in collect_paths_for_patterns(inputs)? {
            if path.is_dir() {
                for entry in Self::directory_entries(&path)? {
                    files.push(SelectedFile::from_path(&entry).await?);
                }
            } else {
                files.push(SelectedFile::from_path(&path).await?);
            }
        }

        let selection = Selection::partition(files);
        tracing::debug!(
            accepted = selection.accepted.len(),
            rejected = selection.rejected.len(),
            "resolved selection"
        );

        Ok(selection)
    }

    /// Files directly inside a dropped directory, sorted by name.
    fn directory_entries(dir: &Path) -> Result<Vec<PathBuf>> {
        let mut entries = Vec::new();

        for entry in walkdir::WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|e| PdfStackError::other(e.to_string()))?;
            if entry.file_type().is_file() {
                entries.push(entry.into_path());
            }
        }

        Ok(entries)
    }
}

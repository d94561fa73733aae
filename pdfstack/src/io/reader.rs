//! Decoding selected files into lopdf documents.
//!
//! Parsing is CPU-bound, so the async entry points read the bytes and
//! then hand them to a blocking task.
//!
//! # Examples
//!
//! ```no_run
//! use pdfstack::io::PdfReader;
//! use pdfstack::selection::SelectedFile;
//! use std::path::Path;
//!
//! # async fn example() -> pdfstack::Result<()> {
//! let file = SelectedFile::from_path(Path::new("a.pdf")).await?;
//! let loaded = PdfReader::new().load(&file).await?;
//! println!("{} has {} pages", loaded.name, loaded.page_count);
//! # Ok(())
//! # }
//! ```

use lopdf::Document;
use std::time::{Duration, Instant};

use crate::error::{PdfStackError, Result};
use crate::selection::SelectedFile;

/// A decoded PDF.
#[derive(Debug)]
pub struct LoadedPdf {
    /// The PDF document.
    pub document: Document,

    /// File name it was loaded from.
    pub name: String,

    /// Number of pages in the document.
    pub page_count: usize,

    /// Size of the encoded input in bytes.
    pub size_bytes: u64,

    /// Time taken to decode the document.
    pub load_time: Duration,
}

/// PDF reader. Documents without pages are rejected.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfReader;

impl PdfReader {
    /// Create a new PDF reader.
    pub fn new() -> Self {
        Self
    }

    /// Decode `bytes` on the current thread.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The bytes are not a PDF
    /// - The PDF is encrypted
    /// - The PDF has no pages
    pub fn decode(&self, name: &str, bytes: &[u8]) -> Result<LoadedPdf> {
        let start = Instant::now();

        if bytes.is_empty() {
            return Err(PdfStackError::corrupted_pdf(name, "file is empty"));
        }

        let document = Document::load_mem(bytes).map_err(|e| {
            let err_msg = e.to_string();
            if err_msg.contains("encrypt") || err_msg.contains("password") {
                PdfStackError::encrypted_pdf(name)
            } else {
                PdfStackError::failed_to_load_pdf(name, err_msg)
            }
        })?;

        let page_count = document.get_pages().len();
        if page_count == 0 {
            return Err(PdfStackError::corrupted_pdf(name, "PDF has no pages"));
        }

        Ok(LoadedPdf {
            document,
            name: name.to_string(),
            page_count,
            size_bytes: bytes.len() as u64,
            load_time: start.elapsed(),
        })
    }

    /// Decode owned bytes in a blocking task.
    pub async fn load_bytes(&self, name: String, bytes: Vec<u8>) -> Result<LoadedPdf> {
        let reader = *self;

        tokio::task::spawn_blocking(move || reader.decode(&name, &bytes))
            .await
            .map_err(|e| PdfStackError::other(format!("Decode task failed: {e}")))?
    }

    /// Read and decode a selected file.
    pub async fn load(&self, file: &SelectedFile) -> Result<LoadedPdf> {
        let bytes = file.read_bytes().await?;
        let loaded = self.load_bytes(file.name().to_string(), bytes).await?;

        tracing::debug!(
            name = %loaded.name,
            pages = loaded.page_count,
            elapsed = ?loaded.load_time,
            "decoded pdf"
        );
        Ok(loaded)
    }
}

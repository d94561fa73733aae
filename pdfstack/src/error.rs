//! Error types for pdfstack.
//!
//! This module defines all error types that can occur while selecting,
//! previewing, merging and keeping history of PDF files. Errors are
//! designed to be informative and actionable, providing clear context
//! about what went wrong and how to fix it.
//!
//! # Error Categories
//!
//! - **I/O Errors**: File not found, permission denied, etc.
//! - **PDF Errors**: Invalid PDF structure, corrupted files
//! - **Selection Errors**: Too few files, unknown names, bad drag gestures
//! - **History Errors**: Unknown entries, name clashes, stale handles
//! - **Storage Errors**: Unreadable or malformed persisted state

use std::io;
use std::path::PathBuf;

/// Result type alias for pdfstack operations.
pub type Result<T> = std::result::Result<T, PdfStackError>;

/// Main error type for pdfstack operations.
#[derive(Debug, thiserror::Error)]
pub enum PdfStackError {
    /// Input file was not found.
    #[error("File not found: {}", .path.display())]
    FileNotFound {
        /// Path to the file that was not found.
        path: PathBuf,
    },

    /// Input file is not accessible (permission denied, etc.).
    #[error("Cannot access file: {}\n  Reason: {source}", .path.display())]
    FileNotAccessible {
        /// Path to the inaccessible file.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Failed to load a PDF document.
    #[error("Failed to load PDF: {name}\n  Reason: {reason}")]
    FailedToLoadPdf {
        /// Name of the PDF file.
        name: String,
        /// Reason for the failure.
        reason: String,
    },

    /// PDF file is corrupted or has invalid structure.
    #[error("Corrupted or invalid PDF: {name}\n  Details: {details}")]
    CorruptedPdf {
        /// Name of the corrupted PDF.
        name: String,
        /// Details about the corruption.
        details: String,
    },

    /// PDF file is encrypted and cannot be processed.
    #[error(
        "PDF is encrypted and cannot be processed: {name}\n  \
         Hint: Decrypt the PDF first using 'qpdf --decrypt' or similar tools"
    )]
    EncryptedPdf {
        /// Name of the encrypted PDF.
        name: String,
    },

    /// The merge engine received no input at all.
    #[error("No input files specified for merging")]
    NoFilesToMerge,

    /// Fewer than two files are selected at merge time.
    #[error(
        "Please select at least two PDF files (currently selected: {selected})"
    )]
    InsufficientSelection {
        /// Number of files in the selection.
        selected: usize,
    },

    /// A name does not match any file in the current selection.
    #[error("No file named '{name}' in the current selection")]
    FileNotInSelection {
        /// Requested file name.
        name: String,
    },

    /// A drag gesture was used out of order.
    #[error("Invalid drag gesture: {reason}")]
    InvalidDrag {
        /// What was wrong with the gesture.
        reason: String,
    },

    /// Output file already exists and overwrite is not allowed.
    #[error(
        "Output file already exists: {}\n  \
         Use --force to overwrite or choose a different name",
        .path.display()
    )]
    OutputExists {
        /// Path to the existing output file.
        path: PathBuf,
    },

    /// Failed to create output file.
    #[error("Failed to create output file: {}\n  Reason: {source}", .path.display())]
    FailedToCreateOutput {
        /// Path where output should be created.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Failed to write to output file.
    #[error("Failed to write to output file: {}\n  Reason: {source}", .path.display())]
    FailedToWrite {
        /// Path being written to.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Merge operation failed.
    #[error("Merge operation failed: {reason}")]
    MergeFailed {
        /// Description of what went wrong.
        reason: String,
    },

    /// No history entry with the given name.
    #[error("No merge named '{name}' in history")]
    EntryNotFound {
        /// Requested entry name.
        name: String,
    },

    /// Rename target already names another history entry.
    #[error("A merge named '{name}' already exists in history")]
    HistoryNameTaken {
        /// The clashing name.
        name: String,
    },

    /// A merge or history name is not a plain file name.
    #[error("Invalid file name '{name}': {reason}")]
    InvalidName {
        /// The rejected name.
        name: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The entry's reference handle belongs to an earlier session.
    #[error(
        "Content of '{name}' is unavailable\n  \
         Hint: merged bytes only live for the session that created them; merge again to recreate them"
    )]
    ContentUnavailable {
        /// Name of the history entry.
        name: String,
    },

    /// The user-mediated save flow failed or was cancelled.
    #[error("Save failed or cancelled: {reason}")]
    SaveFailed {
        /// Details about the failure.
        reason: String,
    },

    /// Persisted state could not be read or written.
    #[error("Storage error for key '{key}': {reason}")]
    Storage {
        /// Storage key involved.
        key: String,
        /// Details about the failure.
        reason: String,
    },

    /// Handing content to the platform (opener, file manager) failed.
    #[error("Platform action failed: {reason}")]
    Platform {
        /// Details about the failure.
        reason: String,
    },

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Description of what's wrong with the configuration.
        message: String,
    },

    /// User cancelled the operation.
    #[error("Operation cancelled by user")]
    Cancelled,

    /// Generic I/O error.
    #[error("I/O error: {source}")]
    Io {
        /// Underlying I/O error.
        #[from]
        source: io::Error,
    },

    /// Generic error with a custom message.
    #[error("{message}")]
    Other {
        /// Error message.
        message: String,
    },
}

impl From<lopdf::Error> for PdfStackError {
    fn from(err: lopdf::Error) -> Self {
        Self::merge_failed(err.to_string())
    }
}

impl From<anyhow::Error> for PdfStackError {
    fn from(err: anyhow::Error) -> Self {
        Self::other(err.to_string())
    }
}

impl PdfStackError {
    /// Create a FileNotFound error.
    pub fn file_not_found(path: PathBuf) -> Self {
        Self::FileNotFound { path }
    }

    /// Create a FailedToLoadPdf error.
    pub fn failed_to_load_pdf(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::FailedToLoadPdf {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Create a CorruptedPdf error.
    pub fn corrupted_pdf(name: impl Into<String>, details: impl Into<String>) -> Self {
        Self::CorruptedPdf {
            name: name.into(),
            details: details.into(),
        }
    }

    /// Create an EncryptedPdf error.
    pub fn encrypted_pdf(name: impl Into<String>) -> Self {
        Self::EncryptedPdf { name: name.into() }
    }

    /// Create a FileNotInSelection error.
    pub fn not_in_selection(name: impl Into<String>) -> Self {
        Self::FileNotInSelection { name: name.into() }
    }

    /// Create an InvalidDrag error.
    pub fn invalid_drag(reason: impl Into<String>) -> Self {
        Self::InvalidDrag {
            reason: reason.into(),
        }
    }

    /// Create an OutputExists error.
    pub fn output_exists(path: PathBuf) -> Self {
        Self::OutputExists { path }
    }

    /// Create a MergeFailed error.
    pub fn merge_failed(reason: impl Into<String>) -> Self {
        Self::MergeFailed {
            reason: reason.into(),
        }
    }

    /// Create an EntryNotFound error.
    pub fn entry_not_found(name: impl Into<String>) -> Self {
        Self::EntryNotFound { name: name.into() }
    }

    /// Create an InvalidName error.
    pub fn invalid_name(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidName {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Create a ContentUnavailable error.
    pub fn content_unavailable(name: impl Into<String>) -> Self {
        Self::ContentUnavailable { name: name.into() }
    }

    /// Create a SaveFailed error.
    pub fn save_failed(reason: impl Into<String>) -> Self {
        Self::SaveFailed {
            reason: reason.into(),
        }
    }

    /// Create a Storage error.
    pub fn storage(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Storage {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Create a Platform error.
    pub fn platform(reason: impl Into<String>) -> Self {
        Self::Platform {
            reason: reason.into(),
        }
    }

    /// Create an InvalidConfig error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create an Other error with a custom message.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }

    /// Check if this error only affects a single file or entry.
    ///
    /// Recoverable errors are shown per slot or per row; the rest of the
    /// workspace keeps going.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::FailedToLoadPdf { .. }
                | Self::CorruptedPdf { .. }
                | Self::EncryptedPdf { .. }
                | Self::ContentUnavailable { .. }
                | Self::SaveFailed { .. }
                | Self::Cancelled
        )
    }

    /// Get the exit code for this error.
    ///
    /// Returns the appropriate process exit code based on error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::FileNotFound { .. } => 2,
            Self::FileNotAccessible { .. } => 2,
            Self::FailedToLoadPdf { .. } => 3,
            Self::CorruptedPdf { .. } => 3,
            Self::EncryptedPdf { .. } => 3,
            Self::NoFilesToMerge => 1,
            Self::InsufficientSelection { .. } => 1,
            Self::FileNotInSelection { .. } => 1,
            Self::InvalidDrag { .. } => 1,
            Self::OutputExists { .. } => 4,
            Self::FailedToCreateOutput { .. } => 5,
            Self::FailedToWrite { .. } => 5,
            Self::MergeFailed { .. } => 6,
            Self::EntryNotFound { .. } => 1,
            Self::HistoryNameTaken { .. } => 1,
            Self::InvalidName { .. } => 1,
            Self::ContentUnavailable { .. } => 7,
            Self::SaveFailed { .. } => 5,
            Self::Storage { .. } => 8,
            Self::Platform { .. } => 9,
            Self::InvalidConfig { .. } => 1,
            Self::Cancelled => 130, // Standard exit code for SIGINT
            Self::Io { .. } => 5,
            Self::Other { .. } => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_file_not_found_display() {
        let err = PdfStackError::file_not_found(PathBuf::from("/tmp/missing.pdf"));
        let msg = format!("{err}");
        assert!(msg.contains("File not found"));
        assert!(msg.contains("missing.pdf"));
    }

    #[test]
    fn test_encrypted_pdf_display() {
        let err = PdfStackError::encrypted_pdf("secret.pdf");
        let msg = format!("{err}");
        assert!(msg.contains("encrypted"));
        assert!(msg.contains("secret.pdf"));
        assert!(msg.contains("Decrypt"));
    }

    #[test]
    fn test_insufficient_selection_display() {
        let err = PdfStackError::InsufficientSelection { selected: 1 };
        let msg = format!("{err}");
        assert!(msg.contains("at least two PDF files"));
        assert!(msg.contains('1'));
    }

    #[test]
    fn test_content_unavailable_display() {
        let err = PdfStackError::content_unavailable("out.pdf");
        let msg = format!("{err}");
        assert!(msg.contains("out.pdf"));
        assert!(msg.contains("merge again"));
    }

    #[test]
    fn test_is_recoverable() {
        assert!(PdfStackError::corrupted_pdf("bad.pdf", "error").is_recoverable());
        assert!(PdfStackError::content_unavailable("old.pdf").is_recoverable());
        assert!(PdfStackError::Cancelled.is_recoverable());

        assert!(!PdfStackError::NoFilesToMerge.is_recoverable());
        assert!(!PdfStackError::InsufficientSelection { selected: 0 }.is_recoverable());
        assert!(!PdfStackError::invalid_name("../x.pdf", "path separator").is_recoverable());
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(
            PdfStackError::file_not_found(PathBuf::from("x")).exit_code(),
            2
        );
        assert_eq!(
            PdfStackError::failed_to_load_pdf("x", "error").exit_code(),
            3
        );
        assert_eq!(
            PdfStackError::InsufficientSelection { selected: 1 }.exit_code(),
            1
        );
        assert_eq!(
            PdfStackError::output_exists(PathBuf::from("x")).exit_code(),
            4
        );
        assert_eq!(PdfStackError::Cancelled.exit_code(), 130);
    }

    #[test]
    fn test_from_io_error() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "not found");
        let err: PdfStackError = io_err.into();
        assert!(matches!(err, PdfStackError::Io { .. }));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_error_source() {
        let err = PdfStackError::FileNotAccessible {
            path: PathBuf::from("test.pdf"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.source().is_some());

        let err = PdfStackError::NoFilesToMerge;
        assert!(err.source().is_none());
    }
}

//! pdfstack - select, preview, reorder and merge PDF files.
//!
//! The library models a merge page. Files are picked or dropped and
//! previewed, then put in order with drag gestures and merged into one
//! document. Every merge lands in a persistent history that can be opened,
//! downloaded, saved, renamed, shared or deleted later.
//!
//! # Examples
//!
//! ```no_run
//! use std::sync::Arc;
//! use pdfstack::config::Config;
//! use pdfstack::output::OutputFormatter;
//! use pdfstack::platform::SystemPlatform;
//! use pdfstack::workspace::Workspace;
//!
//! # async fn example() -> pdfstack::Result<()> {
//! let config = Config::default();
//! let formatter = OutputFormatter::from_config(&config);
//! let mut workspace = Workspace::open(&config, Arc::new(SystemPlatform), Arc::new(formatter))?;
//!
//! workspace.select(["a.pdf", "b.pdf"]).await?;
//! workspace.move_item("b.pdf", 0)?;
//! let outcome = workspace.merge(Some("combined")).await?;
//! println!("Saved {}", outcome.written.path.display());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod blob;
pub mod config;
pub mod drag;
pub mod error;
pub mod file_list;
pub mod history;
pub mod io;
pub mod merge;
pub mod output;
pub mod platform;
pub mod preview;
pub mod selection;
pub mod storage;
pub mod utils;
pub mod workspace;

#[cfg(test)]
mod testing;

pub use config::Config;
pub use error::{PdfStackError, Result};
pub use workspace::Workspace;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");

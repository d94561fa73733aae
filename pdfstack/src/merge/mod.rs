//! Combining several PDFs into one.
//!
//! The workspace only knows the [`MergeEngine`] trait: ordered input
//! buffers in, one output buffer out. [`LopdfMerger`] is the engine used
//! in practice.
//!
//! # Examples
//!
//! ```no_run
//! use pdfstack::config::CompressionLevel;
//! use pdfstack::merge::{LopdfMerger, MergeEngine};
//!
//! # fn example(a: Vec<u8>, b: Vec<u8>) -> pdfstack::Result<()> {
//! let merger = LopdfMerger::new(CompressionLevel::Standard);
//! let merged = merger.merge(&[a, b])?;
//! std::fs::write("merged.pdf", merged)?;
//! # Ok(())
//! # }
//! ```

pub mod merger;

pub use merger::{LopdfMerger, MergeStatistics};

use crate::error::Result;

/// Something that can merge PDF byte buffers.
///
/// Implementations are synchronous and may be CPU-heavy; callers run
/// them on a blocking task.
pub trait MergeEngine: Send + Sync {
    /// Merge `inputs` in order and report what happened.
    ///
    /// # Errors
    ///
    /// Fails on empty input or when any input cannot be decoded.
    fn merge_with_stats(&self, inputs: &[Vec<u8>]) -> Result<(Vec<u8>, MergeStatistics)>;

    /// Merge `inputs` in order into a single document.
    fn merge(&self, inputs: &[Vec<u8>]) -> Result<Vec<u8>> {
        self.merge_with_stats(inputs).map(|(bytes, _)| bytes)
    }
}

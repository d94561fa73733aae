//! Writing merged bytes to disk.
//!
//! Writes are atomic: bytes go to a temp file next to the target, which is
//! then renamed into place. The target name is chosen according to the
//! configured [`OverwriteMode`], the way a browser names downloads.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task;

use crate::config::OverwriteMode;
use crate::error::{PdfStackError, Result};
use crate::utils::check_file_name;

/// Largest " (n)" suffix tried before giving up on finding a free name.
const MAX_RENAME_ATTEMPTS: u32 = 9999;

/// Outcome of a write.
#[derive(Debug, Clone)]
pub struct WrittenFile {
    /// Where the bytes ended up.
    pub path: PathBuf,

    /// Number of bytes written.
    pub size_bytes: u64,

    /// Time taken to write the file.
    pub write_time: Duration,
}

/// Writes byte buffers into a directory.
#[derive(Debug, Clone, Default)]
pub struct OutputWriter {
    overwrite_mode: OverwriteMode,
}

impl OutputWriter {
    /// Create a writer with the given collision behavior.
    pub fn new(overwrite_mode: OverwriteMode) -> Self {
        Self { overwrite_mode }
    }

    /// Pick the path `name` should be written to inside `dir`.
    ///
    /// # Errors
    ///
    /// Returns [`PdfStackError::InvalidName`] when `name` is not a plain
    /// file name, and [`PdfStackError::OutputExists`] in no-clobber mode
    /// when the target exists.
    pub fn resolve_target(&self, dir: &Path, name: &str) -> Result<PathBuf> {
        check_file_name(name)?;
        let target = dir.join(name);
        if !target.exists() {
            return Ok(target);
        }

        match self.overwrite_mode {
            OverwriteMode::Force => Ok(target),
            OverwriteMode::NoClobber => Err(PdfStackError::output_exists(target)),
            OverwriteMode::Rename => (1..=MAX_RENAME_ATTEMPTS)
                .map(|n| dir.join(numbered_name(name, n)))
                .find(|candidate| !candidate.exists())
                .ok_or_else(|| PdfStackError::output_exists(target)),
        }
    }

    /// Write `bytes` as `name` inside `dir`, creating `dir` if needed.
    pub async fn write(&self, dir: &Path, name: &str, bytes: Arc<[u8]>) -> Result<WrittenFile> {
        let target = self.resolve_target(dir, name)?;
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| PdfStackError::FailedToCreateOutput {
                path: dir.to_path_buf(),
                source: e,
            })?;

        write_to(target, bytes).await
    }
}

/// Atomically write `bytes` to exactly `path`, replacing any existing file.
pub async fn write_to(path: PathBuf, bytes: Arc<[u8]>) -> Result<WrittenFile> {
    let written = task::spawn_blocking(move || write_atomic(&path, &bytes).map(|write_time| {
        WrittenFile {
            size_bytes: bytes.len() as u64,
            path,
            write_time,
        }
    }))
    .await
    .map_err(|e| PdfStackError::other(format!("Write task failed: {e}")))??;

    tracing::debug!(
        path = %written.path.display(),
        bytes = written.size_bytes,
        elapsed = ?written.write_time,
        "wrote file"
    );
    Ok(written)
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<Duration> {
    let start = Instant::now();

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| PdfStackError::other(format!("Not a file path: {}", path.display())))?;
    let temp_path = path.with_file_name(format!(".{file_name}.tmp"));

    let file = std::fs::File::create(&temp_path).map_err(|e| PdfStackError::FailedToCreateOutput {
        path: temp_path.clone(),
        source: e,
    })?;

    let mut writer = std::io::BufWriter::new(file);
    writer
        .write_all(bytes)
        .and_then(|_| writer.flush())
        .map_err(|e| PdfStackError::FailedToWrite {
            path: temp_path.clone(),
            source: e,
        })?;
    drop(writer);

    std::fs::rename(&temp_path, path).map_err(|e| {
        let _ = std::fs::remove_file(&temp_path);
        PdfStackError::FailedToWrite {
            path: path.to_path_buf(),
            source: e,
        }
    })?;

    Ok(start.elapsed())
}

/// `report.pdf` → `report (n).pdf`.
fn numbered_name(name: &str, n: u32) -> String {
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{stem} ({n}).{ext}"),
        _ => format!("{name} ({n})"),
    }
}

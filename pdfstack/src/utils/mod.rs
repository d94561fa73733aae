//! Utilities for path collection, names, sizes and timestamps.

use crate::{Result, error::PdfStackError};
use std::path::PathBuf;

/// Expand multiple glob patterns into filesystem paths.
///
/// Accepts anything iterable with items that convert to `&str`, e.g.:
/// `&[&str]`, `Vec<String>`, or `Vec<&str>`.
///
/// Returns a flattened list of resolved paths. A pattern without glob
/// metacharacters that matches nothing is kept as-is so that the caller
/// can report it as missing.
///
/// Errors:
/// - Propagates `glob` parse errors.
/// - Propagates filesystem errors from glob iterator.
pub fn collect_paths_for_patterns<T>(patterns: T) -> Result<Vec<PathBuf>>
where
    T: IntoIterator,
    T::Item: AsRef<str>,
{
    let mut resolved_paths = Vec::new();

    for pattern in patterns.into_iter() {
        let pattern = pattern.as_ref();
        let paths = collect_paths_for_pattern(pattern)?;

        if paths.is_empty() && !is_glob(pattern) {
            resolved_paths.push(PathBuf::from(pattern));
        } else {
            resolved_paths.extend(paths);
        }
    }

    Ok(resolved_paths)
}

/// Expand a single glob pattern into filesystem paths.
///
/// Pattern examples:
/// - `"**/*.pdf"`
/// - `"./docs/*.pdf"`
fn collect_paths_for_pattern(pattern: &str) -> Result<Vec<PathBuf>> {
    let mut resolved_paths = Vec::new();

    let paths = glob::glob(pattern).map_err(|err| PdfStackError::Other {
        message: err.to_string(),
    })?;

    for entry in paths {
        let path = entry.map_err(|err| PdfStackError::Other {
            message: err.to_string(),
        })?;
        resolved_paths.push(path);
    }

    Ok(resolved_paths)
}

fn is_glob(pattern: &str) -> bool {
    pattern.contains(['*', '?', '['])
}

/// Format a byte count for file list entries.
///
/// Bytes below 1024, one-decimal kilobytes below 1024 KB, two-decimal
/// megabytes otherwise.
pub fn format_file_size(bytes: u64) -> String {
    if bytes < 1024 {
        return format!("{bytes} B");
    }

    let kb = bytes as f64 / 1024.0;
    if kb < 1024.0 {
        return format!("{kb:.1} KB");
    }

    format!("{:.2} MB", kb / 1024.0)
}

/// Append `.pdf` unless the name already ends with it.
pub fn ensure_pdf_extension(name: &str) -> String {
    let name = name.trim();
    if name.ends_with(".pdf") {
        name.to_string()
    } else {
        format!("{name}.pdf")
    }
}

/// Reject anything that is not a plain file name.
///
/// The name is joined onto the download directory, so separators and
/// `.`/`..` would let it land elsewhere.
pub fn check_file_name(name: &str) -> Result<()> {
    let reason = if name.contains(['/', '\\']) {
        "path separators are not allowed"
    } else if name.contains('\0') {
        "NUL bytes are not allowed"
    } else if matches!(name.trim(), "" | "." | "..") {
        "not a file name"
    } else {
        return Ok(());
    };
    Err(PdfStackError::invalid_name(name, reason))
}

/// Validate a user-supplied merge name and append `.pdf`.
pub fn sanitize_merge_name(name: &str) -> Result<String> {
    check_file_name(name)?;
    Ok(ensure_pdf_extension(name))
}

/// Default name offered for a new merge.
pub fn default_merge_name(timestamp_ms: i64) -> String {
    format!("merged_{timestamp_ms}.pdf")
}

/// Milliseconds since the Unix epoch.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Render an epoch-milliseconds timestamp in local time.
pub fn format_timestamp(timestamp_ms: i64) -> String {
    match chrono::DateTime::from_timestamp_millis(timestamp_ms) {
        Some(utc) => utc
            .with_timezone(&chrono::Local)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string(),
        None => "unknown time".to_string(),
    }
}

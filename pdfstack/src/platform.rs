//! Handing files to the desktop: opening them and revealing them for sharing.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::{Arc, Mutex};

use crate::error::{PdfStackError, Result};

/// Desktop integration used by the history panel.
pub trait Platform: Send + Sync {
    /// Open `path` in the default viewer.
    fn open(&self, path: &Path) -> Result<()>;

    /// Offer `path` for sharing.
    fn share(&self, path: &Path) -> Result<()>;
}

/// Uses the operating system's opener (`xdg-open`, `open` or `start`).
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemPlatform;

impl SystemPlatform {
    fn launch(program: &str, args: &[&OsStr]) -> Result<()> {
        tracing::debug!(program, ?args, "launching");

        Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map(drop)
            .map_err(|e| PdfStackError::platform(format!("failed to run {program}: {e}")))
    }
}

impl Platform for SystemPlatform {
    fn open(&self, path: &Path) -> Result<()> {
        if cfg!(target_os = "macos") {
            Self::launch("open", &[path.as_os_str()])
        } else if cfg!(target_os = "windows") {
            Self::launch("cmd", &[OsStr::new("/C"), OsStr::new("start"), OsStr::new(""), path.as_os_str()])
        } else {
            Self::launch("xdg-open", &[path.as_os_str()])
        }
    }

    /// Reveals the file in the file manager.
    fn share(&self, path: &Path) -> Result<()> {
        if cfg!(target_os = "macos") {
            Self::launch("open", &[OsStr::new("-R"), path.as_os_str()])
        } else if cfg!(target_os = "windows") {
            let select = format!("/select,{}", path.display());
            Self::launch("explorer", &[OsStr::new(&select)])
        } else {
            let folder = path.parent().unwrap_or(Path::new("."));
            Self::launch("xdg-open", &[folder.as_os_str()])
        }
    }
}

/// Something a [`RecordingPlatform`] was asked to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformAction {
    /// `open` was called with this path.
    Open(PathBuf),
    /// `share` was called with this path.
    Share(PathBuf),
}

/// A platform that only remembers what it was asked to do.
///
/// Used by tests and by `--no-launch` runs. Clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct RecordingPlatform {
    actions: Arc<Mutex<Vec<PlatformAction>>>,
}

impl RecordingPlatform {
    /// Everything requested so far, oldest first.
    pub fn actions(&self) -> Vec<PlatformAction> {
        self.actions
            .lock()
            .map(|actions| actions.clone())
            .unwrap_or_default()
    }

    fn push(&self, action: PlatformAction) -> Result<()> {
        self.actions
            .lock()
            .map_err(|_| PdfStackError::platform("action log poisoned"))?
            .push(action);
        Ok(())
    }
}

impl Platform for RecordingPlatform {
    fn open(&self, path: &Path) -> Result<()> {
        self.push(PlatformAction::Open(path.to_path_buf()))
    }

    fn share(&self, path: &Path) -> Result<()> {
        self.push(PlatformAction::Share(path.to_path_buf()))
    }
}

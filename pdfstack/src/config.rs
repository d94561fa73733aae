//! Configuration module for pdfstack.
//!
//! This module turns CLI arguments and the optional `settings.toml` file
//! into a validated, normalized configuration that drives selection,
//! merging and history. It handles:
//! - Validation of argument combinations
//! - Layering of settings file values under CLI flags
//! - Application of defaults (state and download directories)

use anyhow::{Context, Result, bail};
use serde::Deserialize;

use crate::PdfStackError;
use std::{
    path::{Path, PathBuf},
    str::FromStr,
};

/// File name of the optional settings file inside the state directory.
pub const SETTINGS_FILE: &str = "settings.toml";

/// Compression level for the merged PDF.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompressionLevel {
    /// No compression - preserves exact quality and structure.
    None,
    /// Balanced compression - good trade-off between size and processing time.
    #[default]
    Standard,
    /// Maximum compression - smallest file size, longer processing time.
    Maximum,
}

impl FromStr for CompressionLevel {
    type Err = PdfStackError;

    /// Parse compression level from "none", "standard" or "maximum".
    fn from_str(s: &str) -> crate::Result<Self> {
        match s.to_lowercase().as_str() {
            "none" => Ok(Self::None),
            "standard" => Ok(Self::Standard),
            "maximum" => Ok(Self::Maximum),
            _ => Err(PdfStackError::invalid_config(format!(
                "Invalid compression level: {s}. Must be one of: none, standard, maximum"
            ))),
        }
    }
}

/// Order in which the merge history is listed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Most recent merge first.
    #[default]
    Newest,
    /// Oldest merge first.
    Oldest,
}

impl SortOrder {
    /// The keyword used on the command line and in settings.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Newest => "newest",
            Self::Oldest => "oldest",
        }
    }
}

impl FromStr for SortOrder {
    type Err = PdfStackError;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.to_lowercase().as_str() {
            "newest" => Ok(Self::Newest),
            "oldest" => Ok(Self::Oldest),
            _ => Err(PdfStackError::invalid_config(format!(
                "Invalid sort order: {s}. Must be one of: newest, oldest"
            ))),
        }
    }
}

/// What to do when a downloaded file would replace an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverwriteMode {
    /// Pick a free name by appending " (1)", " (2)", ... like a browser does.
    #[default]
    Rename,
    /// Always overwrite.
    Force,
    /// Never overwrite, error if file exists.
    NoClobber,
}

impl FromStr for OverwriteMode {
    type Err = PdfStackError;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.to_lowercase().as_str() {
            "rename" => Ok(Self::Rename),
            "force" => Ok(Self::Force),
            "no-clobber" | "noclobber" => Ok(Self::NoClobber),
            _ => Err(PdfStackError::invalid_config(format!(
                "Invalid overwrite mode: {s}. Must be one of: rename, force, no-clobber"
            ))),
        }
    }
}

/// Values read from `settings.toml`.
///
/// Every field is optional; missing values fall back to defaults and
/// CLI flags win over anything set here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// `[history]` table.
    pub history: HistorySettings,
    /// `[merge]` table.
    pub merge: MergeSettings,
}

/// `[history]` table of the settings file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HistorySettings {
    /// Default sort order: "newest" or "oldest".
    pub sort: Option<String>,
}

/// `[merge]` table of the settings file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MergeSettings {
    /// Compression level: "none", "standard" or "maximum".
    pub compression: Option<String>,
    /// Directory merged files are downloaded to.
    pub output_dir: Option<PathBuf>,
    /// Overwrite mode: "rename", "force" or "no-clobber".
    pub overwrite: Option<String>,
    /// Number of files decoded concurrently for previews.
    pub jobs: Option<usize>,
}

impl Settings {
    /// Load settings from `<state_dir>/settings.toml`.
    ///
    /// A missing file yields default settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(state_dir: &Path) -> Result<Self> {
        let path = state_dir.join(SETTINGS_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read settings file: {}", path.display()))?;

        Self::parse(&content)
            .with_context(|| format!("Failed to parse settings file: {}", path.display()))
    }

    /// Parse settings from TOML text.
    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

/// Complete runtime configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding persisted state (`pdfFileList`, `mergeHistory`).
    pub state_dir: PathBuf,

    /// Directory merged files are downloaded to.
    pub output_dir: PathBuf,

    /// Default order of the history listing.
    pub sort_order: SortOrder,

    /// Compression level for merged output.
    pub compression: CompressionLevel,

    /// Behavior when a download target already exists.
    pub overwrite_mode: OverwriteMode,

    /// Number of concurrent preview decodes (None = auto-detect).
    pub jobs: Option<usize>,

    /// Quiet mode - suppress non-error output.
    pub quiet: bool,

    /// Verbose output mode.
    pub verbose: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            state_dir: default_state_dir(),
            output_dir: default_output_dir(),
            sort_order: SortOrder::default(),
            compression: CompressionLevel::default(),
            overwrite_mode: OverwriteMode::default(),
            jobs: None,
            quiet: false,
            verbose: false,
        }
    }
}

impl Config {
    /// Create a configuration rooted at a given state directory.
    pub fn with_state_dir(state_dir: impl Into<PathBuf>) -> Self {
        Self {
            state_dir: state_dir.into(),
            ..Self::default()
        }
    }

    /// Layer settings file values over this configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if a value in the settings file is not recognized.
    pub fn apply_settings(mut self, settings: &Settings) -> Result<Self> {
        if let Some(sort) = &settings.history.sort {
            self.sort_order = SortOrder::from_str(sort)?;
        }
        if let Some(compression) = &settings.merge.compression {
            self.compression = CompressionLevel::from_str(compression)?;
        }
        if let Some(output_dir) = &settings.merge.output_dir {
            self.output_dir = output_dir.clone();
        }
        if let Some(overwrite) = &settings.merge.overwrite {
            self.overwrite_mode = OverwriteMode::from_str(overwrite)?;
        }
        if settings.merge.jobs.is_some() {
            self.jobs = settings.merge.jobs;
        }
        Ok(self)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Verbose and quiet modes are both enabled
    /// - Jobs count is zero
    /// - The output directory is the state directory
    pub fn validate(&self) -> Result<()> {
        if self.verbose && self.quiet {
            bail!("Cannot use both --verbose and --quiet");
        }

        if let Some(jobs) = self.jobs
            && jobs == 0
        {
            bail!("Number of jobs must be at least 1");
        }

        if self.output_dir == self.state_dir {
            bail!(
                "Output directory cannot be the state directory: {}",
                self.state_dir.display()
            );
        }

        Ok(())
    }

    /// Get the effective number of concurrent preview decodes.
    ///
    /// Returns the configured job count, or the number of CPU cores if auto-detect.
    pub fn effective_jobs(&self) -> usize {
        self.jobs.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        })
    }
}

/// Default state directory: `<local data dir>/pdfstack`.
pub fn default_state_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("pdfstack")
}

/// Default download directory, falling back to the current directory.
pub fn default_output_dir() -> PathBuf {
    dirs::download_dir().unwrap_or_else(|| PathBuf::from("."))
}

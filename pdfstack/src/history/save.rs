//! User-mediated "save as" for history entries.

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use crate::error::Result;

/// File type offered by a save dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileFilter {
    /// Label shown to the user.
    pub description: &'static str,
    /// Media type of the content.
    pub mime: &'static str,
    /// Accepted extensions, with the leading dot.
    pub extensions: &'static [&'static str],
}

impl FileFilter {
    /// Whether `path` has one of the accepted extensions.
    pub fn accepts(&self, path: &Path) -> bool {
        let name = path.to_string_lossy();
        self.extensions.iter().any(|ext| name.ends_with(ext))
    }
}

/// The only filter history entries are saved with.
pub const PDF_FILTER: FileFilter = FileFilter {
    description: "PDF Files",
    mime: "application/pdf",
    extensions: &[".pdf"],
};

/// Asks the user where to save something.
pub trait SavePicker {
    /// Returns the chosen path, or `None` when the user cancelled.
    fn pick(&mut self, suggested_name: &str, filter: &FileFilter) -> Result<Option<PathBuf>>;
}

/// Save dialog on a terminal.
///
/// An empty answer takes the suggested name inside the default directory.
/// End of input or `-` cancels. Paths outside the filter are refused and
/// the question is asked again.
pub struct TerminalSavePicker<R, W> {
    input: R,
    output: W,
    default_dir: PathBuf,
}

impl<R: BufRead, W: Write> TerminalSavePicker<R, W> {
    /// Create a picker reading answers from `input` and prompting on `output`.
    pub fn new(input: R, output: W, default_dir: impl Into<PathBuf>) -> Self {
        Self {
            input,
            output,
            default_dir: default_dir.into(),
        }
    }
}

impl<R: BufRead, W: Write> SavePicker for TerminalSavePicker<R, W> {
    fn pick(&mut self, suggested_name: &str, filter: &FileFilter) -> Result<Option<PathBuf>> {
        let suggested = self.default_dir.join(suggested_name);

        loop {
            write!(
                self.output,
                "Save as ({}) [{}]: ",
                filter.description,
                suggested.display()
            )?;
            self.output.flush()?;

            let mut answer = String::new();
            if self.input.read_line(&mut answer)? == 0 {
                return Ok(None);
            }

            let path = match answer.trim() {
                "" => suggested.clone(),
                "-" => return Ok(None),
                typed => PathBuf::from(typed),
            };

            if filter.accepts(&path) {
                return Ok(Some(path));
            }

            writeln!(
                self.output,
                "Only {} ({}) can be saved here.",
                filter.description,
                filter.extensions.join(", ")
            )?;
        }
    }
}

//! Command-line interface definition.
//!
//! Kept free of library types so the build script can render the man page
//! from it.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Select, preview, reorder and merge PDF files.
///
/// The selection and the merge history persist in the state directory
/// between runs. Merged bytes only live as long as the process that made
/// them, so history entries from earlier runs can be listed, renamed and
/// deleted but not opened again; use `pdfstack shell` to keep one session
/// alive.
#[derive(Parser, Debug)]
#[command(name = "pdfstack")]
#[command(version)]
#[command(about = "Select, preview, reorder and merge PDF files", long_about = None)]
#[command(author)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[command(flatten)]
    pub options: GlobalOptions,
}

/// Options shared by every command.
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalOptions {
    /// Increase logging verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Directory holding the persisted selection and history
    #[arg(long, value_name = "DIR", env = "PDFSTACK_STATE_DIR", global = true)]
    pub state_dir: Option<PathBuf>,

    /// Directory merged files are downloaded to
    #[arg(long, value_name = "DIR", env = "PDFSTACK_OUTPUT_DIR", global = true)]
    pub output_dir: Option<PathBuf>,

    /// Order of the history listing
    #[arg(long, value_name = "ORDER", global = true)]
    #[arg(value_parser = ["newest", "oldest"])]
    pub sort: Option<String>,

    /// Compression level for merged output
    ///
    /// - none: No compression
    /// - standard: Compress content streams (default)
    /// - maximum: Compress and drop unused objects
    #[arg(short, long, value_name = "LEVEL", global = true)]
    #[arg(value_parser = ["none", "standard", "maximum"])]
    pub compression: Option<String>,

    /// What to do when a download target already exists
    ///
    /// - rename: Add " (1)", " (2)", ... like a browser (default)
    /// - force: Replace the existing file
    /// - no-clobber: Fail instead
    #[arg(long, value_name = "MODE", global = true)]
    #[arg(value_parser = ["rename", "force", "no-clobber"])]
    pub overwrite: Option<String>,

    /// Number of files previewed concurrently (default: CPU cores)
    #[arg(short, long, value_name = "N", global = true)]
    pub jobs: Option<usize>,

    /// Record open and share requests instead of launching programs
    #[arg(long, global = true)]
    pub no_launch: bool,
}

/// Top-level commands.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Select files, globs or directories and show their previews
    #[command(visible_aliases = ["select", "add"])]
    Preview {
        /// PDF files, glob patterns or directories
        #[arg(required = true, value_name = "PATH")]
        inputs: Vec<String>,
    },

    /// Show the selection restored from the last run
    List,

    /// Forget the selection
    Clear,

    /// Select files in order and merge them
    ///
    /// Examples:
    ///   pdfstack merge a.pdf b.pdf --name report
    ///   pdfstack merge chapter*.pdf
    Merge {
        /// PDF files, glob patterns or directories, in merge order
        #[arg(required = true, value_name = "PATH")]
        inputs: Vec<String>,

        /// Name of the merged file (default: merged_<epoch ms>.pdf)
        #[arg(short, long, value_name = "NAME")]
        name: Option<String>,
    },

    /// Work with the merge history
    #[command(subcommand)]
    History(HistoryCommand),

    /// Interactive session: select, remove, move, merge and manage history
    /// while merged files stay available
    Shell,
}

/// History commands.
#[derive(Subcommand, Debug, Clone)]
pub enum HistoryCommand {
    /// List past merges
    List,
    /// Open a merge in the default viewer
    Open { name: String },
    /// Download a merge again into the output directory
    Download { name: String },
    /// Choose where to save a merge
    Save { name: String },
    /// Rename a merge
    Rename { name: String, new_name: String },
    /// Reveal a merge in the file manager for sharing
    Share { name: String },
    /// Delete a merge from history
    Delete { name: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_merge_with_name() {
        let cli = Cli::try_parse_from(["pdfstack", "merge", "a.pdf", "b.pdf", "-n", "out", "-vv"]).unwrap();

        assert_eq!(cli.options.verbose, 2);
        let Command::Merge { inputs, name } = cli.command else {
            panic!("expected merge");
        };
        assert_eq!(inputs, vec!["a.pdf", "b.pdf"]);
        assert_eq!(name.as_deref(), Some("out"));
    }

    #[test]
    fn test_parse_history_rename() {
        let cli = Cli::try_parse_from(["pdfstack", "history", "rename", "a.pdf", "b"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::History(HistoryCommand::Rename { ref name, ref new_name }) if name == "a.pdf" && new_name == "b"
        ));
    }

    #[test]
    fn test_rejects_unknown_compression() {
        assert!(Cli::try_parse_from(["pdfstack", "list", "--compression", "ultra"]).is_err());
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["pdfstack", "list", "-q", "-v"]).is_err());
    }
}

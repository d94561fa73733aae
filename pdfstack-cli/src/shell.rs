//! Interactive session.
//!
//! One process keeps the selection, the previews and the merged bytes, so
//! everything the page can do is available, including the history actions
//! that need content from this session.

use clap::{Parser, Subcommand};
use std::io::{self, BufRead, Write};

use crate::cli::HistoryCommand;
use pdfstack::Workspace;
use pdfstack::error::PdfStackError;
use pdfstack::output::{
    OutputFormatter, display_history, display_placeholders, display_preview_board,
};
use pdfstack::utils::{default_merge_name, now_millis};

/// One line typed at the prompt.
#[derive(Parser, Debug)]
#[command(multicall = true)]
struct ShellLine {
    #[command(subcommand)]
    command: ShellCommand,
}

#[derive(Subcommand, Debug)]
enum ShellCommand {
    /// Replace the selection with files, globs or directories
    #[command(visible_alias = "select")]
    Add {
        #[arg(required = true, value_name = "PATH")]
        inputs: Vec<String>,
    },
    /// Show the preview board
    #[command(visible_alias = "ls")]
    List,
    /// Drop a file from the selection
    #[command(visible_alias = "rm")]
    Remove { name: String },
    /// Move a file to a new position (0-based)
    #[command(visible_alias = "mv")]
    Move { name: String, index: usize },
    /// Forget the selection
    Clear,
    /// Merge the selection; asks for a name when none is given
    Merge { name: Option<String> },
    /// Work with the merge history
    History {
        #[command(subcommand)]
        command: Option<HistoryCommand>,
    },
    /// Toggle the overflow menu of a history entry
    Menu { name: String },
    /// Leave the session
    #[command(visible_alias = "exit")]
    Quit,
}

/// Run the read-eval-print loop until `quit` or end of input.
pub async fn run(workspace: &mut Workspace, formatter: &OutputFormatter) -> anyhow::Result<()> {
    let restored = workspace.restore()?.to_vec();
    if !restored.is_empty() {
        display_placeholders(formatter, &restored);
    }
    formatter.info("Type `help` for commands, `quit` to leave.");

    let stdin = io::stdin();
    loop {
        print!("pdfstack> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            println!();
            return Ok(());
        }

        let words = match split_words(&line) {
            Ok(words) if words.is_empty() => continue,
            Ok(words) => words,
            Err(e) => {
                formatter.error(&e);
                continue;
            }
        };

        let command = match ShellLine::try_parse_from(&words) {
            Ok(parsed) => parsed.command,
            Err(e) => {
                // Help and usage errors print themselves.
                e.print().ok();
                continue;
            }
        };

        if matches!(command, ShellCommand::Quit) {
            return Ok(());
        }

        if let Err(e) = execute(workspace, formatter, command).await {
            tracing::debug!(error = ?e, "command failed");
            if is_warning(&e) {
                formatter.warning(&format!("{e:#}"));
            } else {
                formatter.error(&format!("{e:#}"));
            }
        }
    }
}

/// Failures confined to one file or history entry are shown as warnings.
fn is_warning(err: &anyhow::Error) -> bool {
    err.downcast_ref::<PdfStackError>()
        .is_some_and(PdfStackError::is_recoverable)
}

async fn execute(
    workspace: &mut Workspace,
    formatter: &OutputFormatter,
    command: ShellCommand,
) -> anyhow::Result<()> {
    // Anything but the menu toggle counts as an outside click.
    if !matches!(command, ShellCommand::Menu { .. }) {
        workspace.dismiss_menus();
    }

    match command {
        ShellCommand::Add { inputs } => {
            let slots = workspace.select(&inputs).await?;
            display_preview_board(formatter, slots);
        }
        ShellCommand::List => show_selection(workspace, formatter),
        ShellCommand::Remove { name } => {
            let slots = workspace.remove(&name).await?;
            display_preview_board(formatter, slots);
        }
        ShellCommand::Move { name, index } => {
            workspace.move_item(&name, index)?;
            display_preview_board(formatter, workspace.previews());
        }
        ShellCommand::Clear => {
            workspace.clear()?;
            formatter.success("Selection cleared.");
        }
        ShellCommand::Merge { name } => {
            // Too few files: skip the prompt, the workspace alerts.
            let name = match name {
                Some(name) => Some(name),
                None if workspace.names().len() < 2 => None,
                None => match prompt_name(&default_merge_name(now_millis()))? {
                    Some(name) => Some(name),
                    None => return Ok(()),
                },
            };

            match workspace.merge(name.as_deref()).await {
                Ok(outcome) => crate::report_merge(formatter, &outcome),
                Err(PdfStackError::InsufficientSelection { .. }) => {}
                Err(e) => return Err(e.into()),
            }
        }
        ShellCommand::History { command } => {
            let command = command.unwrap_or(HistoryCommand::List);
            crate::run_history(workspace, formatter, command).await?;
        }
        ShellCommand::Menu { name } => {
            if workspace.history().get(&name).is_none() {
                return Err(PdfStackError::entry_not_found(name).into());
            }
            workspace.toggle_menu(&name);
            display_history(formatter, &workspace.history_rows(None));
        }
        ShellCommand::Quit => {}
    }

    Ok(())
}

fn show_selection(workspace: &Workspace, formatter: &OutputFormatter) {
    if workspace.names().is_empty() && !workspace.placeholders().is_empty() {
        display_placeholders(formatter, workspace.placeholders());
    } else {
        display_preview_board(formatter, workspace.previews());
    }
    if !workspace.status().is_empty() {
        formatter.info(workspace.status());
    }
}

/// Ask for the merge name. Enter keeps `suggested`; `-` or end of input cancels.
fn prompt_name(suggested: &str) -> io::Result<Option<String>> {
    print!("Enter name for merged PDF [{suggested}]: ");
    io::stdout().flush()?;

    let mut answer = String::new();
    if io::stdin().lock().read_line(&mut answer)? == 0 {
        return Ok(None);
    }

    Ok(match answer.trim() {
        "" => Some(suggested.to_string()),
        "-" => None,
        typed => Some(typed.to_string()),
    })
}

/// Split a command line into words, honoring quotes and backslash escapes.
fn split_words(line: &str) -> Result<Vec<String>, String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quote: Option<char> = None;
    let mut chars = line.trim().chars();

    while let Some(c) = chars.next() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some('"') | None, '\\') => match chars.next() {
                Some(escaped) => {
                    current.push(escaped);
                    in_word = true;
                }
                None => return Err("trailing backslash".to_string()),
            },
            (Some(_), c) => current.push(c),
            (None, '"' | '\'') => {
                quote = Some(c);
                in_word = true;
            }
            (None, c) if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            (None, c) => {
                current.push(c);
                in_word = true;
            }
        }
    }

    if let Some(q) = quote {
        return Err(format!("unclosed {q} quote"));
    }
    if in_word {
        words.push(current);
    }

    Ok(words)
}

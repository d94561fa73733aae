//! pdfstack - select, preview, reorder and merge PDF files.

mod cli;
mod shell;

use anyhow::Context;
use clap::Parser;
use std::io;
use std::process;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::cli::{Cli, Command, GlobalOptions, HistoryCommand};
use pdfstack::config::{Config, Settings};
use pdfstack::error::PdfStackError;
use pdfstack::history::TerminalSavePicker;
use pdfstack::output::{
    OutputFormatter, display_history, display_merge_statistics, display_placeholders,
    display_preview_board,
};
use pdfstack::platform::{Platform, RecordingPlatform, SystemPlatform};
use pdfstack::workspace::{MergeOutcome, Workspace};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    setup_logging(cli.options.verbose);

    if let Err(err) = run(cli).await {
        if !already_reported(&err) {
            eprintln!("Error: {err:#}");
        }
        process::exit(exit_code(&err));
    }
}

/// Setup tracing based on `-v` count; `RUST_LOG` wins when set.
fn setup_logging(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(io::stderr),
        )
        .with(filter)
        .init();
}

fn exit_code(err: &anyhow::Error) -> i32 {
    err.downcast_ref::<PdfStackError>()
        .map_or(1, PdfStackError::exit_code)
}

/// Errors the workspace already showed to the user as an alert.
fn already_reported(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<PdfStackError>(),
        Some(PdfStackError::InsufficientSelection { .. })
    )
}

/// Build the configuration: defaults, then `settings.toml`, then flags.
fn build_config(options: &GlobalOptions) -> anyhow::Result<Config> {
    let mut config = Config::default();
    if let Some(state_dir) = &options.state_dir {
        config.state_dir = state_dir.clone();
    }

    let settings = Settings::load(&config.state_dir)?;
    let mut config = config.apply_settings(&settings)?;

    if let Some(output_dir) = &options.output_dir {
        config.output_dir = output_dir.clone();
    }
    if let Some(sort) = &options.sort {
        config.sort_order = sort.parse()?;
    }
    if let Some(compression) = &options.compression {
        config.compression = compression.parse()?;
    }
    if let Some(overwrite) = &options.overwrite {
        config.overwrite_mode = overwrite.parse()?;
    }
    if options.jobs.is_some() {
        config.jobs = options.jobs;
    }
    config.quiet = options.quiet;
    config.verbose = options.verbose > 0;

    config.validate()?;
    Ok(config)
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = build_config(&cli.options)?;
    let formatter = OutputFormatter::from_config(&config);

    let platform: Arc<dyn Platform> = if cli.options.no_launch {
        Arc::new(RecordingPlatform::default())
    } else {
        Arc::new(SystemPlatform)
    };

    let mut workspace = Workspace::open(&config, platform, Arc::new(formatter.clone()))
        .with_context(|| format!("Failed to open state in {}", config.state_dir.display()))?;

    formatter.debug(&format!("{} v{}", pdfstack::NAME, pdfstack::VERSION));
    formatter.detail("State", &config.state_dir.display().to_string());
    formatter.detail("Downloads", &config.output_dir.display().to_string());

    match cli.command {
        Command::Preview { inputs } => {
            let slots = workspace.select(&inputs).await?;
            display_preview_board(&formatter, slots);
        }
        Command::List => {
            let names = workspace.restore()?.to_vec();
            if names.is_empty() {
                formatter.info("No files selected.");
            } else {
                display_placeholders(&formatter, &names);
            }
        }
        Command::Clear => {
            workspace.clear()?;
            formatter.success("Selection cleared.");
        }
        Command::Merge { inputs, name } => {
            workspace.select(&inputs).await?;
            let outcome = workspace.merge(name.as_deref()).await?;
            report_merge(&formatter, &outcome);
        }
        Command::History(command) => run_history(&mut workspace, &formatter, command).await?,
        Command::Shell => shell::run(&mut workspace, &formatter).await?,
    }

    Ok(())
}

fn report_merge(formatter: &OutputFormatter, outcome: &MergeOutcome) {
    formatter.info(&format!(
        "Merged {} file(s) into {} pages as {}",
        outcome.statistics.files_merged, outcome.statistics.total_pages, outcome.name
    ));
    formatter.info(&format!("Downloaded to {}", outcome.written.path.display()));
    display_merge_statistics(formatter, &outcome.statistics);
}

/// Run one history command.
pub(crate) async fn run_history(
    workspace: &mut Workspace,
    formatter: &OutputFormatter,
    command: HistoryCommand,
) -> anyhow::Result<()> {
    match command {
        HistoryCommand::List => {
            display_history(formatter, &workspace.history_rows(None));
        }
        HistoryCommand::Open { name } => {
            let path = workspace.open_entry(&name).await?;
            formatter.success(&format!("Opened {}", path.display()));
        }
        HistoryCommand::Download { name } => {
            let written = workspace.download_entry(&name).await?;
            formatter.success(&format!("Downloaded to {}", written.path.display()));
        }
        HistoryCommand::Save { name } => {
            let output_dir = workspace.output_dir().to_path_buf();
            let mut picker = TerminalSavePicker::new(io::stdin().lock(), io::stdout(), output_dir);
            if let Some(path) = workspace.save_entry(&name, &mut picker).await? {
                formatter.detail("Saved", &path.display().to_string());
            }
        }
        HistoryCommand::Rename { name, new_name } => {
            let renamed = workspace.rename_entry(&name, &new_name)?;
            formatter.success(&format!("Renamed {name} to {renamed}"));
        }
        HistoryCommand::Share { name } => {
            let path = workspace.share_entry(&name).await?;
            formatter.success(&format!("Shared {}", path.display()));
        }
        HistoryCommand::Delete { name } => {
            if workspace.delete_entry(&name)? {
                formatter.success(&format!("Deleted {name}"));
            } else {
                return Err(PdfStackError::entry_not_found(name).into());
            }
        }
    }

    Ok(())
}

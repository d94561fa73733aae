//! User-facing output.
//!
//! [`OutputFormatter`] prints messages; [`Notifier`] is the seam the
//! workspace reports alerts and status lines through. The `display_*`
//! functions render the workspace's surfaces (preview board, history
//! list) on a formatter.

pub mod formatter;
pub mod notify;

pub use formatter::{MessageLevel, OutputFormatter};
pub use notify::{Notice, Notifier, RecordingNotifier};

use crate::history::{Availability, HistoryRow, RowAction};
use crate::merge::MergeStatistics;
use crate::preview::PreviewSlot;
use crate::utils::format_file_size;

/// Show the preview board, one numbered tile per file.
pub fn display_preview_board(formatter: &OutputFormatter, slots: &[PreviewSlot]) {
    if slots.is_empty() {
        formatter.info("No files selected.");
        return;
    }

    formatter.section("Selected files");
    for (idx, slot) in slots.iter().enumerate() {
        match slot {
            PreviewSlot::Pending { name } => formatter.list_item(idx + 1, name),
            PreviewSlot::Ready(summary) => {
                formatter.list_item(idx + 1, &summary.label());
                if let Some(title) = &summary.title {
                    formatter.detail("Title", title);
                }
                if let Some(author) = &summary.author {
                    formatter.detail("Author", author);
                }
                if let Some((width, height)) = summary.page_dimensions {
                    formatter.detail("Page size", &format!("{width:.0} x {height:.0} pt"));
                }
                formatter.detail("PDF version", &summary.version);
            }
            PreviewSlot::Failed { name, reason } => {
                formatter.list_item(idx + 1, &format!("{name} (preview failed)"));
                formatter.detail("Reason", reason);
            }
        }
    }
}

/// Show names restored from a previous session, which have no previews.
pub fn display_placeholders(formatter: &OutputFormatter, names: &[String]) {
    formatter.section("Selected files");
    for (idx, name) in names.iter().enumerate() {
        formatter.list_item(idx + 1, &format!("{name} (reselect to preview)"));
    }
}

/// Show the history rows with their available actions.
pub fn display_history(formatter: &OutputFormatter, rows: &[HistoryRow]) {
    if rows.is_empty() {
        formatter.info("No merges yet.");
        return;
    }

    formatter.section("Merge history");
    for (idx, row) in rows.iter().enumerate() {
        let mut line = format!("{} ({})", row.name, row.time);
        if row.availability == Availability::ContentUnavailable {
            line.push_str(" [content unavailable]");
        }
        formatter.list_item(idx + 1, &line);

        let (menu, inline): (Vec<_>, Vec<_>) =
            row.actions().into_iter().partition(|action| action.in_menu());
        let names = |actions: &[RowAction]| {
            actions.iter().map(|a| a.as_str()).collect::<Vec<_>>().join(" | ")
        };

        if !inline.is_empty() {
            formatter.sub_item(&names(&inline));
        }
        if row.menu_open {
            formatter.sub_item(&format!("menu: {}", names(&menu)));
        }
    }
}

/// Report a finished merge.
pub fn display_merge_statistics(formatter: &OutputFormatter, stats: &MergeStatistics) {
    formatter.detail("Files merged", &stats.files_merged.to_string());
    formatter.detail("Total pages", &stats.total_pages.to_string());
    formatter.detail("Input size", &stats.format_input_size());
    formatter.detail("Output size", &format_file_size(stats.output_size));
    formatter.detail("Time", &format!("{:.2}s", stats.merge_time.as_secs_f64()));
}

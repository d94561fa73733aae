//! Merge history: the persisted store, its panel, and the save flow.

pub mod panel;
pub mod save;
pub mod store;

pub use panel::{HistoryPanel, HistoryRow, RowAction, SAVE_FAILURE_NOTICE, SAVE_SUCCESS_NOTICE};
pub use save::{FileFilter, PDF_FILTER, SavePicker, TerminalSavePicker};
pub use store::{Availability, HistoryEntry, HistoryListing, HistoryRecord, HistoryStore};

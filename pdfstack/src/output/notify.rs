//! Where alerts and status lines go.

use std::sync::{Arc, Mutex};

/// Receives user notifications.
///
/// An alert interrupts the user (a rejected file, a failed save). A status
/// replaces the single status line; an empty status clears it.
pub trait Notifier: Send + Sync {
    /// Show a blocking notice.
    fn alert(&self, message: &str);

    /// Replace the status line.
    fn status(&self, message: &str);
}

/// A notification captured by [`RecordingNotifier`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// From [`Notifier::alert`].
    Alert(String),
    /// From [`Notifier::status`].
    Status(String),
}

/// Keeps every notification in memory. Clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    notices: Arc<Mutex<Vec<Notice>>>,
}

impl RecordingNotifier {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// All notifications so far, oldest first.
    pub fn notices(&self) -> Vec<Notice> {
        self.notices
            .lock()
            .map(|notices| notices.clone())
            .unwrap_or_default()
    }

    /// Only the alerts.
    pub fn alerts(&self) -> Vec<String> {
        self.notices()
            .into_iter()
            .filter_map(|notice| match notice {
                Notice::Alert(message) => Some(message),
                Notice::Status(_) => None,
            })
            .collect()
    }

    fn push(&self, notice: Notice) {
        if let Ok(mut notices) = self.notices.lock() {
            notices.push(notice);
        }
    }
}

impl Notifier for RecordingNotifier {
    fn alert(&self, message: &str) {
        self.push(Notice::Alert(message.to_string()));
    }

    fn status(&self, message: &str) {
        self.push(Notice::Status(message.to_string()));
    }
}

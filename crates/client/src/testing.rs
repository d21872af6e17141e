//! Test doubles for the collaborator traits.
//!
//! Kept in the library (not behind `cfg(test)`) so integration tests and
//! downstream consumers can wire a client without real collaborators.

use parking_lot::Mutex;

use crate::notify::Notification;
use crate::traits::Notifier;

/// Notifier that records every broadcast for later assertions.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    /// Create an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything broadcast so far, in order.
    #[must_use]
    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().clone()
    }

    /// Number of broadcasts so far.
    #[must_use]
    pub fn count(&self) -> usize {
        self.sent.lock().len()
    }
}

impl Notifier for RecordingNotifier {
    fn send(&self, notification: Notification) {
        self.sent.lock().push(notification);
    }
}

/// Notifier that drops everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn send(&self, _notification: Notification) {}
}

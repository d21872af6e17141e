//! User-facing failure notifications.
//!
//! The client broadcasts a [`Notification`] when a call fails with HTTP 500
//! and the caller did not opt out. Delivery is fire-and-forget; rendering is
//! someone else's job.

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::warn;

use crate::traits::Notifier;

/// Action name broadcast for server errors.
pub const SERVER_ERROR_ACTION: &str = "serverError";

/// A broadcast message for a UI layer to render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// What happened, e.g. [`SERVER_ERROR_ACTION`].
    pub action: String,
    /// Structured payload describing the failure.
    pub data: serde_json::Value,
}

impl Notification {
    /// Notification for a failed API call.
    #[must_use]
    pub fn server_error(url: &str, status: u16) -> Self {
        Self {
            action: SERVER_ERROR_ACTION.to_string(),
            data: json!({ "url": url, "status": status }),
        }
    }
}

/// Default notifier: logs through `tracing` instead of dispatching to a UI.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn send(&self, notification: Notification) {
        warn!(action = %notification.action, data = %notification.data, "user-facing error");
    }
}

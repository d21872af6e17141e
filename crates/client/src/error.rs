//! Error taxonomy for the API client surface.
//!
//! 401s never reach callers directly: the client recovers them through the
//! replay pipeline and callers only ever see the replay's outcome. Everything
//! else maps onto a variant here.

use crate::config::{TIMEOUT_STATUS, TIMEOUT_STATUS_TEXT};
use crate::store::StoreError;

/// Error returned by [`ApiClient::exec`](crate::client::ApiClient::exec).
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Network / TLS / connection-level failure.
    #[error("transport: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-2xx response from the backend. A 401 here means the request was
    /// already replayed once after re-authentication and failed again; that
    /// failure is terminal and never re-queued.
    #[error("status {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body text.
        body: String,
    },

    /// The local timeout race fired before the network future settled.
    /// Distinct from the HTTP library's own timeout; carries a zero status
    /// and a fixed status text so callers can recognize it.
    #[error("{TIMEOUT_STATUS_TEXT} (status {TIMEOUT_STATUS})")]
    Timeout,

    /// The persisted token/session store failed.
    #[error("storage: {0}")]
    Store(#[from] StoreError),

    /// The replay for a parked request was dropped before settling. Only
    /// possible if the runtime tears down mid-drain.
    #[error("replay result channel closed before the request settled")]
    ReplayLost,
}

impl ApiError {
    /// HTTP status associated with this error, if any. The synthesized
    /// timeout reports status 0.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Timeout => Some(TIMEOUT_STATUS),
            Self::Transport(err) => err.status().map(|s| s.as_u16()),
            Self::Store(_) | Self::ReplayLost => None,
        }
    }

    /// True when this is the synthesized local timeout.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_display() {
        let err = ApiError::Status { status: 500, body: "boom".to_string() };
        assert_eq!(err.to_string(), "status 500: boom");
        assert_eq!(err.status(), Some(500));
    }

    #[test]
    fn timeout_reports_zero_status_and_fixed_text() {
        let err = ApiError::Timeout;
        assert!(err.is_timeout());
        assert_eq!(err.status(), Some(0));
        assert!(err.to_string().contains("timeout"));
    }

    #[test]
    fn store_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = ApiError::from(StoreError::from(io));
        assert!(err.to_string().starts_with("storage:"), "got: {err}");
        assert_eq!(err.status(), None);
    }
}

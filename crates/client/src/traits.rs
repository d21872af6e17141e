//! Collaborator traits consumed by the client.
//!
//! These abstract the surfaces the original application provided as shared
//! services (durable key/value storage, URL resolution, the notification
//! dispatcher) so implementations can be injected and mocked.

use async_trait::async_trait;

use crate::notify::Notification;
use crate::store::StoreError;

/// Durable key/value storage for session state.
///
/// The analog of page-durable browser storage: values written here must
/// survive client restarts. Access tokens and session ids live behind fixed
/// keys (see [`crate::config`]).
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read a value.
    ///
    /// # Errors
    /// Returns an error when the backing store fails; a missing key is
    /// `Ok(None)`, not an error.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Write a value, replacing any previous one.
    ///
    /// # Errors
    /// Returns an error when the backing store fails.
    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// Resolves logical service names to concrete URLs.
pub trait UrlResolver: Send + Sync {
    /// Resolve `logical_name` (e.g. `"reauthenticate"`) to a full URL,
    /// appending `params` as query parameters.
    fn get_url(&self, logical_name: &str, params: &[(&str, &str)]) -> String;
}

/// Fire-and-forget channel for user-facing failure notifications.
///
/// Output-only: the client never waits on delivery. Server errors (HTTP 500)
/// are broadcast here unless the caller opted out per call.
pub trait Notifier: Send + Sync {
    /// Broadcast a notification.
    fn send(&self, notification: Notification);
}

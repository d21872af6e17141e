//! Client configuration and fixed protocol constants.

use std::time::Duration;

/// Header that carries the access token on every request, and on the
/// re-authentication response.
pub const ACCESS_TOKEN_HEADER: &str = "x-access-token";

/// Persisted-store key for the access token.
pub const ACCESS_TOKEN_KEY: &str = "docket.access.token";

/// Persisted-store key for the session identifier.
pub const SESSION_ID_KEY: &str = "docket.session.id";

/// Sent to the re-authentication endpoint when no session id is persisted.
pub const NO_SESSION_SENTINEL: &str = "-1";

/// Status text carried by the synthesized local-timeout error.
pub const TIMEOUT_STATUS_TEXT: &str = "timeout";

/// Status code carried by the synthesized local-timeout error.
pub const TIMEOUT_STATUS: u16 = 0;

/// Configuration for [`ApiClient`](crate::client::ApiClient).
///
/// `default_timeout` bounds every API call that does not carry a per-call
/// override; `reauth_timeout` is a shorter, dedicated budget for the session
/// refresh round trip so a hung re-authentication cannot hold the replay
/// queue for the full general timeout.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Timeout applied to API calls without a per-call override.
    pub default_timeout: Duration,
    /// Dedicated timeout for the re-authentication round trip.
    pub reauth_timeout: Duration,
    /// Logical service name resolved to the re-authentication endpoint URL.
    pub reauth_service: String,
    /// When set, non-GET calls short-circuit without touching the network.
    /// Demo/test quirk carried over from the original client; not an error
    /// path.
    pub mock_mode: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            default_timeout: Duration::from_secs(30),
            reauth_timeout: Duration::from_secs(5),
            reauth_service: "reauthenticate".to_string(),
            mock_mode: false,
        }
    }
}

impl ClientConfig {
    /// Override the default per-call timeout.
    #[must_use]
    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    /// Override the re-authentication timeout.
    #[must_use]
    pub fn with_reauth_timeout(mut self, timeout: Duration) -> Self {
        self.reauth_timeout = timeout;
        self
    }

    /// Enable the mock-mode short-circuit for non-GET calls.
    #[must_use]
    pub fn with_mock_mode(mut self, enabled: bool) -> Self {
        self.mock_mode = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_use_short_reauth_budget() {
        let config = ClientConfig::default();
        assert!(config.reauth_timeout < config.default_timeout);
        assert!(!config.mock_mode);
        assert_eq!(config.reauth_service, "reauthenticate");
    }

    #[test]
    fn builder_overrides() {
        let config = ClientConfig::default()
            .with_default_timeout(Duration::from_millis(250))
            .with_reauth_timeout(Duration::from_millis(50))
            .with_mock_mode(true);
        assert_eq!(config.default_timeout, Duration::from_millis(250));
        assert_eq!(config.reauth_timeout, Duration::from_millis(50));
        assert!(config.mock_mode);
    }
}

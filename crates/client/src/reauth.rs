//! Single-flight session re-authentication.
//!
//! At most one refresh round trip is in flight at a time: concurrent 401s
//! only park their replays and piggyback on the flight already running.
//! Whatever the round trip's outcome, the gate is released and the replay
//! queue is drained exactly once per attempt, so the pipeline can never
//! wedge with the gate stuck or replays stranded.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::{ClientConfig, ACCESS_TOKEN_HEADER};
use crate::queue::ReplayQueue;
use crate::session::SessionContext;
use crate::store::StoreError;
use crate::traits::UrlResolver;
use crate::types::ReauthResponse;

/// Error type for re-authentication.
///
/// These errors are logged, not surfaced to API callers: a failed refresh
/// still drains the queue, and each replay then reports its own failure.
#[derive(Debug, thiserror::Error)]
pub enum ReauthError {
    /// The refresh round trip failed at the transport level.
    #[error("transport: {0}")]
    Transport(#[from] reqwest::Error),

    /// The refresh endpoint answered with a non-2xx status.
    #[error("re-authentication endpoint returned status {0}")]
    Status(u16),

    /// The dedicated re-authentication timeout elapsed.
    #[error("re-authentication timed out")]
    Timeout,

    /// The response carried no access token header.
    #[error("re-authentication response missing the {ACCESS_TOKEN_HEADER} header")]
    MissingToken,

    /// Persisting the refreshed state failed.
    #[error("storage: {0}")]
    Store(#[from] StoreError),
}

/// Performs the re-authentication round trip and drains the replay queue.
pub struct Authenticator {
    http: reqwest::Client,
    config: Arc<ClientConfig>,
    session: Arc<SessionContext>,
    resolver: Arc<dyn UrlResolver>,
    queue: Arc<ReplayQueue>,
}

impl Authenticator {
    /// Wire up an authenticator against shared session state and the shared
    /// replay queue.
    pub fn new(
        http: reqwest::Client,
        config: Arc<ClientConfig>,
        session: Arc<SessionContext>,
        resolver: Arc<dyn UrlResolver>,
        queue: Arc<ReplayQueue>,
    ) -> Self {
        Self { http, config, session, resolver, queue }
    }

    /// Refresh the session, then drain the replay queue.
    ///
    /// Idempotent under concurrency: when a refresh is already in flight
    /// this returns immediately without a second network call — the
    /// in-flight attempt will drain the queue, including anything parked by
    /// this caller. Callers never need to check the gate themselves.
    ///
    /// # Errors
    /// Returns the refresh failure after the gate is released and the queue
    /// drained; replays have then already run with whatever token is stored.
    pub async fn reauthenticate(&self) -> Result<(), ReauthError> {
        if !self.session.begin_reauth() {
            debug!("re-authentication already in flight; piggybacking");
            return Ok(());
        }

        let outcome = self.refresh_session().await;

        // Release the gate and drain no matter how the refresh went, so the
        // gate can never stay stuck and replays are never stranded.
        self.session.end_reauth();
        let drained = self.queue.drain().await;

        match &outcome {
            Ok(()) => info!(drained, "session refreshed; parked requests replayed"),
            Err(err) => {
                warn!(%err, drained, "session refresh failed; parked requests replayed with the stored token");
            }
        }
        outcome
    }

    /// One refresh round trip: POST the persisted session id, persist the
    /// token from the response header and the session/case ids from the
    /// body.
    async fn refresh_session(&self) -> Result<(), ReauthError> {
        let session_id = self.session.session_id().await?;
        let url = self.resolver.get_url(&self.config.reauth_service, &[]);
        debug!(%url, "starting session refresh");

        let request = self.http.post(url).body(session_id);
        let response = tokio::time::timeout(self.config.reauth_timeout, request.send())
            .await
            .map_err(|_| ReauthError::Timeout)??;

        let status = response.status();
        if !status.is_success() {
            return Err(ReauthError::Status(status.as_u16()));
        }

        let token = response
            .headers()
            .get(ACCESS_TOKEN_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned)
            .ok_or(ReauthError::MissingToken)?;

        let body: ReauthResponse =
            tokio::time::timeout(self.config.reauth_timeout, response.json())
                .await
                .map_err(|_| ReauthError::Timeout)??;

        self.session.set_access_token(&token).await?;
        self.session.set_session_id(&body.user_session_id).await?;
        self.session.set_case_id(body.user_case.case_id);
        Ok(())
    }
}

impl std::fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authenticator")
            .field("reauth_service", &self.config.reauth_service)
            .field("queue", &self.queue)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use wiremock::matchers::{body_string, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::config::{ClientConfig, NO_SESSION_SENTINEL};
    use crate::store::MemoryStore;
    use crate::urls::ServiceUrlResolver;

    fn authenticator(server_uri: &str, config: ClientConfig) -> (Authenticator, Arc<SessionContext>) {
        let session = Arc::new(SessionContext::new(Arc::new(MemoryStore::new())));
        let auth = Authenticator::new(
            reqwest::Client::new(),
            Arc::new(config),
            Arc::clone(&session),
            Arc::new(ServiceUrlResolver::new(server_uri)),
            Arc::new(ReplayQueue::new()),
        );
        (auth, session)
    }

    #[tokio::test]
    async fn refresh_persists_token_session_and_case() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/reauthenticate"))
            .and(body_string(NO_SESSION_SENTINEL))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header(ACCESS_TOKEN_HEADER, "tok2")
                    .set_body_json(serde_json::json!({
                        "userSessionId": "abc",
                        "userCase": {"caseId": "42"}
                    })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let (auth, session) = authenticator(&server.uri(), ClientConfig::default());
        auth.reauthenticate().await.expect("refresh should succeed");

        assert_eq!(session.access_token().await.expect("store"), Some("tok2".to_string()));
        assert_eq!(session.session_id().await.expect("store"), "abc");
        assert_eq!(session.case_id(), Some("42".to_string()));
        assert!(!session.auth_in_flight());
    }

    #[tokio::test]
    async fn failed_refresh_still_releases_gate() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/reauthenticate"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        let (auth, session) = authenticator(&server.uri(), ClientConfig::default());
        let err = auth.reauthenticate().await.expect_err("refresh should fail");
        assert!(matches!(err, ReauthError::Status(500)));
        assert!(!session.auth_in_flight());
    }

    #[tokio::test]
    async fn missing_token_header_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/reauthenticate"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "userSessionId": "abc",
                "userCase": {"caseId": "42"}
            })))
            .mount(&server)
            .await;

        let (auth, session) = authenticator(&server.uri(), ClientConfig::default());
        let err = auth.reauthenticate().await.expect_err("refresh should fail");
        assert!(matches!(err, ReauthError::MissingToken));
        assert!(!session.auth_in_flight());
        // Nothing was persisted.
        assert_eq!(session.access_token().await.expect("store"), None);
    }

    #[tokio::test]
    async fn refresh_honors_dedicated_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/reauthenticate"))
            .respond_with(
                ResponseTemplate::new(200).set_delay(std::time::Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let config = ClientConfig::default()
            .with_reauth_timeout(std::time::Duration::from_millis(50));
        let (auth, session) = authenticator(&server.uri(), config);
        let err = auth.reauthenticate().await.expect_err("refresh should time out");
        assert!(matches!(err, ReauthError::Timeout));
        assert!(!session.auth_in_flight());
    }
}

//! Public client surface and transparent 401 interception.
//!
//! The interception is composed here at construction time rather than
//! patched onto a shared HTTP object: [`ApiClient::exec`] dispatches the
//! request, and on 401 parks a replay thunk, triggers the (single-flight)
//! authenticator, and settles the caller's future from the replay's outcome.

use std::sync::Arc;

use reqwest::header::CONTENT_TYPE;
use reqwest::Method;
use tokio::sync::oneshot;
use tracing::{debug, warn};

use crate::config::{ClientConfig, ACCESS_TOKEN_HEADER};
use crate::error::ApiError;
use crate::notify::Notification;
use crate::queue::ReplayQueue;
use crate::reauth::Authenticator;
use crate::session::SessionContext;
use crate::substitute;
use crate::traits::{Notifier, UrlResolver};
use crate::types::{ApiResponse, RequestSpec};

/// Authenticated API client.
///
/// Cheap to share behind an [`Arc`]; all state it mutates lives in the
/// injected [`SessionContext`] and the shared replay queue.
pub struct ApiClient {
    http: reqwest::Client,
    config: Arc<ClientConfig>,
    session: Arc<SessionContext>,
    queue: Arc<ReplayQueue>,
    authenticator: Arc<Authenticator>,
    notifier: Arc<dyn Notifier>,
}

impl ApiClient {
    /// Build a client and compose its 401-recovery pipeline.
    ///
    /// # Errors
    /// Returns an error when the underlying HTTP client cannot be
    /// constructed (TLS backend failure).
    pub fn new(
        config: ClientConfig,
        session: Arc<SessionContext>,
        resolver: Arc<dyn UrlResolver>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder().build()?;
        let config = Arc::new(config);
        let queue = Arc::new(ReplayQueue::new());
        let authenticator = Arc::new(Authenticator::new(
            http.clone(),
            Arc::clone(&config),
            Arc::clone(&session),
            resolver,
            Arc::clone(&queue),
        ));
        Ok(Self { http, config, session, queue, authenticator, notifier })
    }

    /// Shared session state.
    #[must_use]
    pub fn session(&self) -> &Arc<SessionContext> {
        &self.session
    }

    /// The replay queue feeding the authenticator's drain.
    #[must_use]
    pub fn queue(&self) -> &Arc<ReplayQueue> {
        &self.queue
    }

    /// The single-flight authenticator.
    #[must_use]
    pub fn authenticator(&self) -> &Arc<Authenticator> {
        &self.authenticator
    }

    /// Execute a request with transparent 401 recovery.
    ///
    /// The returned future settles exactly once: on success from the
    /// original response, on 401 from the eventual replay's outcome. A
    /// replay that fails again (any status, including a second 401) is
    /// terminal for this request.
    ///
    /// # Errors
    /// See [`ApiError`] for the taxonomy. 401s only surface after a failed
    /// replay.
    pub async fn exec(&self, spec: RequestSpec) -> Result<ApiResponse, ApiError> {
        if self.config.mock_mode && spec.method != Method::GET {
            debug!(method = %spec.method, url = %spec.url, "mock mode: skipping non-GET call");
            return Ok(ApiResponse::mock_ack());
        }

        let response = Self::dispatch(
            self.http.clone(),
            Arc::clone(&self.config),
            Arc::clone(&self.session),
            &spec,
        )
        .await?;

        if response.status == 401 {
            return self.park_and_replay(spec).await;
        }
        Self::settle(response, &spec, self.notifier.as_ref())
    }

    /// Park a replay for `spec`, kick the authenticator, and wait for the
    /// replay's result.
    async fn park_and_replay(&self, spec: RequestSpec) -> Result<ApiResponse, ApiError> {
        debug!(url = %spec.url, "401: parking request for replay after re-authentication");

        let (sender, receiver) = oneshot::channel();
        let http = self.http.clone();
        let config = Arc::clone(&self.config);
        let session = Arc::clone(&self.session);
        let notifier = Arc::clone(&self.notifier);
        let captured_case = self.session.case_id();

        self.queue.enqueue(Box::new(move || {
            Box::pin(async move {
                let mut replay = spec;
                // The refreshed session may be bound to a different case;
                // rewrite the captured id so the replay targets the live one.
                if let (Some(old), Some(current)) = (captured_case, session.case_id()) {
                    substitute::rewrite_case_id(&mut replay, &old, &current);
                }

                let result = match Self::dispatch(http, config, Arc::clone(&session), &replay).await
                {
                    Ok(response) => Self::settle(response, &replay, notifier.as_ref()),
                    Err(err) => Err(err),
                };
                // The caller may have gone away; the replay still ran to
                // completion, which is all the queue contract promises.
                let _ = sender.send(result);
            })
        }));

        self.trigger_reauth();

        receiver.await.map_err(|_| ApiError::ReplayLost)?
    }

    /// Fire the authenticator without blocking the 401 handler. The
    /// single-flight gate inside `reauthenticate` collapses concurrent
    /// triggers onto one network call.
    fn trigger_reauth(&self) {
        let authenticator = Arc::clone(&self.authenticator);
        tokio::spawn(async move {
            if let Err(err) = authenticator.reauthenticate().await {
                warn!(%err, "re-authentication failed; replays ran with the stored token");
            }
        });
    }

    /// Build and send one HTTP request, racing it against the local timeout.
    ///
    /// The access token is read from the store here, at send time, never
    /// cached on the client, so token rotation between original send and
    /// replay is picked up automatically.
    async fn dispatch(
        http: reqwest::Client,
        config: Arc<ClientConfig>,
        session: Arc<SessionContext>,
        spec: &RequestSpec,
    ) -> Result<ApiResponse, ApiError> {
        let mut request = http
            .request(spec.method.clone(), spec.url.as_str())
            .header(CONTENT_TYPE, spec.content_type.as_str());

        if let Some(token) = session.access_token().await? {
            request = request.header(ACCESS_TOKEN_HEADER, token);
        }
        for (name, value) in &spec.headers {
            request = request.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &spec.body {
            request = request.body(body.to_string());
        }

        let deadline = spec.timeout.unwrap_or(config.default_timeout);
        let round_trip = async move {
            let response = request.send().await?;
            let status = response.status().as_u16();
            let headers = response.headers().clone();
            let body = response.text().await?;
            Ok::<ApiResponse, ApiError>(ApiResponse { status, headers, body })
        };

        match tokio::time::timeout(deadline, round_trip).await {
            Ok(outcome) => outcome,
            Err(_) => {
                warn!(url = %spec.url, ?deadline, "local timeout fired before the response");
                Err(ApiError::Timeout)
            }
        }
    }

    /// Map a settled response to the caller's result. HTTP 500 additionally
    /// broadcasts a user-facing notification unless the caller opted out;
    /// every other non-2xx surfaces through the error path only.
    fn settle(
        response: ApiResponse,
        spec: &RequestSpec,
        notifier: &dyn Notifier,
    ) -> Result<ApiResponse, ApiError> {
        if response.is_success() {
            return Ok(response);
        }
        if response.status == 500 && spec.notification {
            notifier.send(Notification::server_error(&spec.url, response.status));
        }
        Err(ApiError::Status { status: response.status, body: response.body })
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("config", &self.config)
            .field("queue", &self.queue)
            .finish_non_exhaustive()
    }
}

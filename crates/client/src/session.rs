//! Injected session state shared by the client and the authenticator.
//!
//! One `SessionContext` exists per application instance and is passed by
//! shared ownership to whatever needs to read or mutate session state. No
//! ambient globals: the access token and session id live behind the injected
//! [`KeyValueStore`], the case id and the re-auth gate live in memory here.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use crate::config::{ACCESS_TOKEN_KEY, NO_SESSION_SENTINEL, SESSION_ID_KEY};
use crate::store::StoreError;
use crate::traits::KeyValueStore;

/// Shared session state: access token, session id, active case id, and the
/// single-flight re-authentication gate.
pub struct SessionContext {
    store: Arc<dyn KeyValueStore>,
    case_id: RwLock<Option<String>>,
    auth_in_flight: AtomicBool,
}

impl SessionContext {
    /// Create a context backed by the given durable store.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store, case_id: RwLock::new(None), auth_in_flight: AtomicBool::new(false) }
    }

    /// Current access token, read fresh from the store. `None` before the
    /// first authentication.
    ///
    /// # Errors
    /// Returns an error when the backing store fails.
    pub async fn access_token(&self) -> Result<Option<String>, StoreError> {
        self.store.get(ACCESS_TOKEN_KEY).await
    }

    /// Persist a rotated access token. Picked up by the next outgoing call.
    ///
    /// # Errors
    /// Returns an error when the backing store fails.
    pub async fn set_access_token(&self, token: &str) -> Result<(), StoreError> {
        self.store.set(ACCESS_TOKEN_KEY, token).await
    }

    /// Persisted session id, or the `-1` sentinel when none is stored.
    ///
    /// # Errors
    /// Returns an error when the backing store fails.
    pub async fn session_id(&self) -> Result<String, StoreError> {
        Ok(self
            .store
            .get(SESSION_ID_KEY)
            .await?
            .unwrap_or_else(|| NO_SESSION_SENTINEL.to_string()))
    }

    /// Persist a fresh session id.
    ///
    /// # Errors
    /// Returns an error when the backing store fails.
    pub async fn set_session_id(&self, session_id: &str) -> Result<(), StoreError> {
        self.store.set(SESSION_ID_KEY, session_id).await
    }

    /// Active case id, if any.
    #[must_use]
    pub fn case_id(&self) -> Option<String> {
        self.case_id.read().clone()
    }

    /// Assign the active case id.
    pub fn set_case_id(&self, case_id: impl Into<String>) {
        let case_id = case_id.into();
        debug!(%case_id, "active case changed");
        *self.case_id.write() = Some(case_id);
    }

    /// Try to claim the re-authentication gate. Returns `true` for exactly
    /// one caller until [`Self::end_reauth`] releases it; every other caller
    /// must not start a second refresh.
    pub fn begin_reauth(&self) -> bool {
        self.auth_in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    /// Release the re-authentication gate. Called on success and failure
    /// alike so the gate can never stay stuck.
    pub fn end_reauth(&self) {
        self.auth_in_flight.store(false, Ordering::SeqCst);
    }

    /// Whether a re-authentication round trip is currently in flight.
    #[must_use]
    pub fn auth_in_flight(&self) -> bool {
        self.auth_in_flight.load(Ordering::SeqCst)
    }
}

impl std::fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionContext")
            .field("case_id", &self.case_id.read())
            .field("auth_in_flight", &self.auth_in_flight.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

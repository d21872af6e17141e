//! Authenticated API client for the Docket case-workspace backend.
//!
//! Every outgoing call carries the current access token, read fresh from a
//! pluggable persisted store. When the backend answers 401, the call is not
//! surfaced to the caller: it is parked in a replay queue, a single-flight
//! re-authentication round trip refreshes the session, and every parked call
//! is replayed in FIFO order with the new token. The caller's future settles
//! from the replay's outcome, so a session refresh is invisible except for
//! added latency.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  ApiClient  │  exec(RequestSpec) -> Result<ApiResponse, ApiError>
//! └──────┬──────┘
//!        │ 401
//!        ├──► ReplayQueue      (FIFO, manual drain only)
//!        ├──► Authenticator    (single-flight session refresh)
//!        │         │
//!        │         └──► SessionContext ──► KeyValueStore
//!        │
//!        └──► Notifier         (fire-and-forget user-facing errors)
//! ```
//!
//! # Usage Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use docket_client::{
//!     ApiClient, ClientConfig, MemoryStore, RequestSpec, ServiceUrlResolver, SessionContext,
//!     TracingNotifier,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Arc::new(MemoryStore::new());
//!     let session = Arc::new(SessionContext::new(store));
//!     let resolver = Arc::new(ServiceUrlResolver::new("https://api.docket.example"));
//!     let client = ApiClient::new(
//!         ClientConfig::default(),
//!         session,
//!         resolver,
//!         Arc::new(TracingNotifier),
//!     )?;
//!
//!     let response = client
//!         .exec(RequestSpec::get("https://api.docket.example/api/search?caseId=42"))
//!         .await?;
//!     println!("status {}", response.status);
//!     Ok(())
//! }
//! ```
//!
//! # Module Organization
//!
//! - [`types`]: request/response types and the re-auth wire format
//! - [`session`]: injected session state (token, session id, case id, gate)
//! - [`queue`]: the replay queue
//! - [`reauth`]: the single-flight authenticator
//! - [`client`]: the public client surface and 401 interception
//! - [`substitute`]: structured case-id rewriting for replays

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

pub mod client;
pub mod config;
pub mod error;
pub mod notify;
pub mod queue;
pub mod reauth;
pub mod session;
pub mod store;
pub mod substitute;
pub mod testing;
pub mod traits;
pub mod types;
pub mod urls;

// Re-export commonly used types for convenience
// ------------------------------
pub use client::ApiClient;
pub use config::{
    ClientConfig, ACCESS_TOKEN_HEADER, ACCESS_TOKEN_KEY, NO_SESSION_SENTINEL, SESSION_ID_KEY,
};
pub use error::ApiError;
pub use notify::{Notification, TracingNotifier};
pub use queue::{ReplayQueue, ReplayThunk};
pub use reauth::{Authenticator, ReauthError};
pub use session::SessionContext;
pub use store::{JsonFileStore, MemoryStore, StoreError};
pub use traits::{KeyValueStore, Notifier, UrlResolver};
pub use types::{ApiResponse, ReauthResponse, RequestSpec};
pub use urls::ServiceUrlResolver;

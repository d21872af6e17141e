//! Request/response types and the re-authentication wire format.

use std::time::Duration;

use reqwest::header::HeaderMap;
use reqwest::Method;
use serde::{Deserialize, Serialize};

/// A normalized outgoing API request.
///
/// Built by callers and handed to
/// [`ApiClient::exec`](crate::client::ApiClient::exec). The access token is
/// never part of the spec: it is read fresh from the session store at send
/// time (and again at replay time), so a token rotated mid-session is picked
/// up automatically.
#[derive(Debug, Clone)]
pub struct RequestSpec {
    /// HTTP method. Defaults to GET via [`RequestSpec::get`].
    pub method: Method,
    /// Absolute request URL.
    pub url: String,
    /// Content type header value. Defaults to `application/json`.
    pub content_type: String,
    /// Optional JSON body.
    pub body: Option<serde_json::Value>,
    /// Extra headers, merged after the access token header.
    pub headers: Vec<(String, String)>,
    /// Per-call timeout override. Falls back to the configured default.
    pub timeout: Option<Duration>,
    /// Whether a qualifying failure (HTTP 500) should broadcast a
    /// user-facing notification. Defaults to true.
    pub notification: bool,
}

impl RequestSpec {
    /// Build a request with an explicit method.
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            content_type: "application/json".to_string(),
            body: None,
            headers: Vec::new(),
            timeout: None,
            notification: true,
        }
    }

    /// Build a GET request.
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    /// Build a POST request.
    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::POST, url)
    }

    /// Attach a JSON body.
    #[must_use]
    pub fn json_body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Append an extra header.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Override the timeout for this call only.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Override the content type.
    #[must_use]
    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    /// Opt out of the user-facing notification on server errors.
    #[must_use]
    pub fn silent(mut self) -> Self {
        self.notification = false;
        self
    }
}

/// A settled API response.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response headers.
    pub headers: HeaderMap,
    /// Raw response body text.
    pub body: String,
}

impl ApiResponse {
    /// Parse the body as JSON.
    ///
    /// # Errors
    /// Returns the underlying parse error when the body is not valid JSON of
    /// the requested shape.
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_str(&self.body)
    }

    /// Look up a response header as a string.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }

    /// The empty acknowledgement returned by the mock-mode short-circuit.
    #[must_use]
    pub fn mock_ack() -> Self {
        Self { status: 204, headers: HeaderMap::new(), body: String::new() }
    }

    /// True for any 2xx status.
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// JSON body of a successful re-authentication response.
///
/// The new access token travels separately, in the `x-access-token`
/// response header.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReauthResponse {
    /// Fresh session identifier, persisted for the next refresh.
    #[serde(rename = "userSessionId")]
    pub user_session_id: String,
    /// The case the refreshed session is bound to.
    #[serde(rename = "userCase")]
    pub user_case: UserCase,
}

/// Active case binding carried by the re-authentication response. A fresh
/// session may bind to a different case than the one in flight, which is why
/// replays rewrite case ids.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserCase {
    /// Active case identifier.
    #[serde(rename = "caseId")]
    pub case_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_spec_defaults() {
        let spec = RequestSpec::get("https://api.example.com/api/search");
        assert_eq!(spec.method, Method::GET);
        assert_eq!(spec.content_type, "application/json");
        assert!(spec.body.is_none());
        assert!(spec.timeout.is_none());
        assert!(spec.notification);
    }

    #[test]
    fn request_spec_builders() {
        let spec = RequestSpec::post("https://api.example.com/api/tag")
            .json_body(serde_json::json!({"caseId": "42"}))
            .header("x-request-id", "abc")
            .timeout(Duration::from_millis(100))
            .silent();
        assert_eq!(spec.method, Method::POST);
        assert!(spec.body.is_some());
        assert_eq!(spec.headers, vec![("x-request-id".to_string(), "abc".to_string())]);
        assert_eq!(spec.timeout, Some(Duration::from_millis(100)));
        assert!(!spec.notification);
    }

    #[test]
    fn reauth_response_wire_format() {
        let parsed: ReauthResponse =
            serde_json::from_str(r#"{"userSessionId":"abc","userCase":{"caseId":"42"}}"#)
                .expect("wire format should parse");
        assert_eq!(parsed.user_session_id, "abc");
        assert_eq!(parsed.user_case.case_id, "42");
    }

    #[test]
    fn mock_ack_is_success() {
        let ack = ApiResponse::mock_ack();
        assert!(ack.is_success());
        assert!(ack.body.is_empty());
    }
}

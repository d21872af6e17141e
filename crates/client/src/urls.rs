//! Logical service name resolution.

use std::collections::HashMap;

use crate::traits::UrlResolver;

/// Resolves logical service names against a base URL, with optional
/// per-service overrides for endpoints that live elsewhere.
#[derive(Debug, Clone)]
pub struct ServiceUrlResolver {
    base_url: String,
    overrides: HashMap<String, String>,
}

impl ServiceUrlResolver {
    /// Create a resolver rooted at `base_url` (trailing slash tolerated).
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url, overrides: HashMap::new() }
    }

    /// Route one logical name to a full URL instead of `base/name`.
    #[must_use]
    pub fn with_override(mut self, logical_name: impl Into<String>, url: impl Into<String>) -> Self {
        self.overrides.insert(logical_name.into(), url.into());
        self
    }
}

impl UrlResolver for ServiceUrlResolver {
    fn get_url(&self, logical_name: &str, params: &[(&str, &str)]) -> String {
        let mut url = self
            .overrides
            .get(logical_name)
            .cloned()
            .unwrap_or_else(|| format!("{}/{}", self.base_url, logical_name));
        if !params.is_empty() {
            let query = params
                .iter()
                .map(|(key, value)| format!("{key}={value}"))
                .collect::<Vec<_>>()
                .join("&");
            url.push('?');
            url.push_str(&query);
        }
        url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_against_base() {
        let resolver = ServiceUrlResolver::new("https://api.example.com/");
        assert_eq!(
            resolver.get_url("reauthenticate", &[]),
            "https://api.example.com/reauthenticate"
        );
    }

    #[test]
    fn appends_query_params() {
        let resolver = ServiceUrlResolver::new("https://api.example.com");
        assert_eq!(
            resolver.get_url("search", &[("caseId", "42"), ("page", "2")]),
            "https://api.example.com/search?caseId=42&page=2"
        );
    }

    #[test]
    fn override_wins() {
        let resolver = ServiceUrlResolver::new("https://api.example.com")
            .with_override("reauthenticate", "https://auth.example.com/session/refresh");
        assert_eq!(
            resolver.get_url("reauthenticate", &[]),
            "https://auth.example.com/session/refresh"
        );
    }
}

//! Structured case-id rewriting for replayed requests.
//!
//! A fresh session may bind to a different active case, so a replay must not
//! target the case captured at failure time. The original client did this
//! with raw string substitution over the URL and body, which can falsely
//! match substrings; here the URL is rewritten per query parameter and path
//! segment, and the JSON body per string value, all on exact matches only.

use tracing::debug;
use url::Url;

use crate::types::RequestSpec;

/// Rewrite every exact occurrence of `old` to `new` in the spec's URL query
/// parameters, URL path segments, and JSON body string values.
pub fn rewrite_case_id(spec: &mut RequestSpec, old: &str, new: &str) {
    if old == new {
        return;
    }
    if let Some(rewritten) = rewrite_url(&spec.url, old, new) {
        if rewritten != spec.url {
            debug!(from = %spec.url, to = %rewritten, "rewrote case id in replay url");
            spec.url = rewritten;
        }
    }
    if let Some(body) = spec.body.as_mut() {
        rewrite_json(body, old, new);
    }
}

/// Rewrite query parameter values and path segments that exactly equal
/// `old`. Returns `None` when the URL does not parse; the replay then goes
/// out untouched and fails the same way the original request would.
fn rewrite_url(raw: &str, old: &str, new: &str) -> Option<String> {
    let mut url = Url::parse(raw).ok()?;

    if let Some(segments) = url.path_segments().map(|s| s.map(str::to_owned).collect::<Vec<_>>()) {
        let rewritten: Vec<String> = segments
            .iter()
            .map(|segment| if segment == old { new.to_string() } else { segment.clone() })
            .collect();
        if rewritten != segments {
            url.set_path(&rewritten.join("/"));
        }
    }

    if url.query().is_some() {
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| {
                let value = if v == old { new.to_string() } else { v.into_owned() };
                (k.into_owned(), value)
            })
            .collect();
        url.query_pairs_mut().clear().extend_pairs(pairs.iter().map(|(k, v)| (k, v)));
    }

    Some(url.to_string())
}

/// Recursively rewrite string values equal to `old` anywhere in the JSON
/// tree. Keys and non-string scalars are left alone.
fn rewrite_json(value: &mut serde_json::Value, old: &str, new: &str) {
    match value {
        serde_json::Value::String(text) => {
            if text == old {
                *text = new.to_string();
            }
        }
        serde_json::Value::Array(items) => {
            for item in items {
                rewrite_json(item, old, new);
            }
        }
        serde_json::Value::Object(map) => {
            for item in map.values_mut() {
                rewrite_json(item, old, new);
            }
        }
        _ => {}
    }
}

//! Header shapes and the allow-list filter.
//!
//! CloudFront wants every header as an ordered list of `{key?, value}`
//! records keyed by the lower-cased name. HTTP clients hand back either bare
//! strings, lists of strings, or (when the value came from another edge
//! event) the wrapped form already; `RawHeaderValue` covers all three.

use std::collections::BTreeMap;

use axum::http::{HeaderMap, HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};

/// Headers forwarded from a fetched index document.
pub const DEFAULT_ALLOWED_HEADERS: [&str; 5] = [
    "content-type",
    "content-length",
    "last-modified",
    "date",
    "etag",
];

/// Content type synthesized when a fetched document carries no headers.
pub const DEFAULT_DOCUMENT_CONTENT_TYPE: &str = "text/html;charset=UTF-8";

/// One header record in CDN wire shape.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct HeaderEntry {
    /// Original-case header name; optional on the wire.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    pub value: String,
}

impl HeaderEntry {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            key: None,
            value: value.into(),
        }
    }

    pub fn with_key(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: Some(key.into()),
            value: value.into(),
        }
    }
}

/// Lower-cased header name → ordered records.
pub type EdgeHeaders = BTreeMap<String, Vec<HeaderEntry>>;

/// A header value before normalization.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum RawHeaderValue {
    /// Already in `[{value}]` form.
    Wrapped(Vec<HeaderEntry>),
    /// Multi-valued header as plain strings (e.g. `set-cookie`).
    Many(Vec<String>),
    Single(String),
}

impl RawHeaderValue {
    /// Normalize into CDN records. Wrapped values are returned as-is.
    pub fn wrap(self) -> Vec<HeaderEntry> {
        match self {
            RawHeaderValue::Wrapped(entries) => entries,
            RawHeaderValue::Many(values) => values.into_iter().map(HeaderEntry::new).collect(),
            RawHeaderValue::Single(value) => vec![HeaderEntry::new(value)],
        }
    }
}

/// Header name (any case) → value as received.
pub type RawHeaders = BTreeMap<String, RawHeaderValue>;

/// Keep only allow-listed headers and normalize them to CDN records.
///
/// Names are compared case-insensitively and emitted lower-cased. Two raw
/// names differing only in case end up under the same key, in input order.
pub fn wrap_and_filter<S: AsRef<str>>(headers: RawHeaders, allowed: &[S]) -> EdgeHeaders {
    let mut filtered = EdgeHeaders::new();

    for (name, value) in headers {
        let name = name.to_ascii_lowercase();
        if !allowed
            .iter()
            .any(|allowed| allowed.as_ref().eq_ignore_ascii_case(&name))
        {
            continue;
        }
        filtered.entry(name).or_default().extend(value.wrap());
    }

    filtered
}

/// The single header used when a fetched document has none.
pub fn default_document_headers() -> EdgeHeaders {
    let mut headers = EdgeHeaders::new();
    headers.insert(
        "content-type".to_string(),
        vec![HeaderEntry::new(DEFAULT_DOCUMENT_CONTENT_TYPE)],
    );
    headers
}

/// Collect an HTTP header map into raw values, grouping repeated names.
///
/// Values that are not visible ASCII are skipped.
pub fn raw_from_http(map: &HeaderMap) -> RawHeaders {
    let mut raw = RawHeaders::new();

    for name in map.keys() {
        let mut values: Vec<String> = map
            .get_all(name)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .map(str::to_owned)
            .collect();

        let value = match values.len() {
            0 => continue,
            1 => RawHeaderValue::Single(values.remove(0)),
            _ => RawHeaderValue::Many(values),
        };
        raw.insert(name.as_str().to_owned(), value);
    }

    raw
}

/// Convert an HTTP header map into CDN records, keeping every header.
pub fn edge_from_http(map: &HeaderMap) -> EdgeHeaders {
    let mut headers = EdgeHeaders::new();

    for (name, value) in map.iter() {
        let Ok(value) = value.to_str() else {
            tracing::debug!(header = %name, "Dropping non-ASCII header value");
            continue;
        };
        headers
            .entry(name.as_str().to_owned())
            .or_default()
            .push(HeaderEntry::with_key(name.as_str(), value));
    }

    headers
}

/// Convert CDN records back into an HTTP header map.
///
/// Invalid names or values are logged and skipped rather than failing the
/// whole response.
pub fn edge_to_http(headers: &EdgeHeaders) -> HeaderMap {
    let mut map = HeaderMap::new();

    for (name, entries) in headers {
        let Ok(header_name) = HeaderName::from_bytes(name.as_bytes()) else {
            tracing::warn!(header = %name, "Skipping invalid header name");
            continue;
        };
        for entry in entries {
            match HeaderValue::from_str(&entry.value) {
                Ok(value) => {
                    map.append(header_name.clone(), value);
                }
                Err(_) => {
                    tracing::warn!(header = %name, "Skipping invalid header value");
                }
            }
        }
    }

    map
}

//! Index document retrieval.
//!
//! # Responsibilities
//! - Build the index URL on the distribution's own domain
//! - Issue a single GET (no retries)
//! - Hand back status, headers and body, or a `FetchError`

use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::edge::headers::{raw_from_http, RawHeaders};
use crate::error::EdgeError;

/// Body and headers of a successfully fetched document.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedDocument {
    pub status: u16,
    pub headers: RawHeaders,
    pub body: String,
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid index URL {url}: {source}")]
    Url {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} answered with status {status}")]
    Status { url: String, status: u16 },
    #[error("reading body from {url} failed: {source}")]
    Body {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Source of the SPA index document.
pub trait IndexFetcher: Send + Sync {
    /// Fetch `path` from `domain`. Non-2xx answers are errors.
    fn fetch(
        &self,
        domain: &str,
        path: &str,
    ) -> impl Future<Output = Result<FetchedDocument, FetchError>> + Send;
}

/// `reqwest`-backed fetcher hitting the distribution itself, so the document
/// is served from the edge cache rather than the raw origin.
#[derive(Debug, Clone)]
pub struct HttpIndexFetcher {
    client: reqwest::Client,
    scheme: String,
}

impl HttpIndexFetcher {
    /// `timeout` of `None` keeps the client default.
    pub fn new(scheme: impl Into<String>, timeout: Option<Duration>) -> Result<Self, EdgeError> {
        let mut builder = reqwest::Client::builder().no_proxy();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            scheme: scheme.into(),
        })
    }

    pub fn index_url(&self, domain: &str, path: &str) -> Result<Url, FetchError> {
        let raw = format!("{}://{}", self.scheme, domain);
        Url::parse(&raw)
            .and_then(|base| base.join(path))
            .map_err(|source| FetchError::Url { url: raw, source })
    }
}

impl IndexFetcher for HttpIndexFetcher {
    async fn fetch(&self, domain: &str, path: &str) -> Result<FetchedDocument, FetchError> {
        let url = self.index_url(domain, path)?;

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|source| FetchError::Transport {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        tracing::debug!(url = %url, status = %status, "Fetched index document");

        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let headers = raw_from_http(response.headers());
        let body = response.text().await.map_err(|source| FetchError::Body {
            url: url.to_string(),
            source,
        })?;

        Ok(FetchedDocument {
            status: status.as_u16(),
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_url_on_distribution_domain() {
        let fetcher = HttpIndexFetcher::new("https", None).unwrap();
        let url = fetcher
            .index_url("d111111abcdef8.cloudfront.net", "/index.html")
            .unwrap();
        assert_eq!(url.as_str(), "https://d111111abcdef8.cloudfront.net/index.html");
    }

    #[test]
    fn test_index_url_keeps_port() {
        let fetcher = HttpIndexFetcher::new("http", None).unwrap();
        let url = fetcher.index_url("127.0.0.1:8080", "/index.html").unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:8080/index.html");
    }

    #[test]
    fn test_index_url_rejects_garbage_domain() {
        let fetcher = HttpIndexFetcher::new("https", None).unwrap();
        assert!(matches!(
            fetcher.index_url("bad host", "/index.html"),
            Err(FetchError::Url { .. })
        ));
    }
}

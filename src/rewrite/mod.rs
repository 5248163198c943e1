//! Origin-response rewriter for single-page applications.
//!
//! # Data Flow
//! ```text
//! CfRequest + CfResponse (from origin)
//!     → should_replace? (GET and 403/404)
//!         no  → original CfResponse (pass-through)
//!         yes → fetch.rs (GET /index.html on the distribution domain)
//!                 ok  → 200 + allow-listed headers + document body
//!                 err → 500 text/plain, fixed body
//! ```
//!
//! # Design Decisions
//! - The rewriter never fails on fetch errors; the CDN always gets a response
//! - One fetch, no retries, client-default timeout unless configured
//! - The fetcher is a trait so tests and the emulator can swap it

mod fetch;

pub use fetch::{FetchError, FetchedDocument, HttpIndexFetcher, IndexFetcher};

use std::time::{Duration, Instant};

use crate::config::RewriteConfig;
use crate::edge::headers::{default_document_headers, wrap_and_filter, DEFAULT_ALLOWED_HEADERS};
use crate::edge::{CfRecord, CfRequest, CfResponse, EdgeHeaders, EdgeResult, HeaderEntry};
use crate::error::EdgeError;
use crate::observability::metrics;

pub const DEFAULT_INDEX_DOCUMENT: &str = "index.html";
pub const DEFAULT_ERROR_BODY: &str = "An error occurred loading the page";
pub const DEFAULT_FETCH_SCHEME: &str = "https";

/// Statuses S3 answers for a key that does not exist.
const MISS_STATUSES: [&str; 2] = ["403", "404"];

/// Outcome of the origin-response trigger.
#[derive(Debug, Clone, PartialEq)]
pub enum Rewrite {
    /// Not a client-side route miss; the origin response goes out untouched.
    PassThrough(CfResponse),
    /// Index document substituted.
    Replaced(CfResponse),
    /// Index fetch failed; fixed 500 substituted.
    Failed(CfResponse),
}

impl Rewrite {
    pub fn is_pass_through(&self) -> bool {
        matches!(self, Rewrite::PassThrough(_))
    }

    pub fn into_response(self) -> CfResponse {
        match self {
            Rewrite::PassThrough(r) | Rewrite::Replaced(r) | Rewrite::Failed(r) => r,
        }
    }

    pub fn into_result(self) -> EdgeResult {
        EdgeResult::Response(self.into_response())
    }
}

/// Substitutes the SPA index document for client-side route misses.
#[derive(Debug, Clone)]
pub struct ResponseRewriter<F = HttpIndexFetcher> {
    fetcher: F,
    index_path: String,
    allowed_headers: Vec<String>,
    error_body: String,
}

impl ResponseRewriter<HttpIndexFetcher> {
    pub fn from_config(config: &RewriteConfig) -> Result<Self, EdgeError> {
        let fetcher = HttpIndexFetcher::new(
            config.fetch_scheme.as_deref().unwrap_or(DEFAULT_FETCH_SCHEME),
            config.fetch_timeout_secs.map(Duration::from_secs),
        )?;
        Ok(Self::with_config(fetcher, config))
    }
}

impl<F: IndexFetcher> ResponseRewriter<F> {
    /// Rewriter with the default index document, allow-list and error body.
    pub fn new(fetcher: F) -> Self {
        Self {
            fetcher,
            index_path: format!("/{DEFAULT_INDEX_DOCUMENT}"),
            allowed_headers: DEFAULT_ALLOWED_HEADERS.iter().map(|h| h.to_string()).collect(),
            error_body: DEFAULT_ERROR_BODY.to_string(),
        }
    }

    pub fn with_config(fetcher: F, config: &RewriteConfig) -> Self {
        Self {
            fetcher,
            index_path: format!("/{}", config.index_document.trim_start_matches('/')),
            allowed_headers: config
                .allowed_headers
                .iter()
                .map(|h| h.to_ascii_lowercase())
                .collect(),
            error_body: config.error_body.clone(),
        }
    }

    pub fn index_path(&self) -> &str {
        &self.index_path
    }

    /// The index fetch itself. A proxy running this rewriter in front of the
    /// same domain must not rewrite it, or a missing index loops.
    pub fn is_index_request(&self, request: &CfRequest) -> bool {
        request.uri == self.index_path
    }

    /// A `GET` that the origin answered with 403 or 404.
    pub fn should_replace(request: &CfRequest, response: &CfResponse) -> bool {
        request.method == "GET" && MISS_STATUSES.contains(&response.status.as_str())
    }

    /// Apply the rewrite. Never fails: fetch errors become a 500 response.
    pub async fn rewrite(&self, request: &CfRequest, response: CfResponse, domain: &str) -> Rewrite {
        if !Self::should_replace(request, &response) {
            metrics::record_rewrite("pass_through");
            return Rewrite::PassThrough(response);
        }

        tracing::info!(
            uri = %request.uri,
            status = %response.status,
            domain = %domain,
            index = %self.index_path,
            "Client-side route miss, substituting index document"
        );

        let started = Instant::now();
        let fetched = self.fetcher.fetch(domain, &self.index_path).await;
        metrics::record_index_fetch(started, fetched.is_ok());

        match fetched {
            Ok(document) => {
                metrics::record_rewrite("replaced");
                Rewrite::Replaced(self.document_response(document))
            }
            Err(err) => {
                tracing::warn!(
                    uri = %request.uri,
                    domain = %domain,
                    error = %err,
                    "Index document fetch failed"
                );
                metrics::record_rewrite("failed");
                Rewrite::Failed(self.error_response())
            }
        }
    }

    /// Record-level entry point for the origin-response trigger.
    pub async fn handle(&self, record: CfRecord) -> Result<Rewrite, EdgeError> {
        let CfRecord {
            config,
            request,
            response,
        } = record;
        let response = response.ok_or(EdgeError::MissingResponse)?;

        Ok(self
            .rewrite(&request, response, &config.distribution_domain_name)
            .await)
    }

    /// The fixed response used when the index document cannot be loaded.
    pub fn error_response(&self) -> CfResponse {
        let mut headers = EdgeHeaders::new();
        headers.insert(
            "content-type".to_string(),
            vec![HeaderEntry::new("text/plain")],
        );
        CfResponse::new("500", headers).with_body(self.error_body.clone())
    }

    fn document_response(&self, document: FetchedDocument) -> CfResponse {
        let mut headers = if document.headers.is_empty() {
            default_document_headers()
        } else {
            wrap_and_filter(document.headers, &self.allowed_headers)
        };

        // The body is decoded text; a length measured on the wire may not match it.
        let stale_length = headers.get("content-length").is_some_and(|entries| {
            entries
                .iter()
                .any(|e| e.value.trim().parse::<usize>().ok() != Some(document.body.len()))
        });
        if stale_length {
            tracing::debug!(index = %self.index_path, "Dropping content-length of decoded index body");
            headers.remove("content-length");
        }

        CfResponse::new("200", headers).with_body(document.body)
    }
}

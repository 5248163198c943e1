//! Origin-request redirector for short match URLs.
//!
//! # Data Flow
//! ```text
//! CfRequest.uri
//!     → MATCH_URL_PATTERN (/m/<match>/<contest>/<group>/...)
//!     → DeepLinkIds
//!     → DeepLinkTemplate::render
//!     → 301 CfResponse (location)
//!
//! No match → original CfRequest, unchanged
//! ```

pub mod template;

pub use template::{DeepLinkIds, DeepLinkTemplate};

use regex::Regex;

use crate::config::RedirectConfig;
use crate::edge::{CfRecord, CfRequest, CfResponse, EdgeHeaders, EdgeResult, HeaderEntry};
use crate::error::EdgeError;
use crate::observability::metrics;

/// Short vanity path: `/m/<matchId>/<contestId>/<groupId>/<slug>`.
///
/// Ids are ASCII digits only; `\d` would also accept other Unicode digits.
pub const MATCH_URL_PATTERN: &str = r"(?i)^/m/([0-9]+)/([0-9]+)/([0-9]+)/.*";

pub const REDIRECT_STATUS: &str = "301";
pub const REDIRECT_DESCRIPTION: &str = "Found";

/// Outcome of the origin-request trigger.
#[derive(Debug, Clone, PartialEq)]
pub enum Redirect {
    /// No match: the CDN continues to the origin with this request.
    PassThrough(CfRequest),
    Moved(CfResponse),
}

impl Redirect {
    pub fn into_result(self) -> EdgeResult {
        match self {
            Redirect::PassThrough(request) => EdgeResult::Request(request),
            Redirect::Moved(response) => EdgeResult::Response(response),
        }
    }
}

/// Stateless request redirector. Cheap to share behind an `Arc`.
#[derive(Debug, Clone)]
pub struct RequestRedirector {
    pattern: Regex,
    template: DeepLinkTemplate,
}

impl RequestRedirector {
    pub fn new(template: DeepLinkTemplate) -> Result<Self, EdgeError> {
        Ok(Self {
            pattern: Regex::new(MATCH_URL_PATTERN)?,
            template,
        })
    }

    pub fn from_config(config: &RedirectConfig) -> Result<Self, EdgeError> {
        Self::new(DeepLinkTemplate::from_config(config))
    }

    /// Extract the three numeric segments, or `None` when the URI is not a
    /// short match URL.
    pub fn match_uri(&self, uri: &str) -> Option<DeepLinkIds> {
        let captures = self.pattern.captures(uri)?;
        Some(DeepLinkIds {
            match_id: captures.get(1)?.as_str().to_owned(),
            contest_id: captures.get(2)?.as_str().to_owned(),
            group_id: captures.get(3)?.as_str().to_owned(),
        })
    }

    pub fn redirect(&self, request: CfRequest) -> Redirect {
        let Some(ids) = self.match_uri(&request.uri) else {
            tracing::debug!(uri = %request.uri, "No redirect pattern match");
            metrics::record_redirect(false);
            return Redirect::PassThrough(request);
        };

        let location = self.template.render(&ids);
        tracing::info!(
            uri = %request.uri,
            match_id = %ids.match_id,
            contest_id = %ids.contest_id,
            group_id = %ids.group_id,
            location = %location,
            "Redirecting short match URL"
        );
        metrics::record_redirect(true);

        let mut headers = EdgeHeaders::new();
        headers.insert(
            "location".to_string(),
            vec![HeaderEntry::with_key("Location", location)],
        );
        Redirect::Moved(
            CfResponse::new(REDIRECT_STATUS, headers).with_description(REDIRECT_DESCRIPTION),
        )
    }

    /// Record-level entry point for the origin-request trigger.
    pub fn handle(&self, record: CfRecord) -> Redirect {
        self.redirect(record.request)
    }
}

impl Default for RequestRedirector {
    fn default() -> Self {
        Self {
            pattern: Regex::new(MATCH_URL_PATTERN).expect("static redirect pattern"),
            template: DeepLinkTemplate::default(),
        }
    }
}

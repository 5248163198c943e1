//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the edge
//! triggers and the local emulator. All types derive Serde traits for
//! deserialization from config files, and every field has a default so an
//! empty file yields the production behavior.

use serde::{Deserialize, Serialize};

use crate::edge::headers::DEFAULT_ALLOWED_HEADERS;
use crate::redirect::template::{
    DEFAULT_APPLICATION_ID, DEFAULT_BASE_URL, DEFAULT_DEEP_LINK_PATH, DEFAULT_TIKTOK_MODE,
};
use crate::rewrite::{DEFAULT_ERROR_BODY, DEFAULT_INDEX_DOCUMENT};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EdgeConfig {
    /// Emulator listener (bind address, concurrency).
    pub listener: ListenerConfig,

    /// Distribution metadata passed to the triggers.
    pub distribution: DistributionConfig,

    /// Origin-response rewriter settings.
    pub rewrite: RewriteConfig,

    /// Origin-request redirector settings.
    pub redirect: RedirectConfig,

    /// Origins the emulator can forward to.
    pub origins: Vec<OriginConfig>,

    /// Behavior applied when no path pattern matches.
    pub default_behavior: DefaultBehaviorConfig,

    /// Ordered path-pattern behaviors.
    pub behaviors: Vec<BehaviorConfig>,

    /// Timeout and size limits.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for EdgeConfig {
    fn default() -> Self {
        Self {
            listener: ListenerConfig::default(),
            distribution: DistributionConfig::default(),
            rewrite: RewriteConfig::default(),
            redirect: RedirectConfig::default(),
            origins: vec![OriginConfig {
                name: DEFAULT_ORIGIN_NAME.to_string(),
                address: "127.0.0.1:9000".to_string(),
                host_header: None,
            }],
            default_behavior: DefaultBehaviorConfig::default(),
            behaviors: Vec::new(),
            timeouts: TimeoutConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

/// Name of the static SPA origin in the default config.
pub const DEFAULT_ORIGIN_NAME: &str = "spa";

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Maximum requests served concurrently.
    pub max_connections: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            max_connections: 1024,
        }
    }
}

/// Distribution the triggers believe they run in.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DistributionConfig {
    /// Domain the rewriter fetches the index document from.
    pub domain_name: String,

    /// Reported in emulated events.
    pub distribution_id: String,
}

impl Default for DistributionConfig {
    fn default() -> Self {
        Self {
            domain_name: "localhost:8080".to_string(),
            distribution_id: "EDFDVBD6EXAMPLE".to_string(),
        }
    }
}

/// Origin-response rewriter settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RewriteConfig {
    pub enabled: bool,

    /// Document substituted for route misses, relative to the domain root.
    pub index_document: String,

    /// Scheme of the index fetch. Unset means `https` for Lambda and
    /// `invoke`, `http` under the emulator (which has no TLS).
    pub fetch_scheme: Option<String>,

    /// Headers copied from the fetched document.
    pub allowed_headers: Vec<String>,

    /// Plain-text body of the 500 sent when the fetch fails.
    pub error_body: String,

    /// Overrides the HTTP client's default timeout.
    pub fetch_timeout_secs: Option<u64>,
}

impl Default for RewriteConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            index_document: DEFAULT_INDEX_DOCUMENT.to_string(),
            fetch_scheme: None,
            allowed_headers: DEFAULT_ALLOWED_HEADERS.iter().map(|h| h.to_string()).collect(),
            error_body: DEFAULT_ERROR_BODY.to_string(),
            fetch_timeout_secs: None,
        }
    }
}

/// Origin-request redirector settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RedirectConfig {
    pub enabled: bool,

    /// Scheme and host of the deep-link target.
    pub base_url: String,

    /// Application path on the target host.
    pub path: String,

    pub application_id: u32,

    pub tiktok_mode: u32,
}

impl Default for RedirectConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: DEFAULT_BASE_URL.to_string(),
            path: DEFAULT_DEEP_LINK_PATH.to_string(),
            application_id: DEFAULT_APPLICATION_ID,
            tiktok_mode: DEFAULT_TIKTOK_MODE,
        }
    }
}

/// An origin the emulator forwards to.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OriginConfig {
    /// Unique origin identifier, referenced by behaviors.
    pub name: String,

    /// Origin address (e.g., "127.0.0.1:9000").
    pub address: String,

    /// Host header sent to the origin; defaults to `address`.
    #[serde(default)]
    pub host_header: Option<String>,
}

/// Behavior for requests no path pattern claims.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DefaultBehaviorConfig {
    pub origin: String,

    /// Run the redirector at origin-request time.
    pub origin_request: bool,

    /// Run the rewriter at origin-response time.
    pub origin_response: bool,
}

impl Default for DefaultBehaviorConfig {
    fn default() -> Self {
        Self {
            origin: DEFAULT_ORIGIN_NAME.to_string(),
            origin_request: true,
            origin_response: true,
        }
    }
}

/// Path-pattern behavior (e.g., `/prod/*` → API origin).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BehaviorConfig {
    /// CloudFront path pattern: `*` any run, `?` one character.
    pub path_pattern: String,

    pub origin: String,

    #[serde(default)]
    pub origin_request: bool,

    #[serde(default)]
    pub origin_response: bool,
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,

    /// Largest request body forwarded to an origin.
    pub max_body_bytes: usize,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            request_secs: 30,
            max_body_bytes: 2 * 1024 * 1024, // 2MB
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

//! CloudFront trigger payloads.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::edge::headers::EdgeHeaders;
use crate::error::EdgeError;

/// Notification delivered by the CDN to an edge function.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct EdgeEvent {
    #[serde(rename = "Records", default)]
    pub records: Vec<EventRecord>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct EventRecord {
    pub cf: CfRecord,
}

/// The `cf` payload of a single record.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CfRecord {
    pub config: CfConfig,
    pub request: CfRequest,
    /// Present for origin-response and viewer-response triggers only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<CfResponse>,
}

/// Distribution metadata.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CfConfig {
    pub distribution_domain_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distribution_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CfRequest {
    pub method: String,
    pub uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub querystring: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_ip: Option<String>,
    #[serde(default)]
    pub headers: EdgeHeaders,
    /// Fields this crate does not interpret (`origin`, `body`, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CfRequest {
    pub fn new(method: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            uri: uri.into(),
            querystring: None,
            client_ip: None,
            headers: EdgeHeaders::new(),
            extra: Map::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CfResponse {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_description: Option<String>,
    #[serde(default)]
    pub headers: EdgeHeaders,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CfResponse {
    pub fn new(status: impl Into<String>, headers: EdgeHeaders) -> Self {
        Self {
            status: status.into(),
            status_description: None,
            headers,
            body: None,
            extra: Map::new(),
        }
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.status_description = Some(description.into());
        self
    }
}

impl EdgeEvent {
    /// Wrap a single record, as the CDN does.
    pub fn single(record: CfRecord) -> Self {
        Self {
            records: vec![EventRecord { cf: record }],
        }
    }

    /// Take the first record. The CDN always sends exactly one.
    pub fn into_record(self) -> Result<CfRecord, EdgeError> {
        self.records
            .into_iter()
            .next()
            .map(|record| record.cf)
            .ok_or(EdgeError::EmptyEvent)
    }
}

/// Value handed back to the CDN: a request to continue with, or a response
/// that short-circuits the pipeline.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum EdgeResult {
    Response(CfResponse),
    Request(CfRequest),
}

//! Response handling and transformation.
//!
//! # Responsibilities
//! - Describe an origin response as the CDN's response record
//! - Materialize a trigger-produced record as an HTTP response
//!
//! # Design Decisions
//! - Origin bodies are not copied into the record (the CDN does not expose
//!   them to origin-response functions either); pass-through streams them
//! - `content-length` is recomputed for generated bodies

use axum::body::Body;
use axum::http::{header, response::Parts, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::edge::headers::{edge_from_http, edge_to_http};
use crate::edge::CfResponse;

/// Response record for an origin response, without its body.
pub fn to_cf_response(parts: &Parts) -> CfResponse {
    let mut response = CfResponse::new(parts.status.as_str(), edge_from_http(&parts.headers));
    response.status_description = parts.status.canonical_reason().map(str::to_owned);
    response
}

/// HTTP response for a record produced by a trigger.
pub fn from_cf_response(record: CfResponse) -> Response {
    let status = record
        .status
        .parse::<u16>()
        .ok()
        .and_then(|code| StatusCode::from_u16(code).ok())
        .unwrap_or_else(|| {
            tracing::warn!(status = %record.status, "Trigger produced an invalid status");
            StatusCode::INTERNAL_SERVER_ERROR
        });

    let mut headers = edge_to_http(&record.headers);
    if record.body.is_some() {
        headers.remove(header::CONTENT_LENGTH);
    }

    let body = record.body.map(Body::from).unwrap_or_else(Body::empty);
    (status, headers, body).into_response()
}

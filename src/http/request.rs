//! Request handling and transformation.
//!
//! # Responsibilities
//! - Generate unique request ID (UUID v4)
//! - Turn an incoming HTTP request into the CDN's request record
//! - Build the upstream request for an origin from that record

use axum::body::{Body, Bytes};
use axum::http::{header, request::Parts, HeaderValue, Request};
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

use crate::edge::headers::{edge_from_http, edge_to_http};
use crate::edge::CfRequest;
use crate::routing::Origin;

pub const X_REQUEST_ID: &str = "x-request-id";

/// Assigns a UUID v4 to requests that arrive without an `x-request-id`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeEdgeRequestId;

impl MakeRequestId for MakeEdgeRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// Request ID set by the middleware, or `unknown`.
pub fn request_id(parts: &Parts) -> String {
    parts
        .headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string()
}

/// Build the request record an edge function would receive.
pub fn to_cf_request(parts: &Parts) -> CfRequest {
    let mut request = CfRequest::new(parts.method.as_str(), parts.uri.path());
    request.querystring = Some(parts.uri.query().unwrap_or_default().to_string());
    request.headers = edge_from_http(&parts.headers);
    request
}

/// Build the upstream request for `origin` from a (possibly modified) record.
pub fn to_origin_request(
    record: &CfRequest,
    origin: &Origin,
    body: Bytes,
) -> Result<Request<Body>, axum::http::Error> {
    let mut uri = format!("http://{}{}", origin.address, record.uri);
    if let Some(query) = record.querystring.as_deref().filter(|q| !q.is_empty()) {
        uri.push('?');
        uri.push_str(query);
    }

    let mut builder = Request::builder().method(record.method.as_str()).uri(uri);
    if let Some(headers) = builder.headers_mut() {
        *headers = edge_to_http(&record.headers);
        headers.remove(header::HOST);
        if let Ok(host) = HeaderValue::from_str(origin.host()) {
            headers.insert(header::HOST, host);
        }
    }
    builder.body(Body::from(body))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn origin() -> Origin {
        Origin {
            name: "spa".into(),
            address: "127.0.0.1:9000".into(),
            host_header: Some("spa-bucket.s3.amazonaws.com".into()),
        }
    }

    #[test]
    fn test_record_from_request() {
        let (parts, _) = Request::builder()
            .method("GET")
            .uri("http://localhost:8080/events/42?tab=info")
            .header("Accept", "text/html")
            .body(())
            .unwrap()
            .into_parts();

        let record = to_cf_request(&parts);
        assert_eq!(record.method, "GET");
        assert_eq!(record.uri, "/events/42");
        assert_eq!(record.querystring.as_deref(), Some("tab=info"));
        assert_eq!(record.headers["accept"][0].value, "text/html");
    }

    #[test]
    fn test_origin_request_targets_origin() {
        let mut record = CfRequest::new("GET", "/index.html");
        record.querystring = Some("v=2".into());
        record.headers = edge_from_http(&{
            let mut map = axum::http::HeaderMap::new();
            map.insert(header::HOST, HeaderValue::from_static("localhost:8080"));
            map.insert(X_REQUEST_ID, HeaderValue::from_static("abc"));
            map
        });

        let request = to_origin_request(&record, &origin(), Bytes::new()).unwrap();
        assert_eq!(request.uri(), "http://127.0.0.1:9000/index.html?v=2");
        assert_eq!(request.headers()[header::HOST], "spa-bucket.s3.amazonaws.com");
        assert_eq!(request.headers()[X_REQUEST_ID], "abc");
    }

    #[test]
    fn test_empty_querystring_is_omitted() {
        let mut record = CfRequest::new("GET", "/");
        record.querystring = Some(String::new());
        let request = to_origin_request(&record, &origin(), Bytes::new()).unwrap();
        assert_eq!(request.uri(), "http://127.0.0.1:9000/");
    }

    #[test]
    fn test_generated_request_id_is_uuid() {
        let request = Request::builder().body(()).unwrap();
        let id = MakeEdgeRequestId.make_request_id(&request).unwrap();
        let value = id.header_value().to_str().unwrap();
        assert!(Uuid::parse_str(value).is_ok());
    }
}

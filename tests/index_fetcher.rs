//! Index document fetching against a live origin.

use std::time::Duration;

use spa_edge::config::RewriteConfig;
use spa_edge::edge::{CfConfig, CfRecord, CfRequest, CfResponse, EdgeHeaders, RawHeaderValue};
use spa_edge::rewrite::{FetchError, HttpIndexFetcher, IndexFetcher, Rewrite};
use spa_edge::ResponseRewriter;

mod common;
use common::{closed_port, start_mock_origin, MockRoute};

fn http_rewriter() -> ResponseRewriter {
    ResponseRewriter::from_config(&RewriteConfig {
        fetch_scheme: Some("http".into()),
        fetch_timeout_secs: Some(5),
        ..RewriteConfig::default()
    })
    .unwrap()
}

fn miss(domain: &str, status: &str) -> CfRecord {
    CfRecord {
        config: CfConfig {
            distribution_domain_name: domain.to_string(),
            distribution_id: None,
            event_type: Some("origin-response".into()),
            request_id: None,
        },
        request: CfRequest::new("GET", "/events/42"),
        response: Some(CfResponse::new(status, EdgeHeaders::new())),
    }
}

#[tokio::test]
async fn test_fetch_returns_document() {
    let origin = start_mock_origin(vec![MockRoute::new("/index.html", 200, "<html/>")
        .header("Content-Type", "text/html")
        .header("ETag", "\"v1\"")])
    .await;

    let fetcher = HttpIndexFetcher::new("http", Some(Duration::from_secs(5))).unwrap();
    let document = fetcher
        .fetch(&origin.addr.to_string(), "index.html")
        .await
        .unwrap();

    assert_eq!(document.status, 200);
    assert_eq!(document.body, "<html/>");
    assert_eq!(
        document.headers.get("etag"),
        Some(&RawHeaderValue::Single("\"v1\"".into()))
    );
    assert_eq!(origin.requests()[0].method, "GET");
    assert_eq!(origin.requests()[0].target, "/index.html");
}

#[tokio::test]
async fn test_fetch_non_success_is_error() {
    let origin = start_mock_origin(vec![]).await;

    let fetcher = HttpIndexFetcher::new("http", None).unwrap();
    let err = fetcher
        .fetch(&origin.addr.to_string(), "index.html")
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::Status { status: 404, .. }));
}

#[tokio::test]
async fn test_rewriter_substitutes_fetched_document() {
    let origin = start_mock_origin(vec![MockRoute::new("/index.html", 200, "<html>app</html>")
        .header("Content-Type", "text/html; charset=utf-8")
        .header("X-Amz-Version-Id", "3/L4kqtJl")])
    .await;

    let rewrite = http_rewriter()
        .handle(miss(&origin.addr.to_string(), "403"))
        .await
        .unwrap();

    let Rewrite::Replaced(response) = rewrite else {
        panic!("expected replacement, got {rewrite:?}");
    };
    assert_eq!(response.status, "200");
    assert_eq!(response.body.as_deref(), Some("<html>app</html>"));
    assert_eq!(
        response.headers["content-type"][0].value,
        "text/html; charset=utf-8"
    );
    assert!(response.headers.contains_key("content-length"));
    assert!(!response.headers.contains_key("x-amz-version-id"));
}

#[tokio::test]
async fn test_rewriter_reports_unreachable_domain() {
    let dead = closed_port().await;

    let rewrite = http_rewriter()
        .handle(miss(&dead.to_string(), "404"))
        .await
        .unwrap();

    let Rewrite::Failed(response) = rewrite else {
        panic!("expected failure, got {rewrite:?}");
    };
    assert_eq!(response.status, "500");
    assert_eq!(response.headers["content-type"][0].value, "text/plain");
    assert_eq!(response.body.as_deref(), Some("An error occurred loading the page"));
}

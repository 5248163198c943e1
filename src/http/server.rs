//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the edge handler
//! - Wire up middleware (request ID, tracing, timeout, concurrency limit)
//! - Run the origin-request and origin-response triggers around each
//!   forwarded request, per behavior
//! - Swap handler state when the configuration file changes

use std::sync::Arc;
use std::time::{Duration, Instant};

use arc_swap::ArcSwap;
use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::{DistributionConfig, EdgeConfig};
use crate::error::EdgeError;
use crate::http::request::{request_id, to_cf_request, to_origin_request, MakeEdgeRequestId};
use crate::http::response::{from_cf_response, to_cf_response};
use crate::lifecycle::Shutdown;
use crate::observability::metrics;
use crate::redirect::Redirect;
use crate::routing::{BehaviorTable, RoutingError};
use crate::triggers::EdgeHandlers;

/// Index fetch scheme when the configuration leaves it unset.
pub const EMULATOR_FETCH_SCHEME: &str = "http";

#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Edge(#[from] EdgeError),

    #[error(transparent)]
    Routing(#[from] RoutingError),
}

/// Everything derived from one configuration revision.
#[derive(Debug)]
pub struct EdgeState {
    pub handlers: EdgeHandlers,
    pub behaviors: BehaviorTable,
    pub distribution: DistributionConfig,
    pub max_body_bytes: usize,
}

impl EdgeState {
    pub fn from_config(config: &EdgeConfig) -> Result<Self, ServerError> {
        let mut config = config.clone();
        config
            .rewrite
            .fetch_scheme
            .get_or_insert_with(|| EMULATOR_FETCH_SCHEME.to_string());

        Ok(Self {
            handlers: EdgeHandlers::from_config(&config)?,
            behaviors: BehaviorTable::from_config(&config)?,
            distribution: config.distribution.clone(),
            max_body_bytes: config.timeouts.max_body_bytes,
        })
    }
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub inner: Arc<ArcSwap<EdgeState>>,
    pub client: Client<HttpConnector, Body>,
}

/// Local stand-in for the CDN: forwards to origins and runs the triggers.
pub struct EdgeServer {
    state: AppState,
    config: EdgeConfig,
}

impl EdgeServer {
    pub fn new(config: EdgeConfig) -> Result<Self, ServerError> {
        let edge = EdgeState::from_config(&config)?;
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());

        Ok(Self {
            state: AppState {
                inner: Arc::new(ArcSwap::from_pointee(edge)),
                client,
            },
            config,
        })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &EdgeConfig, state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(edge_handler))
            .route("/", any(edge_handler))
            .with_state(state)
            .layer(RequestBodyLimitLayer::new(config.timeouts.max_body_bytes))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(ConcurrencyLimitLayer::new(config.listener.max_connections))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeEdgeRequestId))
    }

    /// Serve until `shutdown` fires. Configurations received on `updates`
    /// replace the handler state for subsequent requests.
    pub async fn run(
        self,
        listener: TcpListener,
        updates: Option<mpsc::UnboundedReceiver<EdgeConfig>>,
        shutdown: Shutdown,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            domain = %self.config.distribution.domain_name,
            "Edge emulator starting"
        );

        if let Some(updates) = updates {
            tokio::spawn(reload_loop(self.state.inner.clone(), updates, shutdown.clone()));
        }

        let app = Self::build_router(&self.config, self.state);
        let mut stop = shutdown.subscribe();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = stop.recv().await;
            })
            .await?;

        tracing::info!("Edge emulator stopped");
        Ok(())
    }
}

async fn reload_loop(
    inner: Arc<ArcSwap<EdgeState>>,
    mut updates: mpsc::UnboundedReceiver<EdgeConfig>,
    shutdown: Shutdown,
) {
    let mut stop = shutdown.subscribe();
    loop {
        tokio::select! {
            update = updates.recv() => {
                let Some(config) = update else { break };
                match EdgeState::from_config(&config) {
                    Ok(edge) => {
                        inner.store(Arc::new(edge));
                        tracing::info!("Edge handlers reloaded");
                    }
                    Err(e) => tracing::error!(error = %e, "Rejected configuration reload"),
                }
            }
            _ = stop.recv() => break,
        }
    }
}

/// Main edge handler.
/// Matches a behavior, runs its triggers and forwards to its origin.
async fn edge_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let started = Instant::now();
    let edge = state.inner.load_full();

    let (parts, body) = request.into_parts();
    let request_id = request_id(&parts);
    let behavior = edge.behaviors.match_path(parts.uri.path()).clone();
    let mut record = to_cf_request(&parts);

    tracing::debug!(
        request_id = %request_id,
        method = %record.method,
        uri = %record.uri,
        behavior = %behavior.name,
        "Handling request"
    );

    // 1. Origin-request trigger
    if behavior.origin_request && edge.handlers.redirect_enabled {
        match edge.handlers.redirector.redirect(record) {
            Redirect::Moved(response) => {
                return finish(&behavior.name, started, from_cf_response(response));
            }
            Redirect::PassThrough(request) => record = request,
        }
    }

    // 2. Forward to origin
    let body = match axum::body::to_bytes(body, edge.max_body_bytes).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(request_id = %request_id, error = %e, "Request body rejected");
            let response = (StatusCode::PAYLOAD_TOO_LARGE, "Request body too large").into_response();
            return finish(&behavior.name, started, response);
        }
    };

    let upstream = match to_origin_request(&record, &behavior.origin, body) {
        Ok(req) => req,
        Err(e) => {
            tracing::warn!(request_id = %request_id, error = %e, "Invalid origin request");
            return finish(&behavior.name, started, bad_gateway());
        }
    };

    let response = match state.client.request(upstream).await {
        Ok(response) => response,
        Err(e) => {
            tracing::warn!(
                request_id = %request_id,
                origin = %behavior.origin.name,
                error = %e,
                "Origin request failed"
            );
            return finish(&behavior.name, started, bad_gateway());
        }
    };

    // 3. Origin-response trigger
    let (parts, body) = response.into_parts();
    let rewriter = &edge.handlers.rewriter;
    if behavior.origin_response
        && edge.handlers.rewrite_enabled
        && !rewriter.is_index_request(&record)
    {
        let rewrite = rewriter
            .rewrite(&record, to_cf_response(&parts), &edge.distribution.domain_name)
            .await;
        if !rewrite.is_pass_through() {
            return finish(&behavior.name, started, from_cf_response(rewrite.into_response()));
        }
    }

    finish(&behavior.name, started, Response::from_parts(parts, Body::new(body)))
}

fn bad_gateway() -> Response {
    (StatusCode::BAD_GATEWAY, "Origin unavailable").into_response()
}

fn finish(behavior: &str, started: Instant, response: Response) -> Response {
    metrics::record_request(behavior, response.status().as_u16(), started);
    response
}

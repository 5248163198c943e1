//! AWS Lambda runtime adapter.
//!
//! One function per trigger: CloudFront invokes the origin-request and
//! origin-response functions with an `EdgeEvent` and expects the request or
//! response back in the same shape. Handler state is built once per cold
//! start and shared across invocations.

use std::sync::Arc;

use lambda_runtime::{service_fn, Error, LambdaEvent};

use crate::config::EdgeConfig;
use crate::edge::{EdgeEvent, EdgeResult};
use crate::error::lambda_error;
use crate::rewrite::IndexFetcher;
use crate::triggers::{EdgeHandlers, Trigger};

/// Lambda handler for the origin-request trigger.
pub async fn handle_origin_request<F: IndexFetcher>(
    handlers: &EdgeHandlers<F>,
    event: LambdaEvent<EdgeEvent>,
) -> Result<EdgeResult, Error> {
    let (payload, context) = event.into_parts();
    tracing::debug!(request_id = %context.request_id, "origin-request invocation");
    handlers.origin_request(payload).map_err(lambda_error)
}

/// Lambda handler for the origin-response trigger.
pub async fn handle_origin_response<F: IndexFetcher>(
    handlers: &EdgeHandlers<F>,
    event: LambdaEvent<EdgeEvent>,
) -> Result<EdgeResult, Error> {
    let (payload, context) = event.into_parts();
    tracing::debug!(request_id = %context.request_id, "origin-response invocation");
    handlers.origin_response(payload).await.map_err(lambda_error)
}

/// Lambda runtime entry point for one trigger.
pub async fn run(trigger: Trigger, config: &EdgeConfig) -> Result<(), Error> {
    let handlers = Arc::new(EdgeHandlers::from_config(config).map_err(lambda_error)?);

    tracing::info!(
        trigger = %trigger,
        rewrite_enabled = handlers.rewrite_enabled,
        redirect_enabled = handlers.redirect_enabled,
        "Starting Lambda runtime"
    );

    lambda_runtime::run(service_fn(move |event: LambdaEvent<EdgeEvent>| {
        let handlers = handlers.clone();
        async move {
            match trigger {
                Trigger::OriginRequest => handle_origin_request(&handlers, event).await,
                Trigger::OriginResponse => handle_origin_response(&handlers, event).await,
            }
        }
    }))
    .await
}

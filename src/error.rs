//! Errors surfaced by the edge triggers.

use thiserror::Error;

/// Failures that reach a trigger's caller.
///
/// Fetch failures inside the response rewriter are not listed here: they are
/// turned into a 500 response and never leave the rewriter.
#[derive(Debug, Error)]
pub enum EdgeError {
    #[error("edge event contains no records")]
    EmptyEvent,
    #[error("edge event has no response record; origin-response trigger expected")]
    MissingResponse,
    #[error("invalid redirect pattern: {0}")]
    Pattern(#[from] regex::Error),
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

impl EdgeError {
    /// Short classification string used for logging.
    pub fn category(&self) -> &'static str {
        match self {
            EdgeError::EmptyEvent | EdgeError::MissingResponse => "event",
            EdgeError::Pattern(_) => "pattern",
            EdgeError::Client(_) => "client",
        }
    }
}

/// Convert an edge error into the Lambda runtime error type.
pub fn lambda_error(err: EdgeError) -> lambda_runtime::Error {
    let category = err.category();
    let message = err.to_string();
    tracing::error!(category = %category, error = ?err, message = %message, "edge trigger failed");
    lambda_runtime::Error::from(message)
}

//! Local edge emulator.
//!
//! # Data Flow
//! ```text
//! Client request
//!     → server.rs (Axum, request ID, timeout, concurrency limit)
//!     → routing (behavior for the path)
//!     → request.rs (HTTP request → CfRequest)
//!     → [origin-request trigger: redirector]
//!     → origin (hyper-util client)
//!     → response.rs (origin response → CfResponse)
//!     → [origin-response trigger: rewriter]
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{MakeEdgeRequestId, X_REQUEST_ID};
pub use server::{EdgeServer, ServerError};

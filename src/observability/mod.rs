//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Triggers and emulator produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → CloudWatch Logs (JSON on stdout in Lambda mode)
//!     → Metrics endpoint (Prometheus scrape, emulator)
//! ```
//!
//! # Design Decisions
//! - Structured logging (JSON) for machine parsing
//! - Request ID flows through the emulator
//! - Metric calls are no-ops until a recorder is installed

pub mod logging;
pub mod metrics;

//! Cache-behavior routing for the emulator.
//!
//! # Data Flow
//! ```text
//! Incoming request path
//!     → router.rs (behaviors in configured order)
//!     → matcher.rs (CloudFront path pattern)
//!     → Behavior (origin + attached edge triggers)
//!     → default behavior when nothing matched
//! ```
//!
//! # Design Decisions
//! - Behaviors compiled at startup, immutable at runtime (swapped on reload)
//! - First match wins, in configured order, like CloudFront precedence
//! - Always resolves: the default behavior catches the rest

pub mod matcher;
pub mod router;

pub use matcher::PathPattern;
pub use router::{Behavior, BehaviorTable, Origin, RoutingError};

//! CloudFront edge-event data model.
//!
//! # Data Flow
//! ```text
//! CDN trigger (origin-request / origin-response)
//!     → event.rs (EdgeEvent → CfRecord: config, request, response?)
//!     → rewrite / redirect (transform)
//!     → EdgeResult (request or response, CDN wire shape)
//!     → back to the CDN
//! ```
//!
//! # Design Decisions
//! - Unknown fields are kept verbatim so pass-through is an identity
//! - Header values always leave in the `[{key?, value}]` shape
//! - Status codes stay strings, as the CDN sends them

pub mod event;
pub mod headers;

pub use event::{CfConfig, CfRecord, CfRequest, CfResponse, EdgeEvent, EdgeResult, EventRecord};
pub use headers::{wrap_and_filter, EdgeHeaders, HeaderEntry, RawHeaderValue, RawHeaders};

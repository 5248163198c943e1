//! CloudFront edge functions for a single-page application, plus a local
//! emulator that runs them in front of real origins.

pub mod config;
pub mod edge;
pub mod error;
pub mod http;
pub mod lambda;
pub mod lifecycle;
pub mod observability;
pub mod redirect;
pub mod rewrite;
pub mod routing;
pub mod triggers;

pub use config::schema::EdgeConfig;
pub use error::EdgeError;
pub use http::EdgeServer;
pub use lifecycle::Shutdown;
pub use redirect::RequestRedirector;
pub use rewrite::ResponseRewriter;
pub use triggers::{EdgeHandlers, Trigger};

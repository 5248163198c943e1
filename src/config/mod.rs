//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → EdgeConfig (validated, immutable)
//!     → EdgeHandlers / BehaviorTable built from it
//!
//! On file change (emulator only):
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → atomic swap of the emulator's shared state
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require full reload
//! - All fields have defaults; an empty file is the production setup
//! - Lambda mode usually runs on defaults (no environment on the edge)

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    BehaviorConfig, DefaultBehaviorConfig, DistributionConfig, EdgeConfig, ListenerConfig,
    LogFormat, ObservabilityConfig, OriginConfig, RedirectConfig, RewriteConfig, TimeoutConfig,
};
pub use validation::{validate_config, ValidationError};
pub use watcher::ConfigWatcher;

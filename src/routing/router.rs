//! Behavior lookup.

use thiserror::Error;

use crate::config::{EdgeConfig, OriginConfig};
use crate::routing::matcher::PathPattern;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RoutingError {
    #[error("behavior `{pattern}` references unknown origin `{origin}`")]
    UnknownOrigin { pattern: String, origin: String },
}

/// Where a behavior forwards to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Origin {
    pub name: String,
    pub address: String,
    pub host_header: Option<String>,
}

impl Origin {
    /// Host header sent upstream.
    pub fn host(&self) -> &str {
        self.host_header.as_deref().unwrap_or(&self.address)
    }
}

impl From<&OriginConfig> for Origin {
    fn from(config: &OriginConfig) -> Self {
        Self {
            name: config.name.clone(),
            address: config.address.clone(),
            host_header: config.host_header.clone(),
        }
    }
}

/// An origin plus the edge triggers attached to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Behavior {
    /// Path pattern, or `default`. Used as a metrics label.
    pub name: String,
    pub origin: Origin,
    pub origin_request: bool,
    pub origin_response: bool,
}

/// Ordered behaviors with a catch-all default.
#[derive(Debug, Clone)]
pub struct BehaviorTable {
    behaviors: Vec<(PathPattern, Behavior)>,
    default: Behavior,
}

impl BehaviorTable {
    pub fn from_config(config: &EdgeConfig) -> Result<Self, RoutingError> {
        let origin = |pattern: &str, name: &str| {
            config
                .origins
                .iter()
                .find(|o| o.name == name)
                .map(Origin::from)
                .ok_or_else(|| RoutingError::UnknownOrigin {
                    pattern: pattern.to_string(),
                    origin: name.to_string(),
                })
        };

        let default = Behavior {
            name: "default".to_string(),
            origin: origin("default", &config.default_behavior.origin)?,
            origin_request: config.default_behavior.origin_request,
            origin_response: config.default_behavior.origin_response,
        };

        let behaviors = config
            .behaviors
            .iter()
            .map(|b| -> Result<_, RoutingError> {
                Ok((
                    PathPattern::new(b.path_pattern.clone()),
                    Behavior {
                        name: b.path_pattern.clone(),
                        origin: origin(&b.path_pattern, &b.origin)?,
                        origin_request: b.origin_request,
                        origin_response: b.origin_response,
                    },
                ))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { behaviors, default })
    }

    /// First behavior whose pattern matches, else the default.
    pub fn match_path(&self, path: &str) -> &Behavior {
        self.behaviors
            .iter()
            .find(|(pattern, _)| pattern.matches(path))
            .map(|(_, behavior)| behavior)
            .unwrap_or(&self.default)
    }
}

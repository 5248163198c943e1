//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check referential integrity (behaviors reference existing origins)
//! - Validate value ranges (timeouts > 0, addresses parse)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: EdgeConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::EdgeConfig;

/// A single semantic problem in a config.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field}: invalid socket address `{value}`")]
    InvalidAddress { field: &'static str, value: String },
    #[error("rewrite.fetch_scheme must be http or https, got `{0}`")]
    InvalidScheme(String),
    #[error("{0} must not be empty")]
    Empty(&'static str),
    #[error("redirect.base_url `{0}` is not an absolute http(s) URL")]
    InvalidBaseUrl(String),
    #[error("{0} must be greater than zero")]
    NotPositive(&'static str),
    #[error("origin `{0}` is declared more than once")]
    DuplicateOrigin(String),
    #[error("behavior `{pattern}` references unknown origin `{origin}`")]
    UnknownOrigin { pattern: String, origin: String },
    #[error("path pattern `{0}` must start with `/` or `*`")]
    InvalidPathPattern(String),
}

pub fn validate_config(config: &EdgeConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }
    if config.listener.max_connections == 0 {
        errors.push(ValidationError::NotPositive("listener.max_connections"));
    }
    if config.distribution.domain_name.trim().is_empty() {
        errors.push(ValidationError::Empty("distribution.domain_name"));
    }

    validate_rewrite(config, &mut errors);
    validate_redirect(config, &mut errors);
    validate_behaviors(config, &mut errors);

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::NotPositive("timeouts.request_secs"));
    }
    if config.timeouts.max_body_bytes == 0 {
        errors.push(ValidationError::NotPositive("timeouts.max_body_bytes"));
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_rewrite(config: &EdgeConfig, errors: &mut Vec<ValidationError>) {
    let rewrite = &config.rewrite;

    if let Some(scheme) = &rewrite.fetch_scheme {
        if !matches!(scheme.as_str(), "http" | "https") {
            errors.push(ValidationError::InvalidScheme(scheme.clone()));
        }
    }
    if rewrite.index_document.trim_start_matches('/').is_empty() {
        errors.push(ValidationError::Empty("rewrite.index_document"));
    }
    if rewrite.allowed_headers.is_empty() {
        errors.push(ValidationError::Empty("rewrite.allowed_headers"));
    }
    if rewrite.fetch_timeout_secs == Some(0) {
        errors.push(ValidationError::NotPositive("rewrite.fetch_timeout_secs"));
    }
}

fn validate_redirect(config: &EdgeConfig, errors: &mut Vec<ValidationError>) {
    let base_url = &config.redirect.base_url;
    let valid = Url::parse(base_url)
        .map(|url| matches!(url.scheme(), "http" | "https") && url.has_host())
        .unwrap_or(false);
    if !valid {
        errors.push(ValidationError::InvalidBaseUrl(base_url.clone()));
    }
}

fn validate_behaviors(config: &EdgeConfig, errors: &mut Vec<ValidationError>) {
    let mut names = HashSet::new();
    for origin in &config.origins {
        if !names.insert(origin.name.as_str()) {
            errors.push(ValidationError::DuplicateOrigin(origin.name.clone()));
        }
        if origin.address.trim().is_empty() {
            errors.push(ValidationError::Empty("origins.address"));
        }
    }

    if !names.contains(config.default_behavior.origin.as_str()) {
        errors.push(ValidationError::UnknownOrigin {
            pattern: "default".to_string(),
            origin: config.default_behavior.origin.clone(),
        });
    }

    for behavior in &config.behaviors {
        if !(behavior.path_pattern.starts_with('/') || behavior.path_pattern.starts_with('*')) {
            errors.push(ValidationError::InvalidPathPattern(
                behavior.path_pattern.clone(),
            ));
        }
        if !names.contains(behavior.origin.as_str()) {
            errors.push(ValidationError::UnknownOrigin {
                pattern: behavior.path_pattern.clone(),
                origin: behavior.origin.clone(),
            });
        }
    }
}

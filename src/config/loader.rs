//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::EdgeConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<EdgeConfig, ConfigError> {
    let config: EdgeConfig = toml::from_str(content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<EdgeConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_file_is_default() {
        let config = parse_config("").unwrap();
        assert!(config.rewrite.enabled);
        assert_eq!(config.rewrite.index_document, "index.html");
        assert!(config.rewrite.fetch_scheme.is_none());
        assert_eq!(config.redirect.application_id, 20);
        assert_eq!(config.default_behavior.origin, "spa");
    }

    #[test]
    fn test_load_full_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
[listener]
bind_address = "127.0.0.1:8443"

[distribution]
domain_name = "app.example.com"

[rewrite]
fetch_scheme = "http"
fetch_timeout_secs = 3

[[origins]]
name = "spa"
address = "127.0.0.1:9000"

[[origins]]
name = "api"
address = "127.0.0.1:9001"
host_header = "abc123.execute-api.us-east-1.amazonaws.com"

[[behaviors]]
path_pattern = "/prod/*"
origin = "api"

[observability]
log_format = "json"
"#
        )
        .unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.listener.bind_address, "127.0.0.1:8443");
        assert_eq!(config.distribution.domain_name, "app.example.com");
        assert_eq!(config.rewrite.fetch_scheme.as_deref(), Some("http"));
        assert_eq!(config.rewrite.fetch_timeout_secs, Some(3));
        assert_eq!(config.origins.len(), 2);
        assert_eq!(config.behaviors[0].origin, "api");
        assert!(!config.behaviors[0].origin_response);
        assert_eq!(
            config.observability.log_format,
            crate::config::LogFormat::Json
        );
    }

    #[test]
    fn test_validation_errors_are_reported() {
        let err = parse_config(
            r#"
[rewrite]
fetch_scheme = "ftp"

[[behaviors]]
path_pattern = "/api/*"
origin = "missing"
"#,
        )
        .unwrap_err();

        let ConfigError::Validation(errors) = err else {
            panic!("expected validation failure");
        };
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_config(Path::new("/nonexistent/spa-edge.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}

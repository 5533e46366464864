//! Configuration loading from disk.

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::schema::ProxyConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

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

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ProxyConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(&content)
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<ProxyConfig, ConfigError> {
    let config: ProxyConfig = toml::from_str(content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
        assert_eq!(config.backends.len(), 5);
        assert_eq!(config.backends[0].address, "http://localhost:8081");
        assert_eq!(config.health_check.interval_secs, 10);
        assert!(config.health_check.path.is_empty());
    }

    #[test]
    fn parses_full_file() {
        let toml = r#"
            [listener]
            bind_address = "127.0.0.1:9000"

            [[backends]]
            name = "alpha"
            address = "http://10.0.0.1:8000"

            [[backends]]
            address = "http://10.0.0.2:8000"

            [health_check]
            interval_secs = 3
            timeout_secs = 1
            path = "/healthz"

            [observability]
            metrics_enabled = false
        "#;

        let config = parse_config(toml).unwrap();
        assert_eq!(config.listener.bind_address, "127.0.0.1:9000");
        assert_eq!(config.backends.len(), 2);
        assert_eq!(config.backends[0].name, "alpha");
        assert!(config.backends[1].name.is_empty());
        assert_eq!(config.health_check.interval_secs, 3);
        assert_eq!(config.health_check.path, "/healthz");
        assert!(!config.observability.metrics_enabled);
    }

    #[test]
    fn explicit_empty_backend_list_is_kept() {
        let config = parse_config("backends = []").unwrap();
        assert!(config.backends.is_empty());
    }

    #[test]
    fn syntax_errors_are_parse_errors() {
        let err = parse_config("[listener").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn semantic_errors_are_validation_errors() {
        let err = parse_config(
            r#"
            [[backends]]
            address = "ftp://files.local"
            "#,
        )
        .unwrap_err();
        match err {
            ConfigError::Validation(errors) => assert_eq!(errors.len(), 1),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_config(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().contains("/definitely/not/here.toml"));
    }
}

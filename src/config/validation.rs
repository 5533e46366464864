//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Reject backend addresses that cannot be forwarded to
//! - Validate value ranges (intervals and timeouts > 0, addresses parse)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;
use thiserror::Error;

use crate::config::schema::{ProxyConfig, PLACEHOLDER_API_KEY};
use crate::load_balancer::backend::{parse_target, BackendError};

/// A single semantic problem found in a configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("invalid {field} '{value}': not a socket address")]
    InvalidSocketAddr { field: &'static str, value: String },

    #[error("backend #{index}: {source}")]
    InvalidBackend {
        index: usize,
        #[source]
        source: BackendError,
    },

    #[error("duplicate backend address '{0}'")]
    DuplicateBackend(String),

    #[error("{0} must be greater than zero")]
    ZeroValue(&'static str),

    #[error("health_check.path '{0}' must be empty or start with '/', and must not contain '#'")]
    InvalidHealthPath(String),

    #[error("admin.api_key must not be empty when the admin API is enabled")]
    EmptyApiKey,

    #[error("admin.api_key is still the default placeholder; set a real key")]
    PlaceholderApiKey,
}

/// Check a configuration for semantic errors.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_socket_addr(&mut errors, "listener.bind_address", &config.listener.bind_address);

    let mut seen = HashSet::new();
    for (index, backend) in config.backends.iter().enumerate() {
        if let Err(source) = parse_target(&backend.address) {
            errors.push(ValidationError::InvalidBackend { index, source });
        } else if !seen.insert(backend.address.as_str()) {
            errors.push(ValidationError::DuplicateBackend(backend.address.clone()));
        }
    }

    let health = &config.health_check;
    if health.enabled {
        if health.interval_secs == 0 {
            errors.push(ValidationError::ZeroValue("health_check.interval_secs"));
        }
        if health.timeout_secs == 0 {
            errors.push(ValidationError::ZeroValue("health_check.timeout_secs"));
        }
    }
    if !health.path.is_empty() && (!health.path.starts_with('/') || health.path.contains('#')) {
        errors.push(ValidationError::InvalidHealthPath(health.path.clone()));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroValue("timeouts.request_secs"));
    }

    if config.observability.metrics_enabled {
        check_socket_addr(
            &mut errors,
            "observability.metrics_address",
            &config.observability.metrics_address,
        );
    }

    if config.admin.enabled {
        check_socket_addr(&mut errors, "admin.bind_address", &config.admin.bind_address);
        if config.admin.api_key.is_empty() {
            errors.push(ValidationError::EmptyApiKey);
        } else if config.admin.api_key == PLACEHOLDER_API_KEY {
            errors.push(ValidationError::PlaceholderApiKey);
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_socket_addr(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidSocketAddr {
            field,
            value: value.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::BackendConfig;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(validate_config(&ProxyConfig::default()), Ok(()));
    }

    #[test]
    fn empty_backend_list_is_allowed() {
        let mut config = ProxyConfig::default();
        config.backends.clear();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn collects_every_error() {
        let mut config = ProxyConfig::default();
        config.listener.bind_address = "nowhere".into();
        config.backends = vec![
            BackendConfig::new("::not-a-url"),
            BackendConfig::new("http://localhost:9000"),
            BackendConfig::new("http://localhost:9000"),
        ];
        config.health_check.interval_secs = 0;
        config.health_check.path = "health".into();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 5);
        assert!(errors.contains(&ValidationError::DuplicateBackend("http://localhost:9000".into())));
        assert!(errors.contains(&ValidationError::ZeroValue("health_check.interval_secs")));
        assert!(errors.iter().any(|e| matches!(e, ValidationError::InvalidBackend { index: 0, .. })));
    }

    #[test]
    fn disabled_health_checks_skip_interval_check() {
        let mut config = ProxyConfig::default();
        config.health_check.enabled = false;
        config.health_check.interval_secs = 0;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn admin_requires_api_key() {
        let mut config = ProxyConfig::default();
        config.admin.enabled = true;
        config.admin.api_key.clear();
        assert_eq!(validate_config(&config), Err(vec![ValidationError::EmptyApiKey]));
    }

    #[test]
    fn admin_rejects_placeholder_key() {
        let mut config = ProxyConfig::default();
        config.admin.enabled = true;
        assert_eq!(validate_config(&config), Err(vec![ValidationError::PlaceholderApiKey]));

        config.admin.api_key = "s3cret-admin-token".into();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn health_path_may_carry_query_but_not_fragment() {
        let mut config = ProxyConfig::default();
        config.health_check.path = "/healthz?full=1".into();
        assert!(validate_config(&config).is_ok());

        config.health_check.path = "/healthz#top".into();
        assert_eq!(
            validate_config(&config),
            Err(vec![ValidationError::InvalidHealthPath("/healthz#top".into())])
        );
    }
}

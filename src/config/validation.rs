//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate addresses, paths and value ranges
//! - Reject a login path the gate itself would redirect away from
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GateConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;
use std::str::FromStr;

use axum::http::{uri::Authority, HeaderName};
use thiserror::Error;

use crate::access::PublicPathSet;
use crate::config::schema::GateConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid {field} address {value:?}")]
    InvalidAddress { field: &'static str, value: String },

    #[error("{field} must start with '/': {value:?}")]
    RelativePath { field: &'static str, value: String },

    #[error("login_path {0:?} is not covered by any public path; unauthenticated users would be redirected forever")]
    LoginNotPublic(String),

    #[error("redirect_status must be 302 or 307, got {0}")]
    RedirectStatus(u16),

    #[error("cookie_name must not be empty")]
    EmptyCookieName,

    #[error("invalid credential header name {0:?}")]
    InvalidHeaderName(String),

    #[error("{0} must be greater than zero")]
    Zero(&'static str),
}

/// Validate a parsed configuration.
pub fn validate_config(config: &GateConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_address(&mut errors, "listener.bind_address", &config.listener.bind_address);
    check_authority(&mut errors, "upstream.address", &config.upstream.address);
    if config.observability.metrics_enabled {
        check_address(
            &mut errors,
            "observability.metrics_address",
            &config.observability.metrics_address,
        );
    }

    let access = &config.access;
    check_absolute(&mut errors, "access.login_path", &access.login_path);
    for path in &access.public_paths {
        check_absolute(&mut errors, "access.public_paths", path);
    }
    if !PublicPathSet::new(access.public_paths.iter().cloned()).contains(&access.login_path) {
        errors.push(ValidationError::LoginNotPublic(access.login_path.clone()));
    }
    if !matches!(access.redirect_status, 302 | 307) {
        errors.push(ValidationError::RedirectStatus(access.redirect_status));
    }

    if config.credential.cookie_name.trim().is_empty() {
        errors.push(ValidationError::EmptyCookieName);
    }
    if let Some(name) = &config.credential.header_name {
        if HeaderName::from_bytes(name.as_bytes()).is_err() {
            errors.push(ValidationError::InvalidHeaderName(name.clone()));
        }
    }

    for prefix in &config.matcher.excluded_prefixes {
        check_absolute(&mut errors, "matcher.excluded_prefixes", prefix);
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::Zero("timeouts.request_secs"));
    }
    if config.timeouts.connect_secs == 0 {
        errors.push(ValidationError::Zero("timeouts.connect_secs"));
    }
    if config.image_proxy.enabled {
        if config.image_proxy.max_bytes == 0 {
            errors.push(ValidationError::Zero("image_proxy.max_bytes"));
        }
        if config.image_proxy.fetch_timeout_secs == 0 {
            errors.push(ValidationError::Zero("image_proxy.fetch_timeout_secs"));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_address(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field,
            value: value.to_string(),
        });
    }
}

/// Upstreams are dialed by name, so `host:port` is enough.
fn check_authority(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if Authority::from_str(value).is_err() {
        errors.push(ValidationError::InvalidAddress {
            field,
            value: value.to_string(),
        });
    }
}

fn check_absolute(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if !value.starts_with('/') {
        errors.push(ValidationError::RelativePath {
            field,
            value: value.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(validate_config(&GateConfig::default()), Ok(()));
    }

    #[test]
    fn test_login_path_must_be_public() {
        let mut config = GateConfig::default();
        config.access.public_paths = vec!["/api".into()];
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors, vec![ValidationError::LoginNotPublic("/login".into())]);
    }

    #[test]
    fn test_login_path_covered_by_broader_prefix() {
        let mut config = GateConfig::default();
        config.access.public_paths = vec!["/log".into()];
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_redirect_status_restricted() {
        let mut config = GateConfig::default();
        config.access.redirect_status = 301;
        assert_eq!(
            validate_config(&config).unwrap_err(),
            vec![ValidationError::RedirectStatus(301)]
        );

        config.access.redirect_status = 302;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_reports_all_errors() {
        let mut config = GateConfig::default();
        config.listener.bind_address = "not-an-address".into();
        config.access.public_paths.push("api".into());
        config.credential.cookie_name = " ".into();
        config.timeouts.request_secs = 0;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(errors.contains(&ValidationError::EmptyCookieName));
        assert!(errors.contains(&ValidationError::Zero("timeouts.request_secs")));
        assert!(errors.contains(&ValidationError::RelativePath {
            field: "access.public_paths",
            value: "api".into(),
        }));
    }

    #[test]
    fn test_upstream_accepts_host_names() {
        let mut config = GateConfig::default();
        for address in ["admin-panel:3000", "panel.internal:8080", "10.0.0.7:3000"] {
            config.upstream.address = address.into();
            assert_eq!(validate_config(&config), Ok(()), "{address}");
        }

        for address in ["bad authority", ""] {
            config.upstream.address = address.into();
            assert_eq!(
                validate_config(&config).unwrap_err(),
                vec![ValidationError::InvalidAddress {
                    field: "upstream.address",
                    value: address.into(),
                }]
            );
        }
    }

    #[test]
    fn test_metrics_address_ignored_when_disabled() {
        let mut config = GateConfig::default();
        config.observability.metrics_address = "nope".into();
        assert!(validate_config(&config).is_err());

        config.observability.metrics_enabled = false;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_invalid_header_name() {
        let mut config = GateConfig::default();
        config.credential.header_name = Some("x token".into());
        assert_eq!(
            validate_config(&config).unwrap_err(),
            vec![ValidationError::InvalidHeaderName("x token".into())]
        );
    }
}

//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::GateConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable naming the config file when no path is given.
pub const CONFIG_ENV: &str = "ADMIN_GATE_CONFIG";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<GateConfig, ConfigError> {
    let config: GateConfig = toml::from_str(content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<GateConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_yields_defaults() {
        assert_eq!(parse_config("").unwrap(), GateConfig::default());
    }

    #[test]
    fn test_partial_document_keeps_other_defaults() {
        let config = parse_config(
            r#"
            [access]
            public_paths = ["/signin", "/api"]
            login_path = "/signin"

            [credential]
            cookie_name = "session"
            header_name = "authorization"

            [observability]
            log_format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(config.access.login_path, "/signin");
        assert_eq!(config.access.redirect_status, 307);
        assert_eq!(config.credential.cookie_name, "session");
        assert_eq!(config.credential.header_name.as_deref(), Some("authorization"));
        assert_eq!(config.observability.log_format, crate::config::LogFormat::Json);
        assert_eq!(config.upstream.address, "127.0.0.1:3000");
    }

    #[test]
    fn test_example_config_matches_defaults() {
        let config = parse_config(include_str!("../../gate.example.toml")).unwrap();
        assert_eq!(config, GateConfig::default());
    }

    #[test]
    fn test_hostname_upstream_loads() {
        let config = parse_config("[upstream]\naddress = \"admin-panel:3000\"").unwrap();
        assert_eq!(config.upstream.address, "admin-panel:3000");
    }

    #[test]
    fn test_syntax_error_is_parse_error() {
        let err = parse_config("[access\npublic_paths = 1").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_semantic_error_is_validation_error() {
        let err = parse_config("[access]\nlogin_path = \"/signin\"").unwrap_err();
        match err {
            ConfigError::Validation(errors) => {
                assert_eq!(errors, vec![ValidationError::LoginNotPublic("/signin".into())]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_config(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}

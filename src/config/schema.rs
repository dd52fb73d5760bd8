//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gate.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the admin gate.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct GateConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Public paths and login redirect.
    pub access: AccessConfig,

    /// Where the session credential is read from.
    pub credential: CredentialConfig,

    /// Requests that skip the gate entirely.
    pub matcher: MatcherConfig,

    /// Admin panel application that allowed requests are forwarded to.
    pub upstream: UpstreamConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Image proxy handler.
    pub image_proxy: ImageProxyConfig,

    /// API documentation handler.
    pub docs: DocsConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Access policy configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct AccessConfig {
    /// Path prefixes reachable without a credential (literal prefix match).
    pub public_paths: Vec<String>,

    /// Redirect target for unauthenticated requests.
    pub login_path: String,

    /// Redirect status code: 307 (default) or 302.
    pub redirect_status: u16,
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            public_paths: vec![
                "/login".to_string(),
                "/api".to_string(),
                "/swagger".to_string(),
            ],
            login_path: "/login".to_string(),
            redirect_status: 307,
        }
    }
}

/// Credential location.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct CredentialConfig {
    /// Cookie carrying the session token.
    pub cookie_name: String,

    /// Optional header checked when the cookie is absent (e.g. "authorization").
    pub header_name: Option<String>,
}

impl Default for CredentialConfig {
    fn default() -> Self {
        Self {
            cookie_name: "token".to_string(),
            header_name: None,
        }
    }
}

/// Gate pre-filter configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct MatcherConfig {
    /// Path prefixes never shown to the access policy.
    pub excluded_prefixes: Vec<String>,

    /// File extensions (without dot) never shown to the access policy.
    /// Empty by default: a protected route may end in `.css` or `.js`.
    pub excluded_extensions: Vec<String>,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            excluded_prefixes: vec![
                "/_next/static".to_string(),
                "/_next/image".to_string(),
                "/favicon.ico".to_string(),
            ],
            excluded_extensions: Vec::new(),
        }
    }
}

/// Upstream admin panel.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Upstream authority (e.g., "127.0.0.1:3000" or "admin-panel:3000").
    pub address: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1:3000".to_string(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Upstream connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            request_secs: 30,
        }
    }
}

/// Image proxy configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ImageProxyConfig {
    /// Mount `/api/image-proxy`.
    pub enabled: bool,

    /// Hosts images may be fetched from. Empty allows any host.
    pub allowed_hosts: Vec<String>,

    /// Largest image accepted, in bytes.
    pub max_bytes: usize,

    /// Fetch timeout in seconds.
    pub fetch_timeout_secs: u64,

    /// `Cache-Control` max-age sent to clients.
    pub cache_max_age_secs: u64,
}

impl Default for ImageProxyConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            allowed_hosts: Vec::new(),
            max_bytes: 10 * 1024 * 1024, // 10MB
            fetch_timeout_secs: 10,
            cache_max_age_secs: 86_400,
        }
    }
}

/// API documentation configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct DocsConfig {
    /// Mount `/api/docs` and `/swagger`.
    pub enabled: bool,

    /// Title shown in the OpenAPI document.
    pub title: String,
}

impl Default for DocsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            title: "Admin Gate API".to_string(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: true,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

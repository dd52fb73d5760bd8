//! Session credential extraction.
//!
//! The probe only locates the opaque token. Whether the token is genuine is
//! not its concern.

use axum::http::{header, HeaderMap, HeaderName};

use crate::config::CredentialConfig;

/// Extracts the session credential from a request's cookies or headers.
#[derive(Debug, Clone)]
pub struct CredentialProbe {
    cookie_name: String,
    header_name: Option<HeaderName>,
}

impl CredentialProbe {
    /// Probe that only looks at the named cookie.
    pub fn cookie(name: impl Into<String>) -> Self {
        Self {
            cookie_name: name.into(),
            header_name: None,
        }
    }

    /// Also accept the credential from `header` when the cookie is missing.
    pub fn with_header(mut self, header: HeaderName) -> Self {
        self.header_name = Some(header);
        self
    }

    pub fn from_config(config: &CredentialConfig) -> Self {
        let probe = Self::cookie(config.cookie_name.clone());
        match config
            .header_name
            .as_deref()
            .and_then(|h| HeaderName::from_bytes(h.as_bytes()).ok())
        {
            Some(h) => probe.with_header(h),
            None => probe,
        }
    }

    /// Returns the first non-empty credential value, if any.
    pub fn extract(&self, headers: &HeaderMap) -> Option<String> {
        self.cookie_value(headers)
            .or_else(|| self.header_value(headers))
            .map(str::to_string)
    }

    pub fn is_present(&self, headers: &HeaderMap) -> bool {
        self.cookie_value(headers).is_some() || self.header_value(headers).is_some()
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    fn cookie_value<'h>(&self, headers: &'h HeaderMap) -> Option<&'h str> {
        headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|v| v.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, value)| *name == self.cookie_name && !value.is_empty())
            .map(|(_, value)| value)
    }

    fn header_value<'h>(&self, headers: &'h HeaderMap) -> Option<&'h str> {
        let name = self.header_name.as_ref()?;
        let raw = headers.get(name)?.to_str().ok()?;
        let value = raw.strip_prefix("Bearer ").unwrap_or(raw).trim();
        (!value.is_empty()).then_some(value)
    }
}

impl Default for CredentialProbe {
    fn default() -> Self {
        Self::from_config(&CredentialConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(HeaderName, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.append(name.clone(), HeaderValue::from_static(value));
        }
        map
    }

    #[test]
    fn test_cookie_found_among_others() {
        let probe = CredentialProbe::cookie("token");
        let h = headers(&[(header::COOKIE, "theme=dark; token=abc123; lang=en")]);
        assert_eq!(probe.extract(&h).as_deref(), Some("abc123"));
        assert!(probe.is_present(&h));
    }

    #[test]
    fn test_cookie_in_second_header_line() {
        let probe = CredentialProbe::cookie("token");
        let h = headers(&[(header::COOKIE, "theme=dark"), (header::COOKIE, "token=xyz")]);
        assert_eq!(probe.extract(&h).as_deref(), Some("xyz"));
    }

    #[test]
    fn test_empty_cookie_is_absent() {
        let probe = CredentialProbe::cookie("token");
        let h = headers(&[(header::COOKIE, "token=; theme=dark")]);
        assert!(!probe.is_present(&h));
        assert_eq!(probe.extract(&h), None);
    }

    #[test]
    fn test_cookie_name_must_match_exactly() {
        let probe = CredentialProbe::cookie("token");
        let h = headers(&[(header::COOKIE, "access_token=abc; tokens=def")]);
        assert!(!probe.is_present(&h));
    }

    #[test]
    fn test_header_ignored_unless_configured() {
        let probe = CredentialProbe::cookie("token");
        let h = headers(&[(header::AUTHORIZATION, "Bearer abc")]);
        assert!(!probe.is_present(&h));
    }

    #[test]
    fn test_bearer_header_fallback() {
        let probe = CredentialProbe::cookie("token").with_header(header::AUTHORIZATION);
        let h = headers(&[(header::AUTHORIZATION, "Bearer abc")]);
        assert_eq!(probe.extract(&h).as_deref(), Some("abc"));

        let empty = headers(&[(header::AUTHORIZATION, "Bearer ")]);
        assert!(!probe.is_present(&empty));
    }

    #[test]
    fn test_cookie_preferred_over_header() {
        let probe = CredentialProbe::cookie("token").with_header(header::AUTHORIZATION);
        let h = headers(&[
            (header::COOKIE, "token=from-cookie"),
            (header::AUTHORIZATION, "Bearer from-header"),
        ]);
        assert_eq!(probe.extract(&h).as_deref(), Some("from-cookie"));
    }

    #[test]
    fn test_from_config_skips_invalid_header_name() {
        let config = CredentialConfig {
            cookie_name: "session".into(),
            header_name: Some("bad header".into()),
        };
        let probe = CredentialProbe::from_config(&config);
        assert_eq!(probe.cookie_name(), "session");
        assert!(probe.header_name.is_none());
    }
}

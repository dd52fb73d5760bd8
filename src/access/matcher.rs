//! Gate pre-filter.
//!
//! # Responsibilities
//! - Decide which requests reach the access policy at all
//! - Skip framework static assets and plain asset files
//!
//! # Design Decisions
//! - Path matching is case-sensitive
//! - No regex: prefix and extension checks only
//! - Any exclusion matching is enough to skip the gate (OR semantics)

use crate::config::MatcherConfig;

/// Trait for matching request paths against a condition.
pub trait Matcher: Send + Sync + std::fmt::Debug {
    /// Returns true if the path matches this condition.
    fn matches(&self, path: &str) -> bool;
}

/// Matches a literal path prefix.
#[derive(Debug, Clone)]
pub struct PathPrefixMatcher {
    prefix: String,
}

impl PathPrefixMatcher {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl Matcher for PathPrefixMatcher {
    fn matches(&self, path: &str) -> bool {
        path.starts_with(&self.prefix)
    }
}

/// Matches the file extension of the last path segment.
#[derive(Debug, Clone)]
pub struct ExtensionMatcher {
    extensions: Vec<String>,
}

impl ExtensionMatcher {
    /// Extensions are given without the leading dot.
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            extensions: extensions.into_iter().map(Into::into).collect(),
        }
    }
}

impl Matcher for ExtensionMatcher {
    fn matches(&self, path: &str) -> bool {
        let segment = path.rsplit('/').next().unwrap_or(path);
        match segment.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => self.extensions.iter().any(|e| e == ext),
            _ => false,
        }
    }
}

/// Combines matchers with OR semantics.
#[derive(Debug, Default)]
pub struct AnyMatcher {
    matchers: Vec<Box<dyn Matcher>>,
}

impl AnyMatcher {
    pub fn new(matchers: Vec<Box<dyn Matcher>>) -> Self {
        Self { matchers }
    }
}

impl Matcher for AnyMatcher {
    fn matches(&self, path: &str) -> bool {
        self.matchers.iter().any(|m| m.matches(path))
    }
}

/// Decides whether a request path is subject to the access gate.
#[derive(Debug, Default)]
pub struct GateMatcher {
    excluded: AnyMatcher,
}

impl GateMatcher {
    pub fn from_config(config: &MatcherConfig) -> Self {
        let mut matchers: Vec<Box<dyn Matcher>> = config
            .excluded_prefixes
            .iter()
            .map(|p| Box::new(PathPrefixMatcher::new(p.clone())) as Box<dyn Matcher>)
            .collect();

        if !config.excluded_extensions.is_empty() {
            matchers.push(Box::new(ExtensionMatcher::new(
                config.excluded_extensions.iter().cloned(),
            )));
        }

        Self {
            excluded: AnyMatcher::new(matchers),
        }
    }

    /// Returns true if the evaluator must see this path.
    pub fn should_gate(&self, path: &str) -> bool {
        !self.excluded.matches(path)
    }
}

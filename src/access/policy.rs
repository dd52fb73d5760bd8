//! Access policy evaluation.
//!
//! # Responsibilities
//! - Hold the public path prefixes and the login redirect target
//! - Decide ALLOW or REDIRECT for a (path, credential presence) pair
//!
//! # Design Decisions
//! - Immutable after construction (shared across requests without locks)
//! - Literal string-prefix matching: `/apricot` matches `/api`
//! - Presence of a credential is trusted; verification is not done here
//! - The redirect target never carries the original destination

use crate::config::AccessConfig;

/// Path prefixes exempted from the access gate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublicPathSet {
    prefixes: Vec<String>,
}

impl PublicPathSet {
    pub fn new<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            prefixes: prefixes.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns true if `path` starts with any configured prefix.
    pub fn contains(&self, path: &str) -> bool {
        self.prefixes.iter().any(|prefix| path.starts_with(prefix.as_str()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.prefixes.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.prefixes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prefixes.is_empty()
    }
}

/// Outcome of evaluating a request against the policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision<'a> {
    /// Continue to the next handler unchanged.
    Allow,
    /// Send the client to the given location.
    Redirect(&'a str),
}

impl Decision<'_> {
    pub fn is_allow(&self) -> bool {
        matches!(self, Decision::Allow)
    }

    /// Label used for metrics and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Allow => "allow",
            Decision::Redirect(_) => "redirect",
        }
    }
}

/// Gates protected paths behind presence of a session credential.
#[derive(Debug, Clone)]
pub struct AccessPolicyEvaluator {
    public_paths: PublicPathSet,
    login_path: String,
}

impl AccessPolicyEvaluator {
    pub fn new(public_paths: PublicPathSet, login_path: impl Into<String>) -> Self {
        Self {
            public_paths,
            login_path: login_path.into(),
        }
    }

    pub fn from_config(config: &AccessConfig) -> Self {
        Self::new(
            PublicPathSet::new(config.public_paths.iter().cloned()),
            config.login_path.clone(),
        )
    }

    /// Decide whether a request may proceed.
    ///
    /// A present credential always allows. Without one, only paths under a
    /// public prefix are allowed; everything else, including the empty path,
    /// redirects to the login path.
    pub fn evaluate(&self, path: &str, credential_present: bool) -> Decision<'_> {
        if credential_present || self.is_public(path) {
            Decision::Allow
        } else {
            Decision::Redirect(&self.login_path)
        }
    }

    pub fn is_public(&self, path: &str) -> bool {
        self.public_paths.contains(path)
    }

    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    pub fn public_paths(&self) -> &PublicPathSet {
        &self.public_paths
    }
}

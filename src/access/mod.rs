//! Request access filter.
//!
//! # Data Flow
//! ```text
//! Incoming request (path, headers)
//!     → path.rs (resolve dot segments)
//!     → matcher.rs (skip static assets)
//!     → credential.rs (is a session token present?)
//!     → policy.rs (public prefix or credential → ALLOW, else REDIRECT)
//!     → Decision handed to the HTTP middleware
//! ```
//!
//! # Design Decisions
//! - Everything here is built once from config and never mutated
//! - Reload builds a fresh `GateSnapshot` instead of editing one in place
//! - No I/O, no locks: evaluation is a pure function of its inputs

pub mod credential;
pub mod matcher;
pub mod path;
pub mod policy;

pub use credential::CredentialProbe;
pub use matcher::GateMatcher;
pub use path::normalize_path;
pub use policy::{AccessPolicyEvaluator, Decision, PublicPathSet};

use crate::config::GateConfig;

/// The access filter pieces built from one configuration.
#[derive(Debug)]
pub struct GateSnapshot {
    pub evaluator: AccessPolicyEvaluator,
    pub probe: CredentialProbe,
    pub matcher: GateMatcher,
    pub redirect_status: u16,
}

impl GateSnapshot {
    pub fn from_config(config: &GateConfig) -> Self {
        Self {
            evaluator: AccessPolicyEvaluator::from_config(&config.access),
            probe: CredentialProbe::from_config(&config.credential),
            matcher: GateMatcher::from_config(&config.matcher),
            redirect_status: config.access.redirect_status,
        }
    }

    /// Evaluate a path with headers already in hand.
    ///
    /// `path` must already be normalized (see [`normalize_path`]).
    /// Returns `None` when the pre-filter skips the path.
    pub fn check(&self, path: &str, headers: &axum::http::HeaderMap) -> Option<Decision<'_>> {
        if !self.matcher.should_gate(path) {
            return None;
        }
        Some(self.evaluator.evaluate(path, self.probe.is_present(headers)))
    }
}

//! Admin back-office access gate library.

pub mod access;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;

pub use access::{AccessPolicyEvaluator, Decision, PublicPathSet};
pub use config::GateConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;

pub mod access_gate;
pub mod metrics;

pub use access_gate::access_gate_middleware;
pub use metrics::metrics_middleware;

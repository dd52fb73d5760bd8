//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → request.rs (request ID assigned or kept)
//!     → middleware/access_gate.rs (ALLOW or redirect to login)
//!     → gate-owned handler (health, docs, image proxy)
//!       or upstream.rs (forward to the admin panel)
//!     → Send to client
//! ```

pub mod docs;
pub mod image;
pub mod middleware;
pub mod request;
pub mod server;
pub mod upstream;

pub use request::{MakeRequestUuid, X_REQUEST_ID};
pub use server::{AppState, GateRuntime, HttpServer, ServerError};

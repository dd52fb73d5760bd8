//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the gate-owned handlers
//! - Wire up middleware (request ID, tracing, metrics, access gate, timeout)
//! - Forward everything else to the admin panel upstream
//! - Apply configuration reloads by swapping the live snapshot
//! - Serve until the shutdown broadcast fires

use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use axum::{middleware, routing::get, Json, Router};
use serde_json::{json, Value};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::access::GateSnapshot;
use crate::config::GateConfig;
use crate::http::docs::docs_router;
use crate::http::image::{image_proxy_handler, ImageProxy, IMAGE_PROXY_PATH};
use crate::http::middleware::{access_gate_middleware, metrics_middleware};
use crate::http::request::{MakeRequestUuid, X_REQUEST_ID};
use crate::http::upstream::{build_client, forward_handler, UpstreamClient};
use crate::lifecycle::shutdown::wait as wait_for_shutdown;
use crate::observability::metrics;

pub const HEALTH_PATH: &str = "/api/health";

/// Error type for server construction.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to build image proxy client: {0}")]
    ImageClient(#[from] reqwest::Error),
}

/// Everything a request needs from the current configuration.
#[derive(Debug)]
pub struct GateRuntime {
    pub gate: GateSnapshot,
    pub upstream: String,
}

impl GateRuntime {
    pub fn from_config(config: &GateConfig) -> Self {
        Self {
            gate: GateSnapshot::from_config(config),
            upstream: config.upstream.address.clone(),
        }
    }
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub runtime: Arc<ArcSwap<GateRuntime>>,
    pub client: UpstreamClient,
}

impl AppState {
    pub fn new(config: &GateConfig) -> Self {
        Self {
            runtime: Arc::new(ArcSwap::from_pointee(GateRuntime::from_config(config))),
            client: build_client(Duration::from_secs(config.timeouts.connect_secs)),
        }
    }

    /// Swap in a snapshot built from `config`. In-flight requests keep theirs.
    pub fn reload(&self, config: &GateConfig) {
        self.runtime.store(Arc::new(GateRuntime::from_config(config)));
        metrics::record_config_reload(true);
        tracing::info!(
            public_paths = ?config.access.public_paths,
            login_path = %config.access.login_path,
            upstream = %config.upstream.address,
            "Configuration reloaded"
        );
    }
}

/// HTTP server for the admin gate.
pub struct HttpServer {
    router: Router,
    state: AppState,
    config: GateConfig,
}

impl HttpServer {
    pub fn new(config: GateConfig) -> Result<Self, ServerError> {
        let state = AppState::new(&config);
        let router = Self::build_router(&config, state.clone())?;
        Ok(Self {
            router,
            state,
            config,
        })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &GateConfig, state: AppState) -> Result<Router, ServerError> {
        let mut router: Router<AppState> = Router::new().route(HEALTH_PATH, get(health_handler));

        if config.docs.enabled {
            router = router.merge(docs_router::<AppState>(config.docs.clone()));
        }

        if config.image_proxy.enabled {
            let proxy = Arc::new(ImageProxy::new(config.image_proxy.clone())?);
            router = router.merge(
                Router::new()
                    .route(IMAGE_PROXY_PATH, get(image_proxy_handler))
                    .with_state::<AppState>(proxy),
            );
        }

        Ok(router
            .fallback(forward_handler)
            .layer(middleware::from_fn_with_state(
                state.clone(),
                access_gate_middleware,
            ))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(middleware::from_fn(metrics_middleware))
            .layer(PropagateRequestIdLayer::new(X_REQUEST_ID.clone()))
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::new(X_REQUEST_ID.clone(), MakeRequestUuid)))
    }

    /// Run the server, accepting connections on the given listener.
    ///
    /// Config updates are applied until the channel closes; the server stops
    /// when `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut config_updates: mpsc::UnboundedReceiver<GateConfig>,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            upstream = %self.config.upstream.address,
            "HTTP server starting"
        );

        let state = self.state.clone();
        let mut reload_shutdown = shutdown.resubscribe();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    update = config_updates.recv() => match update {
                        Some(config) => state.reload(&config),
                        None => break,
                    },
                    _ = reload_shutdown.recv() => break,
                }
            }
        });

        axum::serve(listener, self.router)
            .with_graceful_shutdown(wait_for_shutdown(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    /// Shared state, for applying reloads from outside `run`.
    pub fn state(&self) -> &AppState {
        &self.state
    }
}

async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

//! Admin back-office access gate.
//!
//! # Architecture Overview
//!
//! ```text
//!                        ┌──────────────────────────────────────────────┐
//!                        │                  ADMIN GATE                   │
//!                        │                                               │
//!   Browser request      │  ┌──────────┐   ┌──────────┐   ┌──────────┐  │
//!   ─────────────────────┼─▶│ request  │──▶│ matcher  │──▶│  policy  │  │
//!                        │  │   id     │   │(skip     │   │ ALLOW /  │  │
//!                        │  └──────────┘   │ assets)  │   │ REDIRECT │  │
//!                        │                 └──────────┘   └────┬─────┘  │
//!                        │                                     │        │
//!   307 → /login         │◀──────────────── REDIRECT ──────────┤        │
//!                        │                                     ▼ ALLOW  │
//!                        │  ┌──────────────────────┐   ┌──────────────┐ │
//!                        │  │ health / docs /      │   │   upstream   │─┼──▶ Admin panel
//!                        │  │ image proxy          │   │   forward    │ │
//!                        │  └──────────────────────┘   └──────────────┘ │
//!                        │                                               │
//!                        │  config (TOML + hot reload) · logging ·       │
//!                        │  metrics · shutdown                          │
//!                        └──────────────────────────────────────────────┘
//! ```
//!
//! The config file is the first argument, or `ADMIN_GATE_CONFIG`. Without
//! either, built-in defaults are used and nothing is watched.

use std::path::PathBuf;

use tokio::net::TcpListener;
use tokio::sync::mpsc;

use admin_gate::config::{load_config, watcher::ConfigWatcher, GateConfig, CONFIG_ENV};
use admin_gate::http::HttpServer;
use admin_gate::lifecycle::{signals, Shutdown};
use admin_gate::observability::{logging, metrics};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from));

    let config = match &config_path {
        Some(path) => load_config(path)?,
        None => GateConfig::default(),
    };

    logging::init(&config.observability);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "admin-gate starting");
    tracing::info!(
        config = ?config_path,
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.address,
        public_paths = ?config.access.public_paths,
        login_path = %config.access.login_path,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    // The watcher must outlive the server for reload events to flow.
    let (_watcher, config_updates) = match &config_path {
        Some(path) => {
            let (watcher, updates) = ConfigWatcher::new(path);
            (Some(watcher.run()?), updates)
        }
        None => {
            let (_, updates) = mpsc::unbounded_channel();
            (None, updates)
        }
    };

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(signals::listen(shutdown.clone()));

    let server = HttpServer::new(config)?;
    server.run(listener, config_updates, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

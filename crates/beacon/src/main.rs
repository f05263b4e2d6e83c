//! # beacon
//!
//! Presence relay server binary — wires config, metrics, the session hub,
//! and the HTTP/WebSocket router, then serves until interrupted.

#![deny(unsafe_code)]

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use beacon_server::routes::{AppState, router};
use beacon_server::{ServerConfig, SessionHub, metrics};

/// Beacon presence relay server.
#[derive(Parser, Debug)]
#[command(name = "beacon", about = "Real-time presence relay server")]
struct Cli {
    /// Host to bind (overrides BEACON_HOST).
    #[arg(long)]
    host: Option<String>,

    /// Port to bind (overrides PORT).
    #[arg(long)]
    port: Option<u16>,

    /// Directory served as static assets (overrides BEACON_STATIC_DIR).
    #[arg(long)]
    static_dir: Option<PathBuf>,
}

impl Cli {
    /// Environment-derived config with CLI flags layered on top.
    fn into_config(self) -> ServerConfig {
        let mut config = ServerConfig::from_env();
        if let Some(host) = self.host {
            config.host = host;
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(static_dir) = self.static_dir {
            config.static_dir = static_dir;
        }
        config
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Cli::parse().into_config();
    let metrics_handle = metrics::install_recorder();

    let hub = Arc::new(SessionHub::new());
    let state = AppState {
        hub,
        metrics: metrics_handle,
    };
    let app = router(state, &config);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(
        addr = %addr,
        static_dir = %config.static_dir.display(),
        "server is running"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("shutdown signal received"),
        Err(e) => tracing::error!(error = %e, "failed to listen for shutdown signal"),
    }
}

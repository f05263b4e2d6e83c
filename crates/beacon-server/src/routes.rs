//! Axum router and HTTP surface.
//!
//! | Route | Purpose |
//! |-------|---------|
//! | `GET /ws` | WebSocket upgrade into the relay |
//! | `GET /healthz` | Liveness probe with the current client count |
//! | `GET /metrics` | Prometheus text exposition |
//! | fallback | Static assets from the configured directory |

use std::sync::Arc;

use axum::Router;
use axum::extract::{State, WebSocketUpgrade};
use axum::response::{Json, Response};
use axum::routing::get;
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;
use crate::hub::SessionHub;
use crate::websocket;

/// Shared state handed to every route handler.
#[derive(Clone)]
pub struct AppState {
    /// The session hub.
    pub hub: Arc<SessionHub>,
    /// Handle for rendering `/metrics`.
    pub metrics: PrometheusHandle,
}

/// Build the full application router.
pub fn router(state: AppState, config: &ServerConfig) -> Router {
    Router::new()
        .route("/ws", get(ws_handler))
        .route("/healthz", get(healthz))
        .route("/metrics", get(metrics_endpoint))
        .fallback_service(ServeDir::new(&config.static_dir))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn ws_handler(State(state): State<AppState>, upgrade: WebSocketUpgrade) -> Response {
    upgrade.on_upgrade(move |socket| websocket::run_connection(socket, state.hub))
}

async fn healthz(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "clients": state.hub.connection_count(),
    }))
}

async fn metrics_endpoint(State(state): State<AppState>) -> String {
    crate::metrics::render(&state.metrics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use metrics_exporter_prometheus::PrometheusBuilder;

    #[test]
    fn router_builds_with_defaults() {
        let state = AppState {
            hub: Arc::new(SessionHub::new()),
            metrics: PrometheusBuilder::new().build_recorder().handle(),
        };
        let _router = router(state, &ServerConfig::default());
    }
}

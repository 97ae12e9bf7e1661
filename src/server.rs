//! HTTP server for scrapes and status queries
//!
//! Routes:
//! - `GET /metrics`: Prometheus text exposition of [`SentinelMetrics`]
//! - `GET /status`: JSON [`StatusSnapshot`] of the shared state
//! - `GET /health`: liveness of the process itself

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use sentinel_core::{SharedState, StatusSnapshot};
use sentinel_observability::{SentinelMetrics, TEXT_CONTENT_TYPE};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::error::{Result, SentinelError};

/// State shared by all handlers
#[derive(Clone)]
pub struct AppState {
    pub metrics: Arc<SentinelMetrics>,
    pub state: SharedState,
}

impl AppState {
    pub fn new(metrics: Arc<SentinelMetrics>, state: SharedState) -> Self {
        Self { metrics, state }
    }
}

/// Build the router with all routes attached
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/metrics", get(metrics_handler))
        .route("/status", get(status_handler))
        .route("/health", get(health_handler))
        .fallback(|| async {
            (
                StatusCode::NOT_FOUND,
                "Net Sentinel - endpoints: /metrics, /status, /health",
            )
        })
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn metrics_handler(State(state): State<AppState>) -> Response {
    match state.metrics.encode_text() {
        Ok(body) => {
            let headers = [(header::CONTENT_TYPE, TEXT_CONTENT_TYPE)];
            (headers, body).into_response()
        }
        Err(e) => {
            error!("Failed to encode metrics: {}", e);
            let body = e.to_string();
            (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
        }
    }
}

async fn status_handler(State(state): State<AppState>) -> Json<StatusSnapshot> {
    Json(state.state.snapshot().await)
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "net-sentinel",
        "version": crate::VERSION,
    }))
}

/// Bind the listening socket
pub async fn bind(addr: SocketAddr) -> Result<TcpListener> {
    TcpListener::bind(addr)
        .await
        .map_err(|e| SentinelError::Server(format!("Failed to bind {}: {}", addr, e)))
}

/// Serve until `shutdown` fires, then drain open connections
pub async fn serve(
    listener: TcpListener,
    state: AppState,
    shutdown: CancellationToken,
) -> Result<()> {
    let addr = listener.local_addr()?;
    info!("📊 Serving metrics on http://{}/metrics", addr);
    info!("   Status: http://{}/status", addr);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await
        .map_err(|e| SentinelError::Server(e.to_string()))?;

    info!("HTTP server on {} stopped", addr);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sentinel_core::ProbeResult;
    use sentinel_observability::MetricsSink;
    use std::time::Duration;

    fn app_state() -> AppState {
        AppState::new(
            Arc::new(SentinelMetrics::new().unwrap()),
            SharedState::new("http://example.com/"),
        )
    }

    #[tokio::test]
    async fn test_metrics_handler_content_type() {
        let state = app_state();
        state.metrics.record_check();

        let response = metrics_handler(State(state)).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], TEXT_CONTENT_TYPE);
    }

    #[tokio::test]
    async fn test_status_handler_reflects_state() {
        let state = app_state();
        let result = ProbeResult::up(Duration::from_millis(40));
        state.state.record(&result).await;

        let Json(snapshot) = status_handler(State(state)).await;
        assert_eq!(snapshot.check_count, 1);
        assert_eq!(snapshot.latency_ms, Some(40.0));
    }

    #[tokio::test]
    async fn test_health_handler() {
        let Json(body) = health_handler().await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "net-sentinel");
    }
}

//! HTTP API for health checks, the latest verdict, and Prometheus metrics

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use monitor_lib::{HealthRegistry, LoopState};
use prometheus::{Encoder, TextEncoder};
use serde_json::json;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub health_registry: HealthRegistry,
    pub loop_state: watch::Receiver<LoopState>,
}

impl AppState {
    pub fn new(health_registry: HealthRegistry, loop_state: watch::Receiver<LoopState>) -> Self {
        Self {
            health_registry,
            loop_state,
        }
    }

    fn loop_state(&self) -> LoopState {
        *self.loop_state.borrow()
    }
}

/// Component health - 200 while the loop lives (degraded components included), 503 once stopped
async fn healthz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let health = state.health_registry.health().await;

    let status_code = match state.loop_state() {
        LoopState::Stopped => StatusCode::SERVICE_UNAVAILABLE,
        LoopState::Idle | LoopState::Running => StatusCode::OK,
    };

    (status_code, Json(health))
}

/// Readiness - 200 only while the loop is running
async fn readyz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let loop_state = state.loop_state();
    let status_code = if loop_state == LoopState::Running {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(json!({ "state": loop_state })))
}

/// Latest health verdict
async fn status(State(state): State<Arc<AppState>>) -> Response {
    match state.health_registry.latest_verdict().await {
        Some(verdict) => (StatusCode::OK, Json(verdict)).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "no verdict yet" })),
        )
            .into_response(),
    }
}

/// Prometheus metrics endpoint
async fn metrics() -> Response {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        warn!(error = %e, "Failed to encode metrics");
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }

    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        buffer,
    )
        .into_response()
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/status", get(status))
        .route("/metrics", get(metrics))
        .with_state(state)
}

/// Start the API server
pub async fn serve(port: u16, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = create_router(state);

    let addr = format!("0.0.0.0:{}", port);
    info!(addr = %addr, "Starting API server");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Run the API server in the background, logging a failed bind or serve
pub fn spawn(port: u16, state: Arc<AppState>) -> JoinHandle<()> {
    tokio::spawn(async move {
        if let Err(e) = serve(port, state).await {
            error!(port, error = %e, "API server stopped");
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use monitor_lib::health::components;
    use monitor_lib::{evaluate, MonitorMetrics, ResourceSnapshot};
    use tower::ServiceExt;

    fn test_state(loop_state: LoopState) -> (Arc<AppState>, watch::Sender<LoopState>) {
        let (tx, rx) = watch::channel(loop_state);
        (Arc::new(AppState::new(HealthRegistry::new(), rx)), tx)
    }

    async fn get_path(state: Arc<AppState>, path: &str) -> (StatusCode, Vec<u8>) {
        let response = create_router(state)
            .oneshot(Request::builder().uri(path).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, body.to_vec())
    }

    #[tokio::test]
    async fn test_healthz_tracks_loop_state() {
        let (state, tx) = test_state(LoopState::Running);
        state.health_registry.register(components::SOURCE).await;
        state
            .health_registry
            .record_failure(components::SOURCE, "metrics source unavailable: timeout")
            .await;

        let (code, body) = get_path(state.clone(), "/healthz").await;
        assert_eq!(code, StatusCode::OK);
        let health: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(health["status"], "degraded");
        assert_eq!(health["components"]["metrics_source"]["consecutive_failures"], 1);

        tx.send_replace(LoopState::Stopped);
        let (code, _) = get_path(state, "/healthz").await;
        assert_eq!(code, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_readyz_only_while_running() {
        let (state, tx) = test_state(LoopState::Idle);
        let (code, _) = get_path(state.clone(), "/readyz").await;
        assert_eq!(code, StatusCode::SERVICE_UNAVAILABLE);

        tx.send_replace(LoopState::Running);
        let (code, body) = get_path(state.clone(), "/readyz").await;
        assert_eq!(code, StatusCode::OK);
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["state"], "running");

        tx.send_replace(LoopState::Stopped);
        let (code, _) = get_path(state, "/readyz").await;
        assert_eq!(code, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_status_returns_latest_verdict() {
        let (state, _tx) = test_state(LoopState::Running);
        let (code, _) = get_path(state.clone(), "/status").await;
        assert_eq!(code, StatusCode::NOT_FOUND);

        let verdict = evaluate(ResourceSnapshot::new(50.0, 85.0, 40.0), 80.0);
        state.health_registry.record_verdict(verdict).await;

        let (code, body) = get_path(state, "/status").await;
        assert_eq!(code, StatusCode::OK);
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["status"], "warning");
        assert_eq!(body["max_usage"], 85.0);
    }

    #[tokio::test]
    async fn test_spawn_ends_when_port_is_taken() {
        let taken = tokio::net::TcpListener::bind("0.0.0.0:0").await.unwrap();
        let port = taken.local_addr().unwrap().port();

        let (state, _tx) = test_state(LoopState::Running);
        assert!(serve(port, state.clone()).await.is_err());

        let handle = spawn(port, state);
        tokio::time::timeout(std::time::Duration::from_secs(5), handle)
            .await
            .expect("failed server task should finish")
            .unwrap();
    }

    #[tokio::test]
    async fn test_metrics_endpoint_exposes_monitor_metrics() {
        let metrics = MonitorMetrics::new();
        metrics.inc_predictive_alerts();

        let (state, _tx) = test_state(LoopState::Running);
        let (code, body) = get_path(state, "/metrics").await;
        assert_eq!(code, StatusCode::OK);
        let text = String::from_utf8(body).unwrap();
        assert!(text.contains("devops_monitor_predictive_alerts_total"));
    }
}

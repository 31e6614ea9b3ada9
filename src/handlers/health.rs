//! Health and infrastructure handlers
//!
//! Kubernetes probes, Prometheus metrics, and the memory-health report.

use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use serde::Serialize;

use super::state::AppState;
use crate::aggregate::health::{compute_health, MemoryHealth};
use crate::errors::{AppError, Result};
use crate::metrics;
use crate::store::scroll_all;
use crate::telemetry::attempted_put_writes;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: String,
    pub collection: String,
    /// `"connected"` or `"unreachable"`
    pub qdrant: &'static str,
    pub uptime_seconds: i64,
}

/// Main health check endpoint. Always 200; an unreachable store degrades
/// the reported status instead of failing the check.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let reachable = state.store.collection_info().await.is_ok();

    Json(HealthResponse {
        status: if reachable { "healthy" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION").to_string(),
        collection: state.config.collection.clone(),
        qdrant: if reachable { "connected" } else { "unreachable" },
        uptime_seconds: (Utc::now() - state.started_at).num_seconds(),
    })
}

/// Liveness probe - 200 whenever the process can answer at all
pub async fn health_live() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "status": "alive",
            "timestamp": Utc::now().to_rfc3339()
        })),
    )
}

/// Readiness probe - 200 when the collection answers, 503 otherwise
pub async fn health_ready(State(state): State<AppState>) -> (StatusCode, Json<serde_json::Value>) {
    match state.store.collection_info().await {
        Ok(info) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "status": "ready",
                "collection_status": info.status,
                "points_count": info.points_count,
                "timestamp": Utc::now().to_rfc3339()
            })),
        ),
        Err(err) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(serde_json::json!({
                "status": "not_ready",
                "error": err.to_string(),
                "timestamp": Utc::now().to_rfc3339()
            })),
        ),
    }
}

/// Prometheus metrics endpoint
pub async fn metrics_endpoint() -> std::result::Result<String, StatusCode> {
    use prometheus::Encoder;

    let encoder = prometheus::TextEncoder::new();
    let metric_families = metrics::METRICS_REGISTRY.gather();

    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    String::from_utf8(buffer).map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

/// GET /api/memory-health - dedup, velocity, batches and source breakdown
pub async fn memory_health(State(state): State<AppState>) -> Result<Json<MemoryHealth>> {
    let store = state.store.as_ref();
    let (points, telemetry, stored) = tokio::join!(
        scroll_all(store, None),
        store.telemetry(),
        store.count(None),
    );

    let points = points.map_err(AppError::store)?;
    let telemetry = telemetry.map_err(AppError::telemetry)?;
    let stored = stored.map_err(AppError::store)?;

    let attempted = attempted_put_writes(&telemetry);
    Ok(Json(compute_health(&points, attempted, stored, Utc::now())))
}

//! Settings endpoint: the non-secret configuration the frontend needs

use axum::{extract::State, Json};
use serde::Serialize;

use super::state::AppState;
use crate::telemetry::app_version;

#[derive(Debug, Serialize)]
pub struct QdrantSettings {
    pub url: String,
    pub collection: String,
    /// `"unknown"` when the collection probe fails
    pub status: String,
    /// `"unknown"` when the telemetry probe fails
    pub version: String,
}

#[derive(Debug, Serialize)]
pub struct EmbeddingSettings {
    pub model: String,
    pub min_score: f32,
    /// Zero when the collection probe fails
    pub vector_dimensions: u64,
    pub distance_metric: String,
    /// Whether the Query Explorer has a credential configured
    pub explore_enabled: bool,
}

#[derive(Debug, Serialize)]
pub struct SettingsResponse {
    pub version: String,
    pub qdrant: QdrantSettings,
    pub embeddings: EmbeddingSettings,
    /// Explicit directory; empty means auto-discovery
    pub agents: Vec<String>,
    pub refresh_interval_s: u64,
    pub page_size: usize,
    pub port: u16,
}

/// GET /api/settings - never includes the API key itself
///
/// Both upstream probes are soft: an unreachable Qdrant leaves the static
/// configuration intact with `"unknown"` placeholders.
pub async fn get_settings(State(state): State<AppState>) -> Json<SettingsResponse> {
    let store = state.store.as_ref();
    let (info, telemetry) = tokio::join!(store.collection_info(), store.telemetry());

    let (status, dimensions, distance) = match info {
        Ok(info) => (info.status, info.vector_dimensions, info.distance_metric),
        Err(_) => ("unknown".to_string(), 0, "unknown".to_string()),
    };
    let qdrant_version = telemetry
        .map(|t| app_version(&t))
        .unwrap_or_else(|_| "unknown".to_string());

    let config = &state.config;
    Json(SettingsResponse {
        version: env!("CARGO_PKG_VERSION").to_string(),
        qdrant: QdrantSettings {
            url: config.qdrant_url.clone(),
            collection: config.collection.clone(),
            status,
            version: qdrant_version,
        },
        embeddings: EmbeddingSettings {
            model: config.embedding_model.clone(),
            min_score: config.min_score,
            vector_dimensions: dimensions,
            distance_metric: distance,
            explore_enabled: state.embedder.is_some(),
        },
        agents: config.agents.clone(),
        refresh_interval_s: config.refresh_interval_s,
        page_size: config.page_size,
        port: config.port,
    })
}

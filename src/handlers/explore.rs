//! Query Explorer: semantic search over the collection

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use super::state::AppState;
use crate::errors::{AppError, Result};
use crate::memory::{to_memory, Memory};
use crate::store::agent_filter;

pub const MIN_TOP_K: usize = 1;
pub const MAX_TOP_K: usize = 50;
pub const DEFAULT_TOP_K: usize = 10;

#[derive(Debug, Deserialize)]
pub struct ExploreRequest {
    #[serde(default)]
    pub query: String,
    pub agent: Option<String>,
    #[serde(rename = "topK")]
    pub top_k: Option<usize>,
    #[serde(rename = "minScore")]
    pub min_score: Option<f32>,
}

#[derive(Debug, Serialize)]
pub struct ExploreResult {
    #[serde(flatten)]
    pub memory: Memory,
    pub score: f32,
}

#[derive(Debug, Serialize)]
pub struct ExploreResponse {
    pub query: String,
    pub model: String,
    pub results: Vec<ExploreResult>,
}

/// POST /api/explore - embed the query and rank the collection against it
///
/// Validation runs before any upstream call: an empty query and a missing
/// API key are both client errors, not upstream failures.
pub async fn explore(
    State(state): State<AppState>,
    Json(request): Json<ExploreRequest>,
) -> Result<Json<ExploreResponse>> {
    let query = request.query.trim();
    if query.is_empty() {
        return Err(AppError::QueryRequired);
    }

    let Some(embedder) = state.embedder.as_ref() else {
        return Err(AppError::MissingCredential {
            var: "OPENAI_API_KEY",
        });
    };

    let top_k = request.top_k.unwrap_or(DEFAULT_TOP_K).clamp(MIN_TOP_K, MAX_TOP_K);

    let vector = embedder.embed(query).await.map_err(AppError::embedding)?;

    // "all" is the frontend's explicit no-filter value
    let filter = request
        .agent
        .as_deref()
        .filter(|a| !a.is_empty() && *a != "all")
        .map(agent_filter);
    let hits = state
        .store
        .search(vector, top_k, filter.as_ref())
        .await
        .map_err(AppError::store)?;

    // Every ranked hit comes back by default; the score floor applies only
    // when the caller asks for one.
    let min_score = request.min_score;
    let results = hits
        .into_iter()
        .filter(|hit| min_score.is_none_or(|floor| hit.score >= floor))
        .map(|hit| ExploreResult {
            memory: to_memory(hit.id, &hit.payload),
            score: hit.score,
        })
        .collect();

    Ok(Json(ExploreResponse {
        query: query.to_string(),
        model: embedder.model().to_string(),
        results,
    }))
}

//! Storage and performance report handlers

use axum::{extract::State, Json};
use chrono::Utc;
use serde::Serialize;

use super::state::AppState;
use crate::aggregate::snapshots::{RatePoint, SearchSnapshot};
use crate::aggregate::storage::{compute_storage, StorageStats};
use crate::errors::{AppError, Result};
use crate::store::scroll_all;
use crate::telemetry::{compute_performance, parse_rss_mb, PerformanceStats};

/// GET /api/storage - disk estimate, RSS, growth projection
///
/// The metrics feed is optional here: when it fails the RSS reading comes
/// back as zero and everything else still comes back.
pub async fn get_storage(State(state): State<AppState>) -> Result<Json<StorageStats>> {
    let store = state.store.as_ref();
    let (info, points, metrics_text) = tokio::join!(
        store.collection_info(),
        scroll_all(store, None),
        store.metrics_text(),
    );

    let info = info.map_err(AppError::store)?;
    let points = points.map_err(AppError::store)?;
    let rss_mb = metrics_text.map_or(0.0, |text| parse_rss_mb(&text));

    Ok(Json(compute_storage(
        &state.config.collection,
        &info,
        &points,
        rss_mb,
        Utc::now(),
    )))
}

#[derive(Debug, Serialize)]
pub struct PerformanceResponse {
    #[serde(flatten)]
    pub stats: PerformanceStats,
    /// Raw counter snapshots recorded by this endpoint
    pub snapshots: Vec<SearchSnapshot>,
    /// Searches-per-minute deltas between consecutive snapshots
    pub search_rate: Vec<RatePoint>,
}

/// GET /api/performance - upstream latency, success rate and search rate
///
/// Every call records the current search-call total into the snapshot
/// buffer, so the rate series builds up as the frontend polls.
pub async fn get_performance(State(state): State<AppState>) -> Result<Json<PerformanceResponse>> {
    let store = state.store.as_ref();
    let (telemetry, metrics_text) = tokio::join!(store.telemetry(), store.metrics_text());

    let telemetry = telemetry.map_err(AppError::telemetry)?;
    let metrics_text = metrics_text.ok();

    let now = Utc::now();
    let stats = compute_performance(&telemetry, metrics_text.as_deref(), now);

    state.search_snapshots.push(stats.search.total_calls, now);

    Ok(Json(PerformanceResponse {
        snapshots: state.search_snapshots.snapshots(),
        search_rate: state.search_snapshots.rate_series(),
        stats,
    }))
}

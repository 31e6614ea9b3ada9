//! Router configuration - centralized route definitions
//!
//! The whole surface is read-only: every `/api` route is a GET except the
//! explore search, which takes its query in a POST body.

use axum::{
    routing::{get, post},
    Router,
};

use super::state::AppState;
use super::{activity, explore, health, memories, settings, stats, storage};

/// Build the complete router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // =================================================================
        // HEALTH & KUBERNETES PROBES
        // =================================================================
        .route("/health", get(health::health))
        .route("/health/live", get(health::health_live))
        .route("/health/ready", get(health::health_ready))
        // =================================================================
        // METRICS (PROMETHEUS)
        // =================================================================
        .route("/metrics", get(health::metrics_endpoint))
        // =================================================================
        // OVERVIEW & DIRECTORY
        // =================================================================
        .route("/api/stats", get(stats::get_stats))
        .route("/api/agents", get(stats::get_agents))
        // =================================================================
        // MEMORY LISTING
        // =================================================================
        .route("/api/memories", get(memories::list_memories))
        .route("/api/recent", get(memories::recent_memories))
        // =================================================================
        // ACTIVITY CHARTS
        // =================================================================
        .route("/api/growth", get(activity::get_growth))
        .route("/api/timeline", get(activity::get_timeline))
        // =================================================================
        // HEALTH, STORAGE & PERFORMANCE REPORTS
        // =================================================================
        .route("/api/memory-health", get(health::memory_health))
        .route("/api/storage", get(storage::get_storage))
        .route("/api/performance", get(storage::get_performance))
        // =================================================================
        // QUERY EXPLORER
        // =================================================================
        .route("/api/explore", post(explore::explore))
        // =================================================================
        // SETTINGS
        // =================================================================
        .route("/api/settings", get(settings::get_settings))
        // =================================================================
        // STATE
        // =================================================================
        .with_state(state)
}

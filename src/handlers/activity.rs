//! Activity chart endpoints: growth and timeline

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::Utc;
use serde::Deserialize;

use super::state::AppState;
use crate::aggregate::growth::{clamp_days, compute_growth, GrowthResponse};
use crate::aggregate::timeline::{
    auto_granularity, clamp_hours, compute_timeline, Granularity, TimelineResponse,
    DEFAULT_TIMELINE_HOURS,
};
use crate::errors::{AppError, Result};
use crate::store::scroll_all;

#[derive(Debug, Deserialize)]
pub struct GrowthQuery {
    pub days: Option<i64>,
}

/// GET /api/growth - cumulative and per-day counts over a calendar window
pub async fn get_growth(
    State(state): State<AppState>,
    Query(params): Query<GrowthQuery>,
) -> Result<Json<GrowthResponse>> {
    let days = clamp_days(params.days);
    let points = scroll_all(state.store.as_ref(), None)
        .await
        .map_err(AppError::store)?;

    Ok(Json(compute_growth(&points, days, Utc::now())))
}

#[derive(Debug, Deserialize)]
pub struct TimelineQuery {
    pub hours: Option<i64>,
    pub granularity: Option<Granularity>,
}

/// GET /api/timeline - per-agent activity in hour or day buckets
pub async fn get_timeline(
    State(state): State<AppState>,
    Query(params): Query<TimelineQuery>,
) -> Result<Json<TimelineResponse>> {
    let hours = clamp_hours(params.hours, DEFAULT_TIMELINE_HOURS);
    let granularity = params.granularity.unwrap_or_else(|| auto_granularity(hours));

    let points = scroll_all(state.store.as_ref(), None)
        .await
        .map_err(AppError::store)?;

    Ok(Json(compute_timeline(&points, hours, granularity, Utc::now())))
}

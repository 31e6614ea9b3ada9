//! Memory listing endpoints: the paginated browser and the recent feed

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::state::AppState;
use crate::aggregate::listing::{
    clamp_limit, filter_recent, paginate, sort_memories, SortOrder, DEFAULT_RECENT_HOURS,
};
use crate::aggregate::timeline::clamp_hours;
use crate::errors::{AppError, Result};
use crate::memory::{to_memory, Memory};
use crate::store::{agent_filter, scroll_all};

#[derive(Debug, Deserialize)]
pub struct MemoriesQuery {
    pub agent: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
    pub sort: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MemoriesResponse {
    pub total: usize,
    pub limit: usize,
    pub offset: usize,
    pub memories: Vec<Memory>,
}

/// GET /api/memories - paginated listing, newest first by default
pub async fn list_memories(
    State(state): State<AppState>,
    Query(params): Query<MemoriesQuery>,
) -> Result<Json<MemoriesResponse>> {
    let limit = clamp_limit(params.limit);
    let offset = params.offset.unwrap_or(0);
    let order = SortOrder::from_query(params.sort.as_deref());

    let filter = params.agent.as_deref().map(agent_filter);
    let points = scroll_all(state.store.as_ref(), filter.as_ref())
        .await
        .map_err(AppError::store)?;

    let mut memories: Vec<Memory> = points
        .into_iter()
        .map(|p| to_memory(p.id, &p.payload))
        .collect();
    sort_memories(&mut memories, order);

    let (total, page) = paginate(memories, offset, limit);
    Ok(Json(MemoriesResponse {
        total,
        limit,
        offset,
        memories: page,
    }))
}

#[derive(Debug, Deserialize)]
pub struct RecentQuery {
    pub agent: Option<String>,
    pub hours: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct RecentResponse {
    pub hours: i64,
    /// In-window count before the 50-record cap
    pub total: usize,
    /// Start of the window, RFC 3339
    pub cutoff: String,
    pub memories: Vec<Memory>,
}

/// GET /api/recent - newest-first feed over a sliding window, capped at 50
pub async fn recent_memories(
    State(state): State<AppState>,
    Query(params): Query<RecentQuery>,
) -> Result<Json<RecentResponse>> {
    let hours = clamp_hours(params.hours, DEFAULT_RECENT_HOURS);

    let filter = params.agent.as_deref().map(agent_filter);
    let points = scroll_all(state.store.as_ref(), filter.as_ref())
        .await
        .map_err(AppError::store)?;

    let mut memories: Vec<Memory> = points
        .into_iter()
        .map(|p| to_memory(p.id, &p.payload))
        .collect();
    sort_memories(&mut memories, SortOrder::Newest);

    let now = Utc::now();
    let cutoff = (now - chrono::Duration::hours(hours)).to_rfc3339();
    let (total, memories) = filter_recent(memories, hours, now);

    Ok(Json(RecentResponse {
        hours,
        total,
        cutoff,
        memories,
    }))
}

//! Overview statistics and the agent directory

use axum::{extract::State, Json};
use serde::Serialize;

use super::state::AppState;
use crate::aggregate::agents::discover_agents;
use crate::errors::{AppError, Result};
use crate::store::agent_filter;

#[derive(Debug, Serialize)]
pub struct AgentCount {
    pub agent: String,
    pub count: u64,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    /// Sum of the per-agent counts; records outside the directory are
    /// invisible here just as they are in the breakdown
    pub total: u64,
    /// Per-agent counts in directory order
    pub agents: Vec<AgentCount>,
    pub collection: String,
    #[serde(rename = "lastUpdated")]
    pub last_updated: String,
}

/// GET /api/stats - total and per-agent record counts
pub async fn get_stats(State(state): State<AppState>) -> Result<Json<StatsResponse>> {
    let directory = discover_agents(state.store.as_ref(), &state.config.agents)
        .await
        .map_err(AppError::store)?;

    let mut agents = Vec::with_capacity(directory.len());
    for agent in directory {
        let filter = agent_filter(&agent);
        let count = state
            .store
            .count(Some(&filter))
            .await
            .map_err(AppError::store)?;
        agents.push(AgentCount { agent, count });
    }
    let total = agents.iter().map(|a| a.count).sum();

    Ok(Json(StatsResponse {
        total,
        agents,
        collection: state.config.collection.clone(),
        last_updated: chrono::Utc::now().to_rfc3339(),
    }))
}

#[derive(Debug, Serialize)]
pub struct AgentsResponse {
    pub agents: Vec<String>,
    /// `"configured"` when AGENTS is set, `"discovered"` otherwise
    pub source: &'static str,
}

/// GET /api/agents - the agent directory
pub async fn get_agents(State(state): State<AppState>) -> Result<Json<AgentsResponse>> {
    let agents = discover_agents(state.store.as_ref(), &state.config.agents)
        .await
        .map_err(AppError::store)?;

    Ok(Json(AgentsResponse {
        source: if state.config.agents.is_empty() {
            "discovered"
        } else {
            "configured"
        },
        agents,
    }))
}

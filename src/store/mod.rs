//! Backing-store abstraction over the vector collection
//!
//! Every aggregator consumes the store through the [`VectorStore`] trait so
//! tests can substitute an in-memory implementation. The production
//! implementation is the Qdrant REST client in [`qdrant`].

pub mod qdrant;

use async_trait::async_trait;
use serde::Serialize;

use crate::memory::{RawPayload, FIELD_AGENT, FIELD_AGENT_LEGACY};

pub use qdrant::QdrantStore;

/// Page size used by every full-collection scroll
pub const SCROLL_PAGE_SIZE: usize = 100;

/// Opaque pagination cursor returned by the store (string or integer)
pub type ScrollCursor = serde_json::Value;

/// One stored record: opaque id plus raw payload
#[derive(Debug, Clone)]
pub struct ScrollPoint {
    pub id: String,
    pub payload: RawPayload,
}

/// One page of a scroll pass
#[derive(Debug, Clone)]
pub struct ScrollPage {
    pub points: Vec<ScrollPoint>,
    /// `None` signals the final page
    pub next: Option<ScrollCursor>,
}

/// A search hit with its similarity score
#[derive(Debug, Clone)]
pub struct ScoredPoint {
    pub id: String,
    pub payload: RawPayload,
    pub score: f32,
}

/// Collection-level metadata from the store
#[derive(Debug, Clone)]
pub struct CollectionInfo {
    pub status: String,
    pub points_count: u64,
    pub vector_dimensions: u64,
    pub distance_metric: String,
}

/// Match condition on a single payload field
#[derive(Debug, Clone, Serialize)]
pub struct FieldMatch {
    pub key: &'static str,
    #[serde(rename = "match")]
    pub value: MatchValue,
}

#[derive(Debug, Clone, Serialize)]
pub struct MatchValue {
    pub value: String,
}

/// Qdrant-style filter: a logical OR over match conditions
#[derive(Debug, Clone, Serialize)]
pub struct AgentFilter {
    pub should: Vec<FieldMatch>,
}

/// Build the agent filter as an OR across both schema generations, so
/// records written under either convention match.
pub fn agent_filter(agent: &str) -> AgentFilter {
    AgentFilter {
        should: vec![
            FieldMatch {
                key: FIELD_AGENT,
                value: MatchValue {
                    value: agent.to_string(),
                },
            },
            FieldMatch {
                key: FIELD_AGENT_LEGACY,
                value: MatchValue {
                    value: agent.to_string(),
                },
            },
        ],
    }
}

/// Minimal contract the aggregation engines require from the backing store.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Fetch one page of records, optionally filtered by agent.
    async fn scroll(
        &self,
        filter: Option<&AgentFilter>,
        limit: usize,
        cursor: Option<ScrollCursor>,
    ) -> anyhow::Result<ScrollPage>;

    /// Exact count of records matching the filter.
    async fn count(&self, filter: Option<&AgentFilter>) -> anyhow::Result<u64>;

    /// Collection metadata (status, point count, vector parameters).
    async fn collection_info(&self) -> anyhow::Result<CollectionInfo>;

    /// Ranked vector search. Ranking is entirely the store's concern.
    async fn search(
        &self,
        vector: Vec<f32>,
        limit: usize,
        filter: Option<&AgentFilter>,
    ) -> anyhow::Result<Vec<ScoredPoint>>;

    /// Raw telemetry document (JSON) from the store's telemetry endpoint.
    async fn telemetry(&self) -> anyhow::Result<serde_json::Value>;

    /// Prometheus exposition text from the store's metrics endpoint.
    async fn metrics_text(&self) -> anyhow::Result<String>;
}

/// Retrieve every record matching the filter, transparently paginating with
/// the store's opaque cursor until it signals no further page. Any page
/// failure aborts the whole scan - no partial results.
pub async fn scroll_all(
    store: &dyn VectorStore,
    filter: Option<&AgentFilter>,
) -> anyhow::Result<Vec<ScrollPoint>> {
    let mut all = Vec::new();
    let mut cursor: Option<ScrollCursor> = None;

    loop {
        let page = store.scroll(filter, SCROLL_PAGE_SIZE, cursor).await?;
        crate::metrics::SCROLL_PAGES_TOTAL.inc();
        all.extend(page.points);

        match page.next {
            Some(next) => cursor = Some(next),
            None => break,
        }
    }

    Ok(all)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agent_filter_covers_both_schemas() {
        let filter = agent_filter("clawd");
        assert_eq!(filter.should.len(), 2);
        assert_eq!(filter.should[0].key, "userId");
        assert_eq!(filter.should[1].key, "user_id");
        assert_eq!(filter.should[0].value.value, "clawd");

        let json = serde_json::to_value(&filter).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "should": [
                    { "key": "userId", "match": { "value": "clawd" } },
                    { "key": "user_id", "match": { "value": "clawd" } },
                ]
            })
        );
    }
}

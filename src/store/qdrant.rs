//! Qdrant REST client
//!
//! Thin wrapper over the HTTP API: scroll, count, search, collection info,
//! plus the telemetry and metrics feeds consumed by the health, storage and
//! performance endpoints. The shared `reqwest::Client` pools connections and
//! carries the configured upstream timeout; safe for concurrent read use.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

use super::{
    AgentFilter, CollectionInfo, ScoredPoint, ScrollCursor, ScrollPage, ScrollPoint, VectorStore,
};
use crate::config::DashboardConfig;
use crate::memory::RawPayload;
use crate::metrics::{UPSTREAM_REQUESTS_TOTAL, UPSTREAM_REQUEST_DURATION};

/// Qdrant point ids are either UUIDs (strings) or unsigned integers
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum PointId {
    Text(String),
    Number(u64),
}

impl PointId {
    fn into_string(self) -> String {
        match self {
            PointId::Text(s) => s,
            PointId::Number(n) => n.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    result: T,
}

#[derive(Debug, Deserialize)]
struct RawScrollPoint {
    id: PointId,
    #[serde(default)]
    payload: RawPayload,
}

#[derive(Debug, Deserialize)]
struct ScrollResult {
    #[serde(default)]
    points: Vec<RawScrollPoint>,
    #[serde(default)]
    next_page_offset: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct CountResult {
    count: u64,
}

#[derive(Debug, Deserialize)]
struct RawScoredPoint {
    id: PointId,
    #[serde(default)]
    payload: RawPayload,
    score: f32,
}

#[derive(Debug, Serialize)]
struct ScrollRequest<'a> {
    limit: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    offset: Option<ScrollCursor>,
    with_payload: bool,
    with_vector: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    filter: Option<&'a AgentFilter>,
}

#[derive(Debug, Serialize)]
struct CountRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    filter: Option<&'a AgentFilter>,
    exact: bool,
}

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    vector: Vec<f32>,
    limit: usize,
    with_payload: bool,
    score_threshold: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    filter: Option<&'a AgentFilter>,
}

/// Production [`VectorStore`] over the Qdrant REST API
pub struct QdrantStore {
    client: reqwest::Client,
    base_url: String,
    collection: String,
}

impl QdrantStore {
    pub fn new(config: &DashboardConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.upstream_timeout_secs))
            .build()
            .context("failed to build Qdrant HTTP client")?;

        Ok(Self {
            client,
            base_url: config.qdrant_url.clone(),
            collection: config.collection.clone(),
        })
    }

    /// Collection name this store reads from
    pub fn collection(&self) -> &str {
        &self.collection
    }

    async fn post_json<B: Serialize, T: for<'de> Deserialize<'de>>(
        &self,
        endpoint: &'static str,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let _timer = UPSTREAM_REQUEST_DURATION
            .with_label_values(&[endpoint])
            .start_timer();

        let url = format!("{}{}", self.base_url, path);
        let result = async {
            let response = self
                .client
                .post(&url)
                .json(body)
                .send()
                .await
                .with_context(|| format!("POST {url}"))?;
            let response = response
                .error_for_status()
                .with_context(|| format!("POST {url}"))?;
            let parsed: ApiResponse<T> = response
                .json()
                .await
                .with_context(|| format!("decoding response from {url}"))?;
            Ok(parsed.result)
        }
        .await;

        UPSTREAM_REQUESTS_TOTAL
            .with_label_values(&[endpoint, if result.is_ok() { "ok" } else { "error" }])
            .inc();
        result
    }

    async fn get_raw(&self, endpoint: &'static str, path: &str) -> Result<reqwest::Response> {
        let url = format!("{}{}", self.base_url, path);
        let result = async {
            let response = self
                .client
                .get(&url)
                .send()
                .await
                .with_context(|| format!("GET {url}"))?;
            response.error_for_status().with_context(|| format!("GET {url}"))
        }
        .await;

        UPSTREAM_REQUESTS_TOTAL
            .with_label_values(&[endpoint, if result.is_ok() { "ok" } else { "error" }])
            .inc();
        result
    }
}

#[async_trait]
impl VectorStore for QdrantStore {
    async fn scroll(
        &self,
        filter: Option<&AgentFilter>,
        limit: usize,
        cursor: Option<ScrollCursor>,
    ) -> Result<ScrollPage> {
        let request = ScrollRequest {
            limit,
            offset: cursor,
            with_payload: true,
            with_vector: false,
            filter,
        };

        let result: ScrollResult = self
            .post_json(
                "scroll",
                &format!("/collections/{}/points/scroll", self.collection),
                &request,
            )
            .await?;

        Ok(ScrollPage {
            points: result
                .points
                .into_iter()
                .map(|p| ScrollPoint {
                    id: p.id.into_string(),
                    payload: p.payload,
                })
                .collect(),
            next: result.next_page_offset.filter(|v| !v.is_null()),
        })
    }

    async fn count(&self, filter: Option<&AgentFilter>) -> Result<u64> {
        let request = CountRequest {
            filter,
            exact: true,
        };

        let result: CountResult = self
            .post_json(
                "count",
                &format!("/collections/{}/points/count", self.collection),
                &request,
            )
            .await?;

        Ok(result.count)
    }

    async fn collection_info(&self) -> Result<CollectionInfo> {
        let response = self
            .get_raw("collection", &format!("/collections/{}", self.collection))
            .await?;
        let body: Value = response
            .json()
            .await
            .context("decoding collection info")?;

        // The vectors config is either a single params object or a named
        // map; read loosely and fall back to unknown/zero.
        let result = &body["result"];
        let vectors = result.pointer("/config/params/vectors");

        Ok(CollectionInfo {
            status: result["status"].as_str().unwrap_or("unknown").to_string(),
            points_count: result["points_count"].as_u64().unwrap_or(0),
            vector_dimensions: vectors
                .and_then(|v| v["size"].as_u64())
                .unwrap_or(0),
            distance_metric: vectors
                .and_then(|v| v["distance"].as_str())
                .unwrap_or("unknown")
                .to_string(),
        })
    }

    async fn search(
        &self,
        vector: Vec<f32>,
        limit: usize,
        filter: Option<&AgentFilter>,
    ) -> Result<Vec<ScoredPoint>> {
        let request = SearchRequest {
            vector,
            limit,
            with_payload: true,
            score_threshold: 0.0,
            filter,
        };

        let result: Vec<RawScoredPoint> = self
            .post_json(
                "search",
                &format!("/collections/{}/points/search", self.collection),
                &request,
            )
            .await?;

        Ok(result
            .into_iter()
            .map(|p| ScoredPoint {
                id: p.id.into_string(),
                payload: p.payload,
                score: p.score,
            })
            .collect())
    }

    async fn telemetry(&self) -> Result<Value> {
        let response = self.get_raw("telemetry", "/telemetry").await?;
        response.json().await.context("decoding telemetry")
    }

    async fn metrics_text(&self) -> Result<String> {
        let response = self.get_raw("metrics", "/metrics").await?;
        response.text().await.context("reading metrics text")
    }
}

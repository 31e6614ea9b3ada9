//! Query embedding collaborator for the explore endpoint
//!
//! The only embedding this service ever computes is the user's search query;
//! stored memories already carry vectors. Behind a trait so handler tests can
//! run without network access.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::DashboardConfig;
use crate::metrics::EMBEDDING_REQUESTS_TOTAL;

const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Text-to-vector collaborator
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed one query string into a fixed-length vector.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Model identifier, surfaced in the settings endpoint.
    fn model(&self) -> &str;
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

/// OpenAI embeddings client
pub struct OpenAiEmbedder {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl OpenAiEmbedder {
    /// Build from configuration; returns `None` when no API key is set so
    /// the explore endpoint can surface a configuration error instead.
    pub fn from_config(config: &DashboardConfig) -> Result<Option<Self>> {
        let Some(api_key) = config.openai_api_key.clone() else {
            return Ok(None);
        };

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.upstream_timeout_secs))
            .build()
            .context("failed to build OpenAI HTTP client")?;

        Ok(Some(Self {
            client,
            api_key,
            model: config.embedding_model.clone(),
            base_url: OPENAI_BASE_URL.to_string(),
        }))
    }
}

#[async_trait]
impl Embedder for OpenAiEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let url = format!("{}/embeddings", self.base_url);
        let request = EmbeddingRequest {
            model: &self.model,
            input: text,
        };

        let result = async {
            let response = self
                .client
                .post(&url)
                .bearer_auth(&self.api_key)
                .json(&request)
                .send()
                .await
                .context("embedding request failed")?
                .error_for_status()
                .context("embedding request rejected")?;

            let parsed: EmbeddingResponse = response
                .json()
                .await
                .context("decoding embedding response")?;

            match parsed.data.into_iter().next() {
                Some(data) if !data.embedding.is_empty() => Ok(data.embedding),
                _ => bail!("embedding response contained no vector"),
            }
        }
        .await;

        EMBEDDING_REQUESTS_TOTAL
            .with_label_values(&[if result.is_ok() { "ok" } else { "error" }])
            .inc();
        result
    }

    fn model(&self) -> &str {
        &self.model
    }
}

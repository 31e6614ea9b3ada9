//! Shared application state
//!
//! One [`Dashboard`] instance lives behind an `Arc` for the whole process.
//! It owns the upstream collaborators and the in-process snapshot buffer;
//! everything else the service reports is recomputed per request.

use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::aggregate::snapshots::SnapshotBuffer;
use crate::config::DashboardConfig;
use crate::embeddings::Embedder;
use crate::store::VectorStore;

/// Application state type alias
pub type AppState = Arc<Dashboard>;

pub struct Dashboard {
    pub config: DashboardConfig,
    pub store: Arc<dyn VectorStore>,
    /// Absent when no OpenAI API key is configured; the explore endpoint
    /// reports the missing credential instead of failing at startup.
    pub embedder: Option<Arc<dyn Embedder>>,
    /// Search-counter snapshots recorded by the performance endpoint
    pub search_snapshots: SnapshotBuffer,
    pub started_at: DateTime<Utc>,
}

impl Dashboard {
    pub fn new(
        config: DashboardConfig,
        store: Arc<dyn VectorStore>,
        embedder: Option<Arc<dyn Embedder>>,
    ) -> Self {
        Self {
            config,
            store,
            embedder,
            search_snapshots: SnapshotBuffer::new(),
            started_at: Utc::now(),
        }
    }
}

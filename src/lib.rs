//! Memory Dashboard Library
//!
//! Read-only analytics service over a Qdrant collection of agent memories.
//! The collection is written by a separate multi-agent system; this service
//! never mutates it, it only scans, counts and searches.
//!
//! # Layout
//! - [`memory`] - dual-schema payload resolution and display labels
//! - [`store`] - the [`store::VectorStore`] trait and the Qdrant REST client
//! - [`aggregate`] - pure aggregation engines (growth, timeline, health,
//!   storage, listing, snapshots)
//! - [`telemetry`] - Qdrant telemetry and metrics-feed parsing
//! - [`handlers`] - the axum HTTP surface

pub mod aggregate;
pub mod config;
pub mod embeddings;
pub mod errors;
pub mod handlers;
pub mod memory;
pub mod metrics;
pub mod middleware;
pub mod store;
pub mod telemetry;

// Re-export dependencies to ensure tests use the same version
pub use chrono;
pub use serde_json;

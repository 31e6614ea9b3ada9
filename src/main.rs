//! Memory Dashboard - read-only analytics over the agent memory collection
//!
//! Standalone HTTP server: scans the Qdrant collection, aggregates it into
//! dashboard statistics, and proxies semantic search for the Query Explorer.

use anyhow::Result;
use std::sync::Arc;
use tokio::signal;
use tower::limit::ConcurrencyLimitLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use memory_dashboard::config::DashboardConfig;
use memory_dashboard::embeddings::{Embedder, OpenAiEmbedder};
use memory_dashboard::handlers::{build_router, Dashboard};
use memory_dashboard::metrics;
use memory_dashboard::middleware;
use memory_dashboard::store::QdrantStore;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    metrics::register_metrics().expect("Failed to register metrics");
    info!("📊 Metrics registered at /metrics");

    info!("🧠 Starting memory dashboard...");

    // Load configuration from environment
    let config = DashboardConfig::from_env();
    config.log();

    let store = Arc::new(QdrantStore::new(&config)?);

    let embedder: Option<Arc<dyn Embedder>> = OpenAiEmbedder::from_config(&config)?
        .map(|e| Arc::new(e) as Arc<dyn Embedder>);

    let cors = config.cors.to_layer();
    let max_concurrent = config.max_concurrent_requests;
    let addr = format!("{}:{}", config.host, config.port);

    let state = Arc::new(Dashboard::new(config, store, embedder));

    let app = build_router(state)
        .layer(axum::middleware::from_fn(middleware::track_metrics))
        .layer(ConcurrencyLimitLayer::new(max_concurrent))
        .layer(cors);

    info!("🚀 Dashboard listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("🔒 Shutdown signal received, exiting");
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

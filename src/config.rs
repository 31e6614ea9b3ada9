//! Configuration management for the memory dashboard
//!
//! All configurable parameters in one place with environment variable
//! overrides. Sensible defaults, configurable in production.

use std::env;
use tracing::info;

/// CORS configuration
#[derive(Debug, Clone)]
pub struct CorsConfig {
    /// Allowed origins (empty = allow all)
    pub allowed_origins: Vec<String>,
    /// Max age for preflight cache (seconds)
    pub max_age_seconds: u64,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: Vec::new(), // Empty = allow all origins
            max_age_seconds: 86400,
        }
    }
}

impl CorsConfig {
    /// Load from environment variables with production safety checks
    pub fn from_env(is_production: bool) -> Self {
        let mut config = Self::default();

        if let Ok(origins) = env::var("DASHBOARD_CORS_ORIGINS") {
            config.allowed_origins = origins
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        if let Ok(val) = env::var("DASHBOARD_CORS_MAX_AGE") {
            if let Ok(n) = val.parse() {
                config.max_age_seconds = n;
            }
        }

        if is_production && config.allowed_origins.is_empty() {
            tracing::warn!(
                "⚠️  PRODUCTION WARNING: CORS allows all origins. Set DASHBOARD_CORS_ORIGINS for security."
            );
        }

        config
    }

    /// Check if any origin restrictions are configured
    pub fn is_restricted(&self) -> bool {
        !self.allowed_origins.is_empty()
    }

    /// Convert to tower-http CorsLayer
    pub fn to_layer(&self) -> tower_http::cors::CorsLayer {
        use tower_http::cors::{AllowOrigin, Any, CorsLayer};

        let mut layer = CorsLayer::new()
            .allow_methods(Any)
            .allow_headers(Any)
            .max_age(std::time::Duration::from_secs(self.max_age_seconds));

        if self.allowed_origins.is_empty() {
            // Intentionally permissive - no origins configured
            layer = layer.allow_origin(Any);
        } else {
            let mut valid_origins = Vec::new();

            for origin_str in &self.allowed_origins {
                match origin_str.parse::<axum::http::HeaderValue>() {
                    Ok(origin) => valid_origins.push(origin),
                    Err(_) => tracing::warn!("CORS: Invalid origin '{}' - skipping", origin_str),
                }
            }

            if valid_origins.is_empty() {
                // All configured origins failed to parse - deny all rather
                // than falling back to permissive
                tracing::error!(
                    "CORS: All {} configured origin(s) failed to parse. \
                     Rejecting all cross-origin requests. Fix DASHBOARD_CORS_ORIGINS.",
                    self.allowed_origins.len()
                );
                layer =
                    layer.allow_origin(AllowOrigin::list(Vec::<axum::http::HeaderValue>::new()));
            } else {
                layer = layer.allow_origin(AllowOrigin::list(valid_origins));
            }
        }

        layer
    }
}

/// Dashboard configuration loaded from environment with defaults
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    /// Server host address (default: 127.0.0.1)
    /// Set to 0.0.0.0 for Docker or network-accessible deployments
    pub host: String,

    /// Server port (default: 8765)
    pub port: u16,

    /// Qdrant base URL (default: http://localhost:6333)
    pub qdrant_url: String,

    /// Qdrant collection holding the agent memories
    pub collection: String,

    /// Explicit agent list from AGENTS (comma-separated). Empty means the
    /// directory is auto-discovered by scanning the collection.
    pub agents: Vec<String>,

    /// OpenAI API key for the Query Explorer (optional; explore returns a
    /// configuration error without it)
    pub openai_api_key: Option<String>,

    /// Embedding model used by the explore endpoint
    pub embedding_model: String,

    /// Minimum similarity score surfaced in the settings endpoint
    pub min_score: f32,

    /// Frontend refresh interval in seconds (surfaced in settings)
    pub refresh_interval_s: u64,

    /// Default page size surfaced in settings
    pub page_size: usize,

    /// Maximum concurrent requests (default: 200)
    pub max_concurrent_requests: usize,

    /// Timeout for upstream Qdrant/OpenAI requests in seconds (default: 30)
    pub upstream_timeout_secs: u64,

    /// Whether running in production mode
    pub is_production: bool,

    /// CORS configuration
    pub cors: CorsConfig,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8765,
            qdrant_url: "http://localhost:6333".to_string(),
            collection: "openclaw-memories".to_string(),
            agents: Vec::new(),
            openai_api_key: None,
            embedding_model: "text-embedding-3-small".to_string(),
            min_score: 0.2,
            refresh_interval_s: 60,
            page_size: 50,
            max_concurrent_requests: 200,
            upstream_timeout_secs: 30,
            is_production: false,
            cors: CorsConfig::default(),
        }
    }
}

impl DashboardConfig {
    /// Load configuration from environment variables with defaults
    #[allow(clippy::field_reassign_with_default)] // Environment overrides require mutable config
    pub fn from_env() -> Self {
        let mut config = Self::default();

        config.is_production = env::var("DASHBOARD_ENV")
            .map(|v| {
                let v = v.to_lowercase();
                v == "production" || v == "prod"
            })
            .unwrap_or(false);

        if let Ok(val) = env::var("DASHBOARD_HOST") {
            config.host = val;
        }

        if let Ok(val) = env::var("DASHBOARD_PORT") {
            if let Ok(port) = val.parse() {
                config.port = port;
            }
        }

        if let Ok(val) = env::var("QDRANT_URL") {
            config.qdrant_url = val.trim_end_matches('/').to_string();
        }

        if let Ok(val) = env::var("QDRANT_COLLECTION") {
            config.collection = val;
        }

        // Explicit agent directory. Split on commas, trim, drop empty
        // entries, preserve the given order.
        if let Ok(val) = env::var("AGENTS") {
            config.agents = val
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        if let Ok(val) = env::var("OPENAI_API_KEY") {
            if !val.trim().is_empty() {
                config.openai_api_key = Some(val);
            }
        }

        if let Ok(val) = env::var("OPENAI_EMBEDDING_MODEL") {
            config.embedding_model = val;
        }

        if let Ok(val) = env::var("MIN_SCORE") {
            if let Ok(n) = val.parse() {
                config.min_score = n;
            }
        }

        if let Ok(val) = env::var("REFRESH_INTERVAL") {
            if let Ok(n) = val.parse() {
                config.refresh_interval_s = n;
            }
        }

        if let Ok(val) = env::var("PAGE_SIZE") {
            if let Ok(n) = val.parse() {
                config.page_size = n;
            }
        }

        if let Ok(val) = env::var("DASHBOARD_MAX_CONCURRENT") {
            if let Ok(n) = val.parse() {
                config.max_concurrent_requests = n;
            }
        }

        if let Ok(val) = env::var("DASHBOARD_UPSTREAM_TIMEOUT") {
            if let Ok(n) = val.parse() {
                config.upstream_timeout_secs = n;
            }
        }

        config.cors = CorsConfig::from_env(config.is_production);

        config
    }

    /// Log the current configuration
    pub fn log(&self) {
        info!("📋 Configuration:");
        info!(
            "   Mode: {}",
            if self.is_production {
                "PRODUCTION"
            } else {
                "Development"
            }
        );
        info!("   Listen: {}:{}", self.host, self.port);
        info!("   Qdrant: {} (collection: {})", self.qdrant_url, self.collection);
        if self.agents.is_empty() {
            info!("   Agents: auto-discovered from collection");
        } else {
            info!("   Agents: {:?}", self.agents);
        }
        info!(
            "   Query Explorer: {}",
            if self.openai_api_key.is_some() {
                "enabled"
            } else {
                "disabled (no OPENAI_API_KEY)"
            }
        );
        info!("   Embedding model: {}", self.embedding_model);
        info!("   Max concurrent: {}", self.max_concurrent_requests);
        info!("   Upstream timeout: {}s", self.upstream_timeout_secs);
        if self.cors.is_restricted() {
            info!("   CORS origins: {:?}", self.cors.allowed_origins);
        } else {
            info!("   CORS: Permissive (all origins allowed)");
        }
    }
}

/// Environment variable documentation
#[allow(unused)] // Public API - available for CLI help output
pub fn print_env_help() {
    println!("Memory Dashboard Configuration Environment Variables:");
    println!();
    println!("  DASHBOARD_ENV            - Set to 'production' or 'prod' for production mode");
    println!("  DASHBOARD_HOST           - Bind address (default: 127.0.0.1, use 0.0.0.0 for Docker)");
    println!("  DASHBOARD_PORT           - Server port (default: 8765)");
    println!("  DASHBOARD_MAX_CONCURRENT - Max concurrent requests (default: 200)");
    println!("  DASHBOARD_UPSTREAM_TIMEOUT - Upstream request timeout seconds (default: 30)");
    println!();
    println!("  QDRANT_URL               - Qdrant base URL (default: http://localhost:6333)");
    println!("  QDRANT_COLLECTION        - Collection name (default: openclaw-memories)");
    println!("  AGENTS                   - Comma-separated agent list (default: auto-discover)");
    println!();
    println!("  OPENAI_API_KEY           - Enables the Query Explorer endpoint");
    println!("  OPENAI_EMBEDDING_MODEL   - Embedding model (default: text-embedding-3-small)");
    println!("  MIN_SCORE                - Minimum similarity score (default: 0.2)");
    println!("  REFRESH_INTERVAL         - Frontend refresh interval seconds (default: 60)");
    println!("  PAGE_SIZE                - Default page size (default: 50)");
    println!();
    println!("  DASHBOARD_CORS_ORIGINS   - Comma-separated allowed origins (default: all)");
    println!("  DASHBOARD_CORS_MAX_AGE   - Preflight cache seconds (default: 86400)");
    println!();
    println!("  RUST_LOG                 - Log level (e.g., info, debug, trace)");
    println!();
}

//! HTTP API handlers - modular organization of the dashboard REST API
//!
//! Each submodule handles one domain of the read-only surface. Handlers own
//! all I/O (scans, telemetry fetches, embedding calls) and delegate the math
//! to the pure engines in [`crate::aggregate`].

// Core modules
pub mod router;
pub mod state;

// Health and infrastructure
pub mod health;

// Aggregation endpoints
pub mod activity;
pub mod memories;
pub mod stats;
pub mod storage;

// Search and configuration
pub mod explore;
pub mod settings;

// Re-export commonly used items
pub use router::build_router;
pub use state::{AppState, Dashboard};

//! Agent directory discovery
//!
//! The set of agents is either configured explicitly (AGENTS) or derived by
//! scanning the collection. A derived directory is sorted and never contains
//! the `"unknown"` sentinel; an explicit one is returned exactly as given.

use std::collections::BTreeSet;

use crate::memory::{resolve_agent, UNKNOWN_AGENT};
use crate::store::{ScrollCursor, VectorStore, SCROLL_PAGE_SIZE};

/// Hard cap on records examined during auto-discovery. The agent set is
/// assumed stable across the collection, so a bounded prefix is enough.
pub const DISCOVERY_SCAN_CAP: usize = 500;

/// Discover the agent directory.
///
/// With a non-empty explicit list the list is returned in its given order.
/// Otherwise a bounded scan resolves each record's agent, drops the
/// `"unknown"` sentinel and returns the distinct values sorted ascending.
/// Scan failures propagate; partial progress is discarded.
pub async fn discover_agents(
    store: &dyn VectorStore,
    explicit: &[String],
) -> anyhow::Result<Vec<String>> {
    if !explicit.is_empty() {
        return Ok(explicit.to_vec());
    }

    let mut agents = BTreeSet::new();
    let mut examined = 0usize;
    let mut cursor: Option<ScrollCursor> = None;

    loop {
        let page = store.scroll(None, SCROLL_PAGE_SIZE, cursor).await?;

        for point in &page.points {
            let agent = resolve_agent(&point.payload);
            if agent != UNKNOWN_AGENT {
                agents.insert(agent);
            }
        }
        examined += page.points.len();

        match page.next {
            Some(next) if examined < DISCOVERY_SCAN_CAP => cursor = Some(next),
            _ => break,
        }
    }

    Ok(agents.into_iter().collect())
}

//! In-process search-counter snapshots
//!
//! The performance endpoint records the upstream search-call total on every
//! request; the per-minute delta between consecutive snapshots gives a
//! search-rate series without any persistent state. The buffer is bounded
//! and deduplicates rapid polls that observed no new calls.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::VecDeque;

/// At one snapshot per refresh this covers roughly an hour of history
pub const MAX_SNAPSHOTS: usize = 60;
/// Two polls within this window showing the same total collapse into one
pub const DEDUP_WINDOW_MS: i64 = 5_000;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SearchSnapshot {
    pub time_ms: i64,
    pub total: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatePoint {
    pub time_ms: i64,
    /// Searches per minute since the previous snapshot, one decimal
    pub per_minute: f64,
}

#[derive(Debug, Default)]
pub struct SnapshotBuffer {
    inner: Mutex<VecDeque<SearchSnapshot>>,
}

impl SnapshotBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the current search total. Skipped when the newest snapshot has
    /// the same total and is younger than the dedup window.
    pub fn push(&self, total: u64, now: DateTime<Utc>) {
        let time_ms = now.timestamp_millis();
        let mut inner = self.inner.lock();

        if let Some(last) = inner.back() {
            if last.total == total && time_ms - last.time_ms < DEDUP_WINDOW_MS {
                return;
            }
        }

        inner.push_back(SearchSnapshot { time_ms, total });
        while inner.len() > MAX_SNAPSHOTS {
            inner.pop_front();
        }
    }

    pub fn snapshots(&self) -> Vec<SearchSnapshot> {
        self.inner.lock().iter().copied().collect()
    }

    /// Per-minute deltas between consecutive snapshots. A counter reset
    /// (upstream restart) clamps the delta to zero instead of going negative.
    pub fn rate_series(&self) -> Vec<RatePoint> {
        let snapshots = self.snapshots();
        snapshots
            .windows(2)
            .filter_map(|pair| {
                let elapsed_min = (pair[1].time_ms - pair[0].time_ms) as f64 / 60_000.0;
                if elapsed_min <= 0.0 {
                    return None;
                }
                let delta = pair[1].total.saturating_sub(pair[0].total) as f64;
                Some(RatePoint {
                    time_ms: pair[1].time_ms,
                    per_minute: (delta / elapsed_min * 10.0).round() / 10.0,
                })
            })
            .collect()
    }
}

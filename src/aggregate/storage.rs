//! Storage estimation and growth projection
//!
//! Qdrant does not expose per-collection disk usage, so disk is estimated
//! from the point count and a measured per-point average. Projections
//! extrapolate the last seven days of growth linearly.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::memory::{parse_timestamp, resolve_timestamp};
use crate::store::{CollectionInfo, ScrollPoint};

/// Measured average bytes per stored point: vector + payload + index overhead
pub const BYTES_PER_POINT_AVG: u64 = 18_500;

#[derive(Debug, Clone, Serialize)]
pub struct DiskStats {
    pub estimated_mb: f64,
    pub points_count: u64,
    pub bytes_per_point_avg: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RamStats {
    /// Resident set size of the Qdrant process, zero when the metrics feed
    /// is unavailable
    pub qdrant_rss_mb: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct GrowthProjection {
    pub last_7d_memories: u64,
    pub avg_per_day: f64,
    pub estimated_mb_per_day: f64,
    pub projected_mb_30d: f64,
    pub projected_mb_365d: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CollectionStats {
    pub name: String,
    pub vector_dimensions: u64,
    pub distance_metric: String,
    pub status: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct StorageStats {
    pub disk: DiskStats,
    pub ram: RamStats,
    pub growth: GrowthProjection,
    pub collection: CollectionStats,
}

/// Count records whose parsed timestamp falls within the last seven days.
pub fn count_last_7d(points: &[ScrollPoint], now: DateTime<Utc>) -> u64 {
    let cutoff = now - Duration::days(7);
    points
        .iter()
        .filter_map(|p| resolve_timestamp(&p.payload))
        .filter_map(|ts| parse_timestamp(&ts))
        .filter(|instant| *instant >= cutoff)
        .count() as u64
}

/// Assemble the storage report from the collection metadata, the scan and
/// the Qdrant RSS reading.
pub fn compute_storage(
    collection_name: &str,
    info: &CollectionInfo,
    points: &[ScrollPoint],
    rss_mb: f64,
    now: DateTime<Utc>,
) -> StorageStats {
    let points_count = info.points_count;
    let estimated_mb = mb(points_count * BYTES_PER_POINT_AVG);

    let last_7d = count_last_7d(points, now);
    let avg_per_day = round1(last_7d as f64 / 7.0);
    let mb_per_day = round2(avg_per_day * BYTES_PER_POINT_AVG as f64 / (1024.0 * 1024.0));

    StorageStats {
        disk: DiskStats {
            estimated_mb,
            points_count,
            bytes_per_point_avg: BYTES_PER_POINT_AVG,
        },
        ram: RamStats { qdrant_rss_mb: rss_mb },
        growth: GrowthProjection {
            last_7d_memories: last_7d,
            avg_per_day,
            estimated_mb_per_day: mb_per_day,
            projected_mb_30d: round1(estimated_mb + mb_per_day * 30.0),
            projected_mb_365d: round1(estimated_mb + mb_per_day * 365.0),
        },
        collection: CollectionStats {
            name: collection_name.to_string(),
            vector_dimensions: info.vector_dimensions,
            distance_metric: info.distance_metric.clone(),
            status: info.status.clone(),
        },
    }
}

fn mb(bytes: u64) -> f64 {
    round1(bytes as f64 / (1024.0 * 1024.0))
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

//! Memory-health aggregation: dedup effectiveness, velocity, batches, sources
//!
//! Combines the scanned records with the upstream write counter to report how
//! much the content-hash dedup is saving, how fast memories are arriving, and
//! which runs the memories came from.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::HashMap;

use crate::memory::{format_run_label, parse_timestamp, resolve_run_id, resolve_timestamp, NO_RUN_LABEL};
use crate::store::ScrollPoint;

/// Top-source table is truncated to this many rows
pub const TOP_SOURCES_MAX: usize = 8;

#[derive(Debug, Clone, Serialize)]
pub struct Deduplication {
    pub attempted_writes: u64,
    pub stored_memories: u64,
    /// Fraction of attempted writes that were deduplicated, 0 when no writes
    pub dedup_rate: f64,
    /// attempted - stored; negative when the write counter lags the store
    pub saved_embeddings: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    Stable,
}

#[derive(Debug, Clone, Serialize)]
pub struct Velocity {
    pub today: u64,
    pub yesterday: u64,
    pub last_7d: u64,
    pub trend: Trend,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchSize {
    pub avg_facts_per_batch: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopSource {
    /// Raw run identifier, `"null"` for records without one
    pub run_id: String,
    pub label: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DensityBucket {
    pub agent: String,
    pub count: u64,
    pub avg_chars: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MemoryHealth {
    pub deduplication: Deduplication,
    pub velocity: Velocity,
    pub batch_size: BatchSize,
    pub top_sources: Vec<TopSource>,
    pub memory_density: Vec<DensityBucket>,
}

/// Fold scanned records and the upstream write counter into the health report.
pub fn compute_health(
    points: &[ScrollPoint],
    attempted_writes: u64,
    stored_memories: u64,
    now: DateTime<Utc>,
) -> MemoryHealth {
    MemoryHealth {
        deduplication: compute_dedup(attempted_writes, stored_memories),
        velocity: compute_velocity(points, now),
        batch_size: compute_batch_size(points, stored_memories),
        top_sources: compute_top_sources(points),
        memory_density: compute_density(points),
    }
}

fn compute_dedup(attempted_writes: u64, stored_memories: u64) -> Deduplication {
    let dedup_rate = if attempted_writes == 0 {
        0.0
    } else {
        1.0 - stored_memories as f64 / attempted_writes as f64
    };
    Deduplication {
        attempted_writes,
        stored_memories,
        dedup_rate,
        saved_embeddings: attempted_writes as i64 - stored_memories as i64,
    }
}

fn compute_velocity(points: &[ScrollPoint], now: DateTime<Utc>) -> Velocity {
    let today_str = now.format("%Y-%m-%d").to_string();
    let yesterday_str = (now - Duration::hours(24)).format("%Y-%m-%d").to_string();
    let week_cutoff = now - Duration::days(7);

    let mut today = 0u64;
    let mut yesterday = 0u64;
    let mut last_7d = 0u64;

    for point in points {
        let Some(instant) = instant_of(point) else {
            continue;
        };
        let date_str = instant.format("%Y-%m-%d").to_string();
        if date_str == today_str {
            today += 1;
        } else if date_str == yesterday_str {
            yesterday += 1;
        }
        // Whole-day buckets: a day counts when its UTC midnight is inside
        // the window, so partial first days are excluded entirely.
        let midnight = instant.date_naive().and_hms_opt(0, 0, 0);
        if matches!(midnight, Some(m) if m.and_utc() >= week_cutoff) {
            last_7d += 1;
        }
    }

    let trend = if today > yesterday {
        Trend::Up
    } else if today < yesterday {
        Trend::Down
    } else {
        Trend::Stable
    };

    Velocity {
        today,
        yesterday,
        last_7d,
        trend,
    }
}

fn compute_batch_size(points: &[ScrollPoint], stored_memories: u64) -> BatchSize {
    // A batch is approximated by a distinct second in the raw timestamps.
    let mut seconds = std::collections::HashSet::new();
    for point in points {
        if let Some(ts) = resolve_timestamp(&point.payload) {
            seconds.insert(ts.get(0..19).unwrap_or(&ts).to_string());
        }
    }

    let avg = if seconds.is_empty() {
        0
    } else {
        (stored_memories as f64 / seconds.len() as f64).round() as u64
    };
    BatchSize {
        avg_facts_per_batch: avg,
    }
}

fn compute_top_sources(points: &[ScrollPoint]) -> Vec<TopSource> {
    let mut by_run: HashMap<Option<String>, u64> = HashMap::new();
    for point in points {
        *by_run.entry(resolve_run_id(&point.payload)).or_insert(0) += 1;
    }

    let mut sources: Vec<TopSource> = by_run
        .into_iter()
        .map(|(run_id, count)| {
            let label = match format_run_label(run_id.as_deref()) {
                label if label == NO_RUN_LABEL && run_id.is_none() => "seed/unknown".to_string(),
                label => label,
            };
            TopSource {
                run_id: run_id.unwrap_or_else(|| "null".to_string()),
                label,
                count,
            }
        })
        .collect();

    // Ties break on run_id so the table is stable across scans
    sources.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.run_id.cmp(&b.run_id)));
    sources.truncate(TOP_SOURCES_MAX);
    sources
}

fn compute_density(points: &[ScrollPoint]) -> Vec<DensityBucket> {
    let mut per_agent: HashMap<String, (u64, u64)> = HashMap::new();
    for point in points {
        let entry = per_agent
            .entry(crate::memory::resolve_agent(&point.payload))
            .or_insert((0, 0));
        entry.0 += 1;
        entry.1 += point.payload.data.chars().count() as u64;
    }

    let mut buckets: Vec<DensityBucket> = per_agent
        .into_iter()
        .map(|(agent, (count, chars))| DensityBucket {
            agent,
            count,
            avg_chars: (chars as f64 / count as f64).round() as u64,
        })
        .collect();

    buckets.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.agent.cmp(&b.agent)));
    buckets
}

fn instant_of(point: &ScrollPoint) -> Option<DateTime<Utc>> {
    resolve_timestamp(&point.payload).and_then(|ts| parse_timestamp(&ts))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::RawPayload;
    use chrono::TimeZone;

    fn point(agent: &str, ts: &str, run_id: Option<&str>, data: &str) -> ScrollPoint {
        ScrollPoint {
            id: format!("{agent}-{ts}"),
            payload: RawPayload {
                agent: Some(agent.to_string()),
                created_at: Some(ts.to_string()),
                run_id: run_id.map(str::to_string),
                data: data.to_string(),
                hash: "h".to_string(),
                ..Default::default()
            },
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, 22, 15, 0, 0).unwrap()
    }

    #[test]
    fn test_dedup_rate_and_savings() {
        let d = compute_dedup(2488, 1120);
        assert!((d.dedup_rate - 0.5498).abs() < 0.0001);
        assert_eq!(d.saved_embeddings, 1368);
    }

    #[test]
    fn test_dedup_rate_is_zero_without_writes() {
        let d = compute_dedup(0, 500);
        assert_eq!(d.dedup_rate, 0.0);
        assert_eq!(d.saved_embeddings, -500);
    }

    #[test]
    fn test_velocity_buckets_and_trend() {
        let points = vec![
            point("a", "2026-02-22T10:00:00Z", None, "x"),
            point("a", "2026-02-22T11:00:00Z", None, "x"),
            point("a", "2026-02-21T20:00:00Z", None, "x"),
            point("a", "2026-02-17T01:00:00Z", None, "x"),
            point("a", "2026-02-01T01:00:00Z", None, "x"), // outside 7d
        ];
        let v = compute_velocity(&points, now());
        assert_eq!(v.today, 2);
        assert_eq!(v.yesterday, 1);
        assert_eq!(v.last_7d, 4);
        assert_eq!(v.trend, Trend::Up);
    }

    #[test]
    fn test_velocity_trend_stable_on_tie() {
        let points = vec![
            point("a", "2026-02-22T10:00:00Z", None, "x"),
            point("a", "2026-02-21T10:00:00Z", None, "x"),
        ];
        assert_eq!(compute_velocity(&points, now()).trend, Trend::Stable);
    }

    #[test]
    fn test_batch_size_uses_distinct_seconds() {
        // Two records in the same second and one in another: two batches
        let points = vec![
            point("a", "2026-02-22T10:00:00.100Z", None, "x"),
            point("a", "2026-02-22T10:00:00.900Z", None, "x"),
            point("a", "2026-02-22T10:00:05Z", None, "x"),
        ];
        let b = compute_batch_size(&points, 10);
        assert_eq!(b.avg_facts_per_batch, 5);
    }

    #[test]
    fn test_batch_size_zero_without_timestamps() {
        assert_eq!(compute_batch_size(&[], 100).avg_facts_per_batch, 0);
    }

    #[test]
    fn test_top_sources_labels_and_order() {
        let mut points = Vec::new();
        for _ in 0..3 {
            points.push(point(
                "a",
                "2026-02-22T10:00:00Z",
                Some("agent:main:cron:daily"),
                "x",
            ));
        }
        for _ in 0..2 {
            points.push(point("a", "2026-02-22T10:00:00Z", None, "x"));
        }
        points.push(point(
            "a",
            "2026-02-22T10:00:00Z",
            Some("agent:main:discord:channel:118929"),
            "x",
        ));

        let sources = compute_top_sources(&points);
        assert_eq!(sources.len(), 3);
        assert_eq!(sources[0].run_id, "agent:main:cron:daily");
        assert_eq!(sources[0].label, "cron");
        assert_eq!(sources[0].count, 3);
        assert_eq!(sources[1].run_id, "null");
        assert_eq!(sources[1].label, "seed/unknown");
        assert_eq!(sources[2].label, "discord #8929");
    }

    #[test]
    fn test_top_sources_truncates_to_eight() {
        let mut points = Vec::new();
        for i in 0..12 {
            points.push(point("a", "2026-02-22T10:00:00Z", Some(&format!("run-{i}")), "x"));
        }
        assert_eq!(compute_top_sources(&points).len(), TOP_SOURCES_MAX);
    }

    #[test]
    fn test_density_averages_chars_per_agent() {
        let points = vec![
            point("clawd", "2026-02-22T10:00:00Z", None, "abcd"),
            point("clawd", "2026-02-22T10:00:00Z", None, "ab"),
            point("ana", "2026-02-22T10:00:00Z", None, "héllo"),
        ];
        let density = compute_density(&points);
        assert_eq!(
            density[0],
            DensityBucket {
                agent: "clawd".to_string(),
                count: 2,
                avg_chars: 3,
            }
        );
        // chars, not bytes
        assert_eq!(density[1].avg_chars, 5);
    }
}

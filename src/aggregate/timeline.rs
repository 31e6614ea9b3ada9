//! Timeline aggregation: hour or day buckets over a sliding window
//!
//! Buckets are keyed by fixed-width, zero-padded UTC strings so plain string
//! order is chronological order. Only buckets with at least one record are
//! emitted. A record exactly at the cutoff boundary is excluded; strictly
//! newer records are kept.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::memory::{parse_timestamp, resolve_agent, resolve_timestamp};
use crate::store::ScrollPoint;

pub const MIN_TIMELINE_HOURS: i64 = 1;
pub const MAX_TIMELINE_HOURS: i64 = 168;
pub const DEFAULT_TIMELINE_HOURS: i64 = 168;

/// Widest window still bucketed by hour when granularity is auto-selected
const HOURLY_WINDOW_MAX: i64 = 48;

/// Clamp a requested window to `[1, 168]` with the given default
pub fn clamp_hours(hours: Option<i64>, default: i64) -> i64 {
    hours
        .unwrap_or(default)
        .clamp(MIN_TIMELINE_HOURS, MAX_TIMELINE_HOURS)
}

/// Bucket granularity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Hour,
    Day,
}

/// Auto-select granularity from the window size
pub fn auto_granularity(hours: i64) -> Granularity {
    if hours <= HOURLY_WINDOW_MAX {
        Granularity::Hour
    } else {
        Granularity::Day
    }
}

/// One time bucket: total plus per-agent counts flattened alongside it
#[derive(Debug, Clone, Serialize)]
pub struct TimelineBucket {
    pub time: String,
    pub total: u64,
    #[serde(flatten)]
    pub agents: BTreeMap<String, u64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TimelineResponse {
    pub hours: i64,
    pub granularity: Granularity,
    pub buckets: Vec<TimelineBucket>,
}

/// Fold scanned records into time buckets.
pub fn compute_timeline(
    points: &[ScrollPoint],
    hours: i64,
    granularity: Granularity,
    now: DateTime<Utc>,
) -> TimelineResponse {
    let cutoff = now - Duration::hours(hours);

    let mut buckets: BTreeMap<String, TimelineBucket> = BTreeMap::new();

    for point in points {
        let Some(ts) = resolve_timestamp(&point.payload) else {
            continue;
        };
        let Some(instant) = parse_timestamp(&ts) else {
            continue;
        };
        if instant <= cutoff {
            continue; // boundary records are excluded
        }

        let key = match granularity {
            Granularity::Hour => instant.format("%Y-%m-%dT%H:00").to_string(),
            Granularity::Day => instant.format("%Y-%m-%d").to_string(),
        };

        let bucket = buckets.entry(key.clone()).or_insert_with(|| TimelineBucket {
            time: key,
            total: 0,
            agents: BTreeMap::new(),
        });
        bucket.total += 1;
        *bucket
            .agents
            .entry(resolve_agent(&point.payload))
            .or_insert(0) += 1;
    }

    TimelineResponse {
        hours,
        granularity,
        buckets: buckets.into_values().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::RawPayload;
    use chrono::TimeZone;

    fn point(agent: &str, ts: &str) -> ScrollPoint {
        ScrollPoint {
            id: ts.to_string(),
            payload: RawPayload {
                agent: Some(agent.to_string()),
                created_at: Some(ts.to_string()),
                data: "d".to_string(),
                hash: "h".to_string(),
                ..Default::default()
            },
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, 22, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_exact_boundary_record_is_excluded() {
        let points = vec![
            point("clawd", "2026-02-21T12:00:00Z"), // exactly 24h ago: out
            point("clawd", "2026-02-21T12:00:01Z"), // strictly after: in
        ];
        let response = compute_timeline(&points, 24, Granularity::Hour, now());
        assert_eq!(response.buckets.len(), 1);
        assert_eq!(response.buckets[0].time, "2026-02-21T12:00");
        assert_eq!(response.buckets[0].total, 1);
    }

    #[test]
    fn test_hour_keys_are_zero_padded_and_sorted() {
        let points = vec![
            point("clawd", "2026-02-22T09:15:00Z"),
            point("ana", "2026-02-22T03:05:00Z"),
            point("clawd", "2026-02-22T09:45:00Z"),
        ];
        let response = compute_timeline(&points, 24, Granularity::Hour, now());

        let keys: Vec<&str> = response.buckets.iter().map(|b| b.time.as_str()).collect();
        assert_eq!(keys, vec!["2026-02-22T03:00", "2026-02-22T09:00"]);

        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted); // chronological == lexicographic

        assert_eq!(response.buckets[1].total, 2);
        assert_eq!(response.buckets[1].agents["clawd"], 2);
    }

    #[test]
    fn test_day_granularity_buckets() {
        let points = vec![
            point("clawd", "2026-02-18T09:00:00Z"),
            point("ana", "2026-02-18T19:00:00Z"),
            point("ana", "2026-02-21T01:00:00Z"),
        ];
        let response = compute_timeline(&points, 168, Granularity::Day, now());

        assert_eq!(response.buckets.len(), 2);
        assert_eq!(response.buckets[0].time, "2026-02-18");
        assert_eq!(response.buckets[0].total, 2);
        assert_eq!(response.buckets[0].agents["ana"], 1);
        assert_eq!(response.buckets[0].agents["clawd"], 1);
    }

    #[test]
    fn test_offset_timestamps_bucket_in_utc() {
        // 23:30 at -08:00 is 07:30 UTC the next day
        let points = vec![point("clawd", "2026-02-21T23:30:00-08:00")];
        let response = compute_timeline(&points, 24, Granularity::Hour, now());
        assert_eq!(response.buckets[0].time, "2026-02-22T07:00");
    }

    #[test]
    fn test_null_and_unparseable_timestamps_are_dropped() {
        let mut no_ts = point("clawd", "unused");
        no_ts.payload.created_at = None;
        let garbage = point("clawd", "not-a-date");

        let response = compute_timeline(&[no_ts, garbage], 24, Granularity::Hour, now());
        assert!(response.buckets.is_empty());
    }

    #[test]
    fn test_granularity_selection_and_clamping() {
        assert_eq!(auto_granularity(48), Granularity::Hour);
        assert_eq!(auto_granularity(49), Granularity::Day);
        assert_eq!(clamp_hours(None, DEFAULT_TIMELINE_HOURS), 168);
        assert_eq!(clamp_hours(Some(500), DEFAULT_TIMELINE_HOURS), 168);
        assert_eq!(clamp_hours(Some(0), DEFAULT_TIMELINE_HOURS), 1);
    }
}

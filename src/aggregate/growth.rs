//! Growth aggregation: cumulative and daily counts over a calendar window
//!
//! The series covers every calendar day in `[today - days, today]` inclusive,
//! zero-activity days included. Records dated before the window contribute to
//! the initial cumulative only; records without timestamps are skipped
//! entirely. Day attribution uses the first ten characters of the raw
//! timestamp string, matching how the memories were bucketed historically.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use crate::memory::{resolve_agent, resolve_timestamp};
use crate::store::ScrollPoint;

/// Window bounds for the `days` parameter
pub const MIN_GROWTH_DAYS: i64 = 1;
pub const MAX_GROWTH_DAYS: i64 = 365;
pub const DEFAULT_GROWTH_DAYS: i64 = 30;

/// Clamp the requested window to `[1, 365]`, defaulting to 30
pub fn clamp_days(days: Option<i64>) -> i64 {
    days.unwrap_or(DEFAULT_GROWTH_DAYS)
        .clamp(MIN_GROWTH_DAYS, MAX_GROWTH_DAYS)
}

/// One day of the growth series
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GrowthPoint {
    pub date: String,
    pub added: u64,
    pub cumulative: u64,
}

/// One day of an agent's sparse breakdown
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentGrowthPoint {
    pub date: String,
    pub added: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct GrowthResponse {
    pub points: Vec<GrowthPoint>,
    /// Sparse per-agent series: only dates with activity appear
    pub agents: BTreeMap<String, Vec<AgentGrowthPoint>>,
}

/// Fold scanned records into the growth series.
pub fn compute_growth(points: &[ScrollPoint], days: i64, now: DateTime<Utc>) -> GrowthResponse {
    let today = now.date_naive();
    let start = today - Duration::days(days);

    // Every calendar day in the window defines an output point
    let mut date_list = Vec::with_capacity(days as usize + 1);
    let mut cursor = start;
    while cursor <= today {
        date_list.push(cursor.format("%Y-%m-%d").to_string());
        cursor += Duration::days(1);
    }
    let start_str = &date_list[0];

    let mut daily: HashMap<String, u64> = HashMap::new();
    let mut agent_daily: HashMap<String, BTreeMap<String, u64>> = HashMap::new();
    let mut pre_window: u64 = 0;

    for point in points {
        let Some(ts) = resolve_timestamp(&point.payload) else {
            continue; // no timestamp: counts nowhere
        };
        let date_str = ts.get(0..10).unwrap_or(&ts).to_string();

        if date_str < *start_str {
            // Before the window: contributes to the initial cumulative only
            pre_window += 1;
            continue;
        }

        *daily.entry(date_str.clone()).or_insert(0) += 1;
        *agent_daily
            .entry(resolve_agent(&point.payload))
            .or_default()
            .entry(date_str)
            .or_insert(0) += 1;
    }

    let mut cumulative = pre_window;
    let series = date_list
        .into_iter()
        .map(|date| {
            let added = daily.get(&date).copied().unwrap_or(0);
            cumulative += added;
            GrowthPoint {
                date,
                added,
                cumulative,
            }
        })
        .collect();

    let agents = agent_daily
        .into_iter()
        .map(|(agent, dates)| {
            let series = dates
                .into_iter()
                .map(|(date, added)| AgentGrowthPoint { date, added })
                .collect();
            (agent, series)
        })
        .collect();

    GrowthResponse {
        points: series,
        agents,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::RawPayload;
    use chrono::TimeZone;

    fn point(agent: &str, ts: &str) -> ScrollPoint {
        ScrollPoint {
            id: format!("{agent}-{ts}"),
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
        Utc.with_ymd_and_hms(2026, 2, 22, 15, 30, 0).unwrap()
    }

    #[test]
    fn test_series_length_is_inclusive() {
        let response = compute_growth(&[], 7, now());
        assert_eq!(response.points.len(), 8);
        assert_eq!(response.points[0].date, "2026-02-15");
        assert_eq!(response.points[7].date, "2026-02-22");
    }

    #[test]
    fn test_empty_store_yields_all_zero_series() {
        let response = compute_growth(&[], 30, now());
        assert_eq!(response.points.len(), 31);
        assert!(response.points.iter().all(|p| p.added == 0 && p.cumulative == 0));
        assert!(response.agents.is_empty());
    }

    #[test]
    fn test_pre_window_record_carries_into_initial_cumulative() {
        // Jan 15 is pre-window; Feb 19..22 are one each
        let points = vec![
            point("clawd", "2026-01-15T09:00:00Z"),
            point("clawd", "2026-02-19T09:00:00Z"),
            point("ana", "2026-02-20T09:00:00Z"),
            point("clawd", "2026-02-21T09:00:00Z"),
            point("ana", "2026-02-22T09:00:00Z"),
        ];
        let response = compute_growth(&points, 7, now());

        let first = &response.points[0];
        assert_eq!(first.date, "2026-02-15");
        assert_eq!(first.added, 0);
        assert_eq!(first.cumulative, 1);

        let last = response.points.last().unwrap();
        assert_eq!(last.date, "2026-02-22");
        assert_eq!(last.added, 1);
        assert_eq!(last.cumulative, 5);
    }

    #[test]
    fn test_cumulative_is_monotone() {
        let points = vec![
            point("clawd", "2026-02-16T01:00:00Z"),
            point("clawd", "2026-02-16T02:00:00Z"),
            point("clawd", "2026-02-20T03:00:00Z"),
        ];
        let response = compute_growth(&points, 7, now());
        let cumulatives: Vec<u64> = response.points.iter().map(|p| p.cumulative).collect();
        assert!(cumulatives.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(*cumulatives.last().unwrap(), 3);
    }

    #[test]
    fn test_missing_timestamp_is_skipped_entirely() {
        let mut no_ts = point("clawd", "unused");
        no_ts.payload.created_at = None;

        let response = compute_growth(&[no_ts], 7, now());
        assert!(response.points.iter().all(|p| p.cumulative == 0));
        assert!(response.agents.is_empty());
    }

    #[test]
    fn test_agent_breakdown_is_sparse_and_sorted() {
        let points = vec![
            point("clawd", "2026-02-20T09:00:00Z"),
            point("clawd", "2026-02-17T09:00:00Z"),
            point("clawd", "2026-02-20T10:00:00Z"),
        ];
        let response = compute_growth(&points, 7, now());

        let series = &response.agents["clawd"];
        assert_eq!(
            series,
            &vec![
                AgentGrowthPoint {
                    date: "2026-02-17".to_string(),
                    added: 1
                },
                AgentGrowthPoint {
                    date: "2026-02-20".to_string(),
                    added: 2
                },
            ]
        );
    }

    #[test]
    fn test_clamp_days() {
        assert_eq!(clamp_days(None), 30);
        assert_eq!(clamp_days(Some(0)), 1);
        assert_eq!(clamp_days(Some(-3)), 1);
        assert_eq!(clamp_days(Some(400)), 365);
        assert_eq!(clamp_days(Some(90)), 90);
    }
}

//! Qdrant telemetry and metrics-feed parsing
//!
//! Two upstream observability feeds back the performance, storage and health
//! endpoints: the `/telemetry` JSON document (request counters, app version,
//! startup time) and the `/metrics` Prometheus exposition text (resident
//! memory, vector totals). Specific series are extracted by exact key; the
//! rest of both documents is opaque.

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::OnceLock;

use crate::memory::parse_timestamp;

// Static regexes for metrics-line extraction (compiled once)
static RSS_REGEX: OnceLock<Regex> = OnceLock::new();
static VECTOR_TOTAL_REGEX: OnceLock<Regex> = OnceLock::new();
static COLLECTION_VECTORS_REGEX: OnceLock<Regex> = OnceLock::new();

fn rss_regex() -> &'static Regex {
    RSS_REGEX.get_or_init(|| {
        Regex::new(r"^process_resident_memory_bytes\s+(\d+(?:\.\d+)?)").unwrap()
    })
}

fn vector_total_regex() -> &'static Regex {
    VECTOR_TOTAL_REGEX.get_or_init(|| Regex::new(r"^collections_vector_total\s+(\d+)").unwrap())
}

fn collection_vectors_regex() -> &'static Regex {
    COLLECTION_VECTORS_REGEX
        .get_or_init(|| Regex::new(r#"^collection_vectors\{collection="([^"]+)"\}\s+(\d+)"#).unwrap())
}

/// Attempted PUT writes counter from the telemetry document. Missing or
/// malformed paths read as zero.
pub fn attempted_put_writes(telemetry: &Value) -> u64 {
    telemetry
        .pointer("/result/requests/rest/responses/PUT/200")
        .and_then(Value::as_u64)
        .unwrap_or(0)
}

/// Qdrant app version from telemetry, `"unknown"` when absent
pub fn app_version(telemetry: &Value) -> String {
    telemetry
        .pointer("/result/app/version")
        .and_then(Value::as_str)
        .unwrap_or("unknown")
        .to_string()
}

/// Qdrant startup timestamp from telemetry, if present
pub fn app_startup(telemetry: &Value) -> Option<String> {
    telemetry
        .pointer("/result/app/startup")
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// One status row of the telemetry REST response map
#[derive(Debug, Clone, Copy, Default)]
pub struct StatusEntry {
    pub count: u64,
    pub avg_duration_micros: f64,
}

/// Look up a `"METHOD path" -> status -> {count, avg_duration_micros}` entry
/// in the telemetry response map; absent entries read as zero.
pub fn response_entry(telemetry: &Value, path: &str, status: &str) -> StatusEntry {
    let Some(entry) = telemetry
        .pointer("/result/requests/rest/responses")
        .and_then(|r| r.get(path))
        .and_then(|r| r.get(status))
    else {
        return StatusEntry::default();
    };

    StatusEntry {
        count: entry["count"].as_u64().unwrap_or(0),
        avg_duration_micros: entry["avg_duration_micros"].as_f64().unwrap_or(0.0),
    }
}

/// Resident memory of the Qdrant process in MB, from the metrics feed.
/// Returns zero when the series is absent.
pub fn parse_rss_mb(metrics_text: &str) -> f64 {
    for line in metrics_text.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with('#') || trimmed.is_empty() {
            continue;
        }
        if let Some(caps) = rss_regex().captures(trimmed) {
            if let Ok(bytes) = caps[1].parse::<f64>() {
                return bytes / (1024.0 * 1024.0);
            }
        }
    }
    0.0
}

/// Vector totals extracted from the metrics feed
#[derive(Debug, Clone, Default, Serialize)]
pub struct VectorTotals {
    pub total: u64,
    pub per_collection: BTreeMap<String, u64>,
}

pub fn parse_vector_totals(metrics_text: &str) -> VectorTotals {
    let mut totals = VectorTotals::default();

    for line in metrics_text.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with('#') || trimmed.is_empty() {
            continue;
        }

        if let Some(caps) = vector_total_regex().captures(trimmed) {
            totals.total = caps[1].parse().unwrap_or(0);
            continue;
        }

        if let Some(caps) = collection_vectors_regex().captures(trimmed) {
            if let Ok(count) = caps[2].parse() {
                totals.per_collection.insert(caps[1].to_string(), count);
            }
        }
    }

    totals
}

/// Humanize an uptime span relative to `now`, e.g. "2 days, 5 hours".
/// Minutes are shown only for spans under a day.
pub fn format_uptime(startup: &str, now: DateTime<Utc>) -> String {
    let Some(start) = parse_timestamp(startup) else {
        return "just started".to_string();
    };

    let mut diff_ms = (now - start).num_milliseconds().max(0);

    let days = diff_ms / (24 * 60 * 60 * 1000);
    diff_ms -= days * 24 * 60 * 60 * 1000;
    let hours = diff_ms / (60 * 60 * 1000);
    diff_ms -= hours * 60 * 60 * 1000;
    let minutes = diff_ms / (60 * 1000);

    let mut parts = Vec::new();
    if days > 0 {
        parts.push(format!("{days} day{}", if days != 1 { "s" } else { "" }));
    }
    if hours > 0 {
        parts.push(format!("{hours} hour{}", if hours != 1 { "s" } else { "" }));
    }
    if minutes > 0 && days == 0 {
        parts.push(format!(
            "{minutes} minute{}",
            if minutes != 1 { "s" } else { "" }
        ));
    }

    if parts.is_empty() {
        "just started".to_string()
    } else {
        parts.join(", ")
    }
}

// Telemetry response-map keys for the endpoints we aggregate
const SEARCH_PATH: &str = "POST /collections/{name}/points/search";
const QUERY_PATH: &str = "POST /collections/{name}/points/query";
const WRITE_PATH: &str = "PUT /collections/{name}/points";
const DELETE_PATH: &str = "POST /collections/{name}/points/delete";
const PAYLOAD_PATH: &str = "POST /collections/{name}/points/payload";

#[derive(Debug, Clone, Serialize)]
pub struct QdrantInfo {
    pub version: String,
    pub uptime_since: String,
    pub uptime_human: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchStats {
    pub total_calls: u64,
    pub avg_latency_ms: u64,
    pub success_rate: f64,
    pub errors: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct WriteStats {
    pub total_calls: u64,
    pub avg_latency_ms: u64,
    pub deletes: u64,
    pub payload_updates: u64,
}

/// Upstream performance snapshot derived from telemetry plus the metrics feed
#[derive(Debug, Clone, Serialize)]
pub struct PerformanceStats {
    pub qdrant: QdrantInfo,
    pub search: SearchStats,
    pub writes: WriteStats,
    pub vectors: VectorTotals,
}

/// Fold the telemetry response map (and, when available, the metrics feed)
/// into the performance snapshot. A missing metrics feed yields zero vector
/// totals - the soft-degradation path.
pub fn compute_performance(
    telemetry: &Value,
    metrics_text: Option<&str>,
    now: DateTime<Utc>,
) -> PerformanceStats {
    let version = app_version(telemetry);
    let startup = app_startup(telemetry).unwrap_or_else(|| now.to_rfc3339());

    // Search: the search and query endpoints together, weighted by call count
    let search_200 = response_entry(telemetry, SEARCH_PATH, "200");
    let search_500 = response_entry(telemetry, SEARCH_PATH, "500");
    let query_200 = response_entry(telemetry, QUERY_PATH, "200");

    let search_success_total = search_200.count + query_200.count;
    let search_total_all = search_success_total + search_500.count;

    let avg_latency_ms = if search_success_total > 0 {
        let total_micros = search_200.count as f64 * search_200.avg_duration_micros
            + query_200.count as f64 * query_200.avg_duration_micros;
        (total_micros / search_success_total as f64 / 1000.0).round() as u64
    } else {
        0
    };

    let success_rate = if search_total_all > 0 {
        (search_success_total as f64 / search_total_all as f64 * 10_000.0).round() / 100.0
    } else {
        100.0
    };

    // Writes
    let write_200 = response_entry(telemetry, WRITE_PATH, "200");
    let delete_200 = response_entry(telemetry, DELETE_PATH, "200");
    let payload_200 = response_entry(telemetry, PAYLOAD_PATH, "200");

    let write_avg_latency_ms = if write_200.count > 0 {
        (write_200.avg_duration_micros / 1000.0).round() as u64
    } else {
        0
    };

    PerformanceStats {
        qdrant: QdrantInfo {
            uptime_human: format_uptime(&startup, now),
            uptime_since: startup,
            version,
        },
        search: SearchStats {
            total_calls: search_success_total,
            avg_latency_ms,
            success_rate,
            errors: search_500.count,
        },
        writes: WriteStats {
            total_calls: write_200.count,
            avg_latency_ms: write_avg_latency_ms,
            deletes: delete_200.count,
            payload_updates: payload_200.count,
        },
        vectors: metrics_text.map(parse_vector_totals).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn sample_telemetry() -> Value {
        json!({
            "result": {
                "app": {
                    "version": "1.12.4",
                    "startup": "2026-02-20T08:00:00Z"
                },
                "requests": {
                    "rest": {
                        "responses": {
                            "PUT /collections/{name}/points": {
                                "200": { "count": 2488, "avg_duration_micros": 1800.0 }
                            },
                            "POST /collections/{name}/points/search": {
                                "200": { "count": 90, "avg_duration_micros": 2000.0 },
                                "500": { "count": 10, "avg_duration_micros": 900.0 }
                            },
                            "POST /collections/{name}/points/query": {
                                "200": { "count": 10, "avg_duration_micros": 4000.0 }
                            },
                            "POST /collections/{name}/points/delete": {
                                "200": { "count": 3, "avg_duration_micros": 500.0 }
                            },
                            "PUT": { "200": 2488 }
                        }
                    }
                }
            }
        })
    }

    #[test]
    fn test_attempted_put_writes() {
        assert_eq!(attempted_put_writes(&sample_telemetry()), 2488);
        assert_eq!(attempted_put_writes(&json!({})), 0);
    }

    #[test]
    fn test_response_entry_missing_reads_zero() {
        let entry = response_entry(&sample_telemetry(), "GET /nope", "200");
        assert_eq!(entry.count, 0);
        assert_eq!(entry.avg_duration_micros, 0.0);
    }

    #[test]
    fn test_parse_rss_mb() {
        let text = "\
# HELP process_resident_memory_bytes Resident memory size in bytes.
# TYPE process_resident_memory_bytes gauge
process_resident_memory_bytes 104857600
";
        assert_eq!(parse_rss_mb(text), 100.0);
        assert_eq!(parse_rss_mb("unrelated_metric 5"), 0.0);
    }

    #[test]
    fn test_parse_vector_totals() {
        let text = "\
# comment
collections_vector_total 1500
collection_vectors{collection=\"openclaw-memories\"} 1120
collection_vectors{collection=\"other\"} 380
";
        let totals = parse_vector_totals(text);
        assert_eq!(totals.total, 1500);
        assert_eq!(totals.per_collection["openclaw-memories"], 1120);
        assert_eq!(totals.per_collection["other"], 380);
    }

    #[test]
    fn test_format_uptime() {
        let now = Utc.with_ymd_and_hms(2026, 2, 22, 10, 30, 0).unwrap();
        assert_eq!(format_uptime("2026-02-20T08:00:00Z", now), "2 days, 2 hours");
        assert_eq!(format_uptime("2026-02-22T10:25:00Z", now), "5 minutes");
        assert_eq!(format_uptime("2026-02-22T10:29:45Z", now), "just started");
        assert_eq!(format_uptime("garbage", now), "just started");
    }

    #[test]
    fn test_compute_performance_weighted_latency_and_rate() {
        let now = Utc.with_ymd_and_hms(2026, 2, 22, 10, 0, 0).unwrap();
        let stats = compute_performance(&sample_telemetry(), None, now);

        assert_eq!(stats.qdrant.version, "1.12.4");
        assert_eq!(stats.search.total_calls, 100);
        assert_eq!(stats.search.errors, 10);
        // (90*2000 + 10*4000) / 100 = 2200 micros -> 2 ms
        assert_eq!(stats.search.avg_latency_ms, 2);
        // 100 / 110 = 90.91%
        assert_eq!(stats.search.success_rate, 90.91);

        assert_eq!(stats.writes.total_calls, 2488);
        assert_eq!(stats.writes.avg_latency_ms, 2);
        assert_eq!(stats.writes.deletes, 3);
        assert_eq!(stats.writes.payload_updates, 0);

        // No metrics feed: vector totals degrade to zero
        assert_eq!(stats.vectors.total, 0);
        assert!(stats.vectors.per_collection.is_empty());
    }

    #[test]
    fn test_compute_performance_no_calls_reports_full_success() {
        let now = Utc.with_ymd_and_hms(2026, 2, 22, 10, 0, 0).unwrap();
        let stats = compute_performance(&json!({}), None, now);
        assert_eq!(stats.search.total_calls, 0);
        assert_eq!(stats.search.success_rate, 100.0);
        assert_eq!(stats.qdrant.version, "unknown");
    }
}

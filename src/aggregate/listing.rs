//! Memory listing: sorting, pagination and the recent window
//!
//! Records are ordered by their parsed timestamp instant, so payloads written
//! with mixed UTC offsets still interleave correctly. Records whose timestamp
//! does not parse fall back to raw string comparison and group before dated
//! records in ascending order.

use chrono::{DateTime, Duration, Utc};

use crate::memory::{parse_timestamp, Memory};

pub const DEFAULT_PAGE_LIMIT: usize = 50;
pub const MAX_PAGE_LIMIT: usize = 200;
/// The recent feed never returns more than this many records
pub const RECENT_MAX: usize = 50;
pub const DEFAULT_RECENT_HOURS: i64 = 24;

/// Clamp the requested page size to `[1, 200]`, defaulting to 50
pub fn clamp_limit(limit: Option<usize>) -> usize {
    limit.unwrap_or(DEFAULT_PAGE_LIMIT).clamp(1, MAX_PAGE_LIMIT)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Newest,
    Oldest,
}

impl SortOrder {
    /// Anything other than `"oldest"` sorts newest first
    pub fn from_query(sort: Option<&str>) -> Self {
        match sort {
            Some("oldest") => SortOrder::Oldest,
            _ => SortOrder::Newest,
        }
    }
}

enum SortKey {
    Dated(DateTime<Utc>),
    Undated(String),
}

fn sort_key(memory: &Memory) -> SortKey {
    match memory.created_at.as_deref() {
        Some(ts) => match parse_timestamp(ts) {
            Some(instant) => SortKey::Dated(instant),
            None => SortKey::Undated(ts.to_string()),
        },
        None => SortKey::Undated(String::new()),
    }
}

/// Sort memories in place by timestamp instant.
///
/// Ascending puts undated records first; descending puts them last, so the
/// newest page is never padded with unparseable timestamps.
pub fn sort_memories(memories: &mut [Memory], order: SortOrder) {
    memories.sort_by(|a, b| {
        let ordering = match (sort_key(a), sort_key(b)) {
            (SortKey::Dated(a), SortKey::Dated(b)) => a.cmp(&b),
            (SortKey::Undated(a), SortKey::Undated(b)) => a.cmp(&b),
            (SortKey::Undated(_), SortKey::Dated(_)) => std::cmp::Ordering::Less,
            (SortKey::Dated(_), SortKey::Undated(_)) => std::cmp::Ordering::Greater,
        };
        match order {
            SortOrder::Oldest => ordering,
            SortOrder::Newest => ordering.reverse(),
        }
    });
}

/// Slice one page out of a sorted listing. Returns the pre-slice total.
pub fn paginate(memories: Vec<Memory>, offset: usize, limit: usize) -> (usize, Vec<Memory>) {
    let total = memories.len();
    let page = memories
        .into_iter()
        .skip(offset)
        .take(limit)
        .collect();
    (total, page)
}

/// Keep records strictly newer than `now - hours`, assuming a descending
/// sort, and cap the feed length. Returns the in-window count before the
/// cap so callers can report how much the feed truncated.
pub fn filter_recent(
    memories: Vec<Memory>,
    hours: i64,
    now: DateTime<Utc>,
) -> (usize, Vec<Memory>) {
    let cutoff = now - Duration::hours(hours);
    let in_window: Vec<Memory> = memories
        .into_iter()
        .filter(|m| {
            let instant = m.created_at.as_deref().and_then(parse_timestamp);
            matches!(instant, Some(instant) if instant > cutoff)
        })
        .collect();
    let total = in_window.len();
    (total, in_window.into_iter().take(RECENT_MAX).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn memory(id: &str, created_at: &str) -> Memory {
        Memory {
            id: id.to_string(),
            agent: "clawd".to_string(),
            data: "d".to_string(),
            created_at: Some(created_at.to_string()),
            run_id: None,
            run_label: "—".to_string(),
            hash: "h".to_string(),
        }
    }

    fn undated(id: &str) -> Memory {
        Memory {
            created_at: None,
            ..memory(id, "unused")
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, 22, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_newest_first_by_instant_not_string() {
        // Lexicographically "2026-02-10T17:18..." < "2026-02-10T20:00Z", but
        // 17:18 at -08:00 is 01:18 UTC the next day, so it is newer.
        let mut memories = vec![
            memory("utc", "2026-02-10T20:00:00Z"),
            memory("pst", "2026-02-10T17:18:25.835258-08:00"),
        ];
        sort_memories(&mut memories, SortOrder::Newest);
        assert_eq!(memories[0].id, "pst");
        assert_eq!(memories[1].id, "utc");
    }

    #[test]
    fn test_oldest_puts_undated_first() {
        let mut memories = vec![
            memory("b", "2026-02-20T10:00:00Z"),
            memory("x", "not-a-date"),
            undated("y"),
            memory("a", "2026-02-19T10:00:00Z"),
        ];
        sort_memories(&mut memories, SortOrder::Oldest);
        let ids: Vec<&str> = memories.iter().map(|m| m.id.as_str()).collect();
        // Absent timestamps sort before unparseable ones, both before dated
        assert_eq!(ids, vec!["y", "x", "a", "b"]);
    }

    #[test]
    fn test_newest_puts_undated_last() {
        let mut memories = vec![
            memory("x", "not-a-date"),
            memory("b", "2026-02-20T10:00:00Z"),
            memory("a", "2026-02-19T10:00:00Z"),
        ];
        sort_memories(&mut memories, SortOrder::Newest);
        let ids: Vec<&str> = memories.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a", "x"]);
    }

    #[test]
    fn test_sort_order_from_query() {
        assert_eq!(SortOrder::from_query(Some("oldest")), SortOrder::Oldest);
        assert_eq!(SortOrder::from_query(Some("newest")), SortOrder::Newest);
        assert_eq!(SortOrder::from_query(Some("garbage")), SortOrder::Newest);
        assert_eq!(SortOrder::from_query(None), SortOrder::Newest);
    }

    #[test]
    fn test_paginate_reports_pre_slice_total() {
        let memories: Vec<Memory> = (0..10)
            .map(|i| memory(&i.to_string(), "2026-02-20T10:00:00Z"))
            .collect();
        let (total, page) = paginate(memories, 8, 5);
        assert_eq!(total, 10);
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].id, "8");
    }

    #[test]
    fn test_paginate_offset_past_end() {
        let memories = vec![memory("0", "2026-02-20T10:00:00Z")];
        let (total, page) = paginate(memories, 50, 10);
        assert_eq!(total, 1);
        assert!(page.is_empty());
    }

    #[test]
    fn test_clamp_limit() {
        assert_eq!(clamp_limit(None), 50);
        assert_eq!(clamp_limit(Some(0)), 1);
        assert_eq!(clamp_limit(Some(1000)), 200);
        assert_eq!(clamp_limit(Some(25)), 25);
    }

    #[test]
    fn test_filter_recent_boundary_and_cap() {
        let mut memories = vec![
            memory("in", "2026-02-22T11:00:00Z"),
            memory("boundary", "2026-02-21T12:00:00Z"), // exactly 24h: out
            memory("undated", "junk"),                  // out
        ];
        for i in 0..60 {
            memories.push(memory(&format!("bulk-{i}"), "2026-02-22T10:00:00Z"));
        }

        let (total, recent) = filter_recent(memories, DEFAULT_RECENT_HOURS, now());
        // 61 records fall inside the window; the feed caps at 50
        assert_eq!(total, 61);
        assert_eq!(recent.len(), RECENT_MAX);
        assert!(recent.iter().all(|m| m.id != "boundary" && m.id != "undated"));
    }
}

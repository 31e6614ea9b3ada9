//! Payload resolution and display helpers for stored memories
//!
//! Memories were written by two generations of the agent system with
//! incompatible payload conventions: the newer writer uses `userId` /
//! `createdAt`, the older one `user_id` / `created_at`. Resolution prefers
//! the newer field and falls back to the legacy one, with no migration step
//! and no error path for missing fields.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Modern agent-identity field name
pub const FIELD_AGENT: &str = "userId";
/// Legacy agent-identity field name
pub const FIELD_AGENT_LEGACY: &str = "user_id";

/// Sentinel agent for payloads carrying neither identity field
pub const UNKNOWN_AGENT: &str = "unknown";

/// Sentinel run label for absent or unrecognized run ids
pub const NO_RUN_LABEL: &str = "—";

/// Raw payload as stored in Qdrant. Either naming convention may appear;
/// both are kept as distinct optional fields so the fallback stays auditable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawPayload {
    #[serde(default, rename = "userId", skip_serializing_if = "Option::is_none")]
    pub agent: Option<String>,

    #[serde(default, rename = "user_id", skip_serializing_if = "Option::is_none")]
    pub agent_legacy: Option<String>,

    #[serde(default, rename = "createdAt", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,

    #[serde(default, rename = "created_at", skip_serializing_if = "Option::is_none")]
    pub created_at_legacy: Option<String>,

    #[serde(default, rename = "runId", skip_serializing_if = "Option::is_none")]
    pub run_id: Option<String>,

    /// Free-text body of the memory
    #[serde(default)]
    pub data: String,

    /// Dedup fingerprint, display only - never used for identity
    #[serde(default)]
    pub hash: String,
}

/// Canonical memory view. Built fresh on every aggregation pass, never
/// persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Memory {
    pub id: String,
    pub agent: String,
    pub data: String,
    #[serde(rename = "createdAt")]
    pub created_at: Option<String>,
    #[serde(rename = "runId")]
    pub run_id: Option<String>,
    #[serde(rename = "runLabel")]
    pub run_label: String,
    pub hash: String,
}

/// Resolve the producing agent: `userId` wins over `user_id`, else
/// `"unknown"`. Total - never fails, never returns an empty string for a
/// payload whose identity fields are absent.
pub fn resolve_agent(payload: &RawPayload) -> String {
    payload
        .agent
        .clone()
        .or_else(|| payload.agent_legacy.clone())
        .unwrap_or_else(|| UNKNOWN_AGENT.to_string())
}

/// Resolve the creation timestamp: `createdAt` wins over `created_at`, else
/// `None`. No format validation here - consumers that need an instant parse
/// it themselves.
pub fn resolve_timestamp(payload: &RawPayload) -> Option<String> {
    payload
        .created_at
        .clone()
        .or_else(|| payload.created_at_legacy.clone())
}

/// Resolve the run context id, if any.
pub fn resolve_run_id(payload: &RawPayload) -> Option<String> {
    payload.run_id.clone()
}

/// Fixed-label run-id prefixes, evaluated top to bottom after the
/// discord-channel rule. Extending the namespace means adding a row here.
const RUN_LABEL_PREFIXES: &[(&str, &str)] = &[
    ("agent:main:discord:thread:", "discord thread"),
    ("agent:main:cron:", "cron"),
    ("agent:main:telegram:", "telegram"),
    ("agent:sub:", "sub-agent"),
];

const DISCORD_CHANNEL_PREFIX: &str = "agent:main:discord:channel:";

/// Map an opaque run id onto a short display label via raw prefix matching.
/// First match wins; anything unrecognized collapses to the `"—"` sentinel.
pub fn format_run_label(run_id: Option<&str>) -> String {
    let Some(run_id) = run_id else {
        return NO_RUN_LABEL.to_string();
    };

    if run_id.starts_with(DISCORD_CHANNEL_PREFIX) {
        // Last 4 characters of the trailing colon-delimited segment
        let segment = run_id.rsplit(':').next().unwrap_or("");
        let chars: Vec<char> = segment.chars().collect();
        let tail: String = chars[chars.len().saturating_sub(4)..].iter().collect();
        return format!("discord #{tail}");
    }

    for (prefix, label) in RUN_LABEL_PREFIXES {
        if run_id.starts_with(prefix) {
            return (*label).to_string();
        }
    }

    NO_RUN_LABEL.to_string()
}

/// Build the canonical view of one stored record.
pub fn to_memory(id: String, payload: &RawPayload) -> Memory {
    let run_id = resolve_run_id(payload);
    Memory {
        id,
        agent: resolve_agent(payload),
        data: payload.data.clone(),
        created_at: resolve_timestamp(payload),
        run_label: format_run_label(run_id.as_deref()),
        run_id,
        hash: payload.hash.clone(),
    }
}

/// Parse a stored timestamp into an absolute UTC instant. Tolerates
/// fractional seconds and explicit offsets (not just `Z`). Returns `None`
/// for anything that is not RFC 3339.
pub fn parse_timestamp(ts: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(ts)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

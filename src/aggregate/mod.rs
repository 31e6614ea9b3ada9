//! Aggregation engines
//!
//! Independent, structurally similar engines fold a full collection scan
//! into dashboard statistics. The chart and report engines are pure
//! functions over the scanned records with an injected clock, so tests pin
//! `now` and assert exact outputs; handlers own the I/O. Agent discovery
//! drives the scan itself, and the snapshot buffer is the one piece of
//! cross-request state.

pub mod agents;
pub mod growth;
pub mod health;
pub mod listing;
pub mod snapshots;
pub mod storage;
pub mod timeline;

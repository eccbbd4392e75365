//! Shared timestamp/run-id helpers for marker files.

use chrono::{Local, NaiveDateTime};
use ulid::Ulid;

/// Layout of marker timestamps (`2026-10-18T14:03:27.512934`).
pub const MARKER_TS_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

/// Returns local wall-clock time as ISO-8601 without offset.
pub fn now_iso8601() -> String {
    Local::now().format(MARKER_TS_FORMAT).to_string()
}

pub fn parse_iso8601(ts: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(ts.trim(), MARKER_TS_FORMAT).ok()
}

pub fn new_run_id() -> String {
    Ulid::new().to_string()
}

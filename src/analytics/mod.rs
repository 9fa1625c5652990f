//! Structured request log for outbound backend calls.
//!
//! Every chat relay and analysis fetch appends one JSONL entry to the
//! configured log file (default `~/.callsight/request-log.jsonl`). Only call
//! metadata is recorded — never message content; the chat log itself lives
//! in memory for the session and is never persisted.
//!
//! Logging is strictly best-effort: a full disk or missing directory must
//! never surface as a chat failure, so write errors are swallowed.

use std::fs::{OpenOptions, create_dir_all};
use std::io::Write;
use std::path::PathBuf;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::config::expand_tilde;
use crate::config::schema::LoggingConfig;

// ---------------------------------------------------------------------------
// Log entries
// ---------------------------------------------------------------------------

/// A single entry in the request log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestLogEntry {
    /// UTC timestamp, RFC 3339.
    pub timestamp: String,
    /// Call kind: `"chat"`, `"analysis"`, or `"health"`.
    pub kind: String,
    /// Whether the backend call succeeded.
    pub success: bool,
    /// Wall-clock request latency in milliseconds.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub latency_ms: Option<u64>,
}

impl RequestLogEntry {
    /// Build an entry stamped with the current time.
    pub fn now(kind: &str, success: bool, latency_ms: Option<u64>) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339(),
            kind: kind.to_string(),
            success,
            latency_ms,
        }
    }
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

/// Resolved path of the request log file.
pub fn log_path(config: &LoggingConfig) -> PathBuf {
    expand_tilde(&config.path)
}

/// Append an entry to the request log. No-op when logging is disabled;
/// write failures are swallowed.
pub fn log_request(config: &LoggingConfig, entry: &RequestLogEntry) {
    if !config.enabled {
        return;
    }

    let path = log_path(config);
    if let Some(parent) = path.parent() {
        let _ = create_dir_all(parent);
    }

    let Ok(line) = serde_json::to_string(entry) else {
        return;
    };

    if let Ok(mut file) = OpenOptions::new().create(true).append(true).open(&path) {
        let _ = writeln!(file, "{line}");
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

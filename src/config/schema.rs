/// Configuration schema and defaults for callsight.
///
/// Defines the TOML-serializable configuration structure with all sections:
/// `[server]`, `[backend]`, `[transcript]`, and `[logging]`.
///
/// Every field has a sensible built-in default. Users only need to set the
/// values they want to override.
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level callsight configuration.
///
/// Maps directly to the `~/.callsight/config.toml` and `.callsight.toml`
/// file schemas. All sections and fields are optional — missing values fall
/// back to built-in defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CallsightConfig {
    pub server: ServerConfig,
    pub backend: BackendConfig,
    pub transcript: TranscriptConfig,
    pub logging: LoggingConfig,
}

// ---------------------------------------------------------------------------
// [server]
// ---------------------------------------------------------------------------

/// Dashboard HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address for the embedded dashboard server.
    pub addr: String,
    /// Open the dashboard in the default browser on startup (best-effort).
    pub open_browser: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:8787".to_string(),
            open_browser: true,
        }
    }
}

// ---------------------------------------------------------------------------
// [backend]
// ---------------------------------------------------------------------------

/// Reasoning-backend connection settings.
///
/// `base_url` is the single source of truth for the backend location —
/// every outbound call (chat relay, analysis proxy, health probe) builds
/// its URL from it. There is deliberately no second host setting anywhere.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Backend HTTP base URL.
    pub base_url: String,
    /// Request timeout for backend calls (milliseconds).
    pub timeout_ms: u64,
    /// Attach `transcript_id` and the prior message history to each chat
    /// request. When false, only the bare `message` is sent.
    pub attach_context: bool,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            timeout_ms: 10_000,
            attach_context: true,
        }
    }
}

// ---------------------------------------------------------------------------
// [transcript]
// ---------------------------------------------------------------------------

/// Transcript source settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptConfig {
    /// Path to the transcript JSON document. `~` is expanded to the home
    /// directory.
    pub path: String,
}

impl Default for TranscriptConfig {
    fn default() -> Self {
        Self {
            path: "data/transcript.json".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// [logging]
// ---------------------------------------------------------------------------

/// Request-log settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Whether outbound backend calls are logged.
    pub enabled: bool,
    /// Path to the JSONL request log. `~` is expanded to the home directory.
    pub path: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: "~/.callsight/request-log.jsonl".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default TOML content
// ---------------------------------------------------------------------------

impl CallsightConfig {
    /// Generate the annotated default TOML config file content.
    ///
    /// Used by config init to create a starting config file with all
    /// settings documented.
    pub fn default_toml() -> String {
        r#"# callsight Configuration
#
# Configuration hierarchy (highest precedence wins):
#   1. Environment variables (CALLSIGHT_*)
#   2. Project config (.callsight.toml in current directory)
#   3. User global config (~/.callsight/config.toml)
#   4. Built-in defaults

[server]
addr = "127.0.0.1:8787"
open_browser = true

[backend]
base_url = "http://127.0.0.1:8000"    # Single source of truth for the backend location
timeout_ms = 10000
attach_context = true                 # Send transcript_id + history with chat requests

[transcript]
path = "data/transcript.json"

[logging]
enabled = true
path = "~/.callsight/request-log.jsonl"
"#
        .to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

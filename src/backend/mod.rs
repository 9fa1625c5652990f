/// HTTP client for the causal-reasoning backend.
///
/// Communicates with the external analysis service using the synchronous
/// `ureq` HTTP client. Provides:
///
/// - **Health probe**: verify the backend is reachable and has data loaded.
/// - **Chat**: relay a user question (with optional transcript context) and
///   receive the backend's reply.
/// - **Analysis fetch**: retrieve the causal analysis for a transcript,
///   degrading to a fixed empty result on any failure.
///
/// The client is built from the `[backend]` config section; its `base_url`
/// is the only place the backend location exists. Every path below is
/// derived from it.
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::analysis::AnalysisResult;
use crate::chat::ChatMessage;
use crate::config::schema::BackendConfig;

// ---------------------------------------------------------------------------
// Request / response types for the backend API
// ---------------------------------------------------------------------------

/// Request body for `POST /api/chat`.
///
/// `transcript_id` and `history` are attached only when
/// `backend.attach_context` is set — the backend accepts the bare `message`
/// either way.
#[derive(Debug, Serialize)]
pub struct ChatRequest<'a> {
    pub message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transcript_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub history: Option<&'a [ChatMessage]>,
}

/// Response body from `POST /api/chat`.
#[derive(Debug, serde::Deserialize)]
struct ChatResponse {
    response: String,
}

/// Response body from the backend root status endpoint.
#[derive(Debug, serde::Deserialize)]
struct StatusResponse {
    #[allow(dead_code)]
    status: String,
    #[serde(default)]
    loaded_turns: usize,
}

/// Result of one health probe against the backend root endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackendProbe {
    /// The endpoint answered with a 2xx.
    pub reachable: bool,
    /// Turn count from the status body, when it parsed.
    pub loaded_turns: Option<usize>,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Synchronous reasoning-backend HTTP client.
///
/// Cheap to construct; each CLI invocation or serve loop builds one from the
/// resolved config and reuses it for its lifetime.
#[derive(Debug, Clone)]
pub struct BackendClient {
    base_url: String,
    timeout: Duration,
    attach_context: bool,
}

impl BackendClient {
    /// Build a client from the resolved config.
    pub fn from_config(config: &BackendConfig) -> Self {
        Self {
            base_url: normalize_base_url(&config.base_url),
            timeout: Duration::from_millis(config.timeout_ms),
            attach_context: config.attach_context,
        }
    }

    /// Whether chat requests should carry transcript context.
    pub fn attach_context(&self) -> bool {
        self.attach_context
    }

    /// The normalized base URL (for display in health output).
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Probe the backend's root status endpoint.
    ///
    /// One GET with a short timeout (5 s) so health checks never stall. Any
    /// 2xx response counts as reachable, whether or not the body parses;
    /// `loaded_turns` is only present when it does. Both answers come from
    /// the same request, so they can never disagree.
    pub fn probe(&self) -> BackendProbe {
        let url = format!("{}/", self.base_url);
        match ureq::get(&url).timeout(Duration::from_secs(5)).call() {
            Ok(resp) => BackendProbe {
                reachable: true,
                loaded_turns: resp
                    .into_json::<StatusResponse>()
                    .ok()
                    .map(|s| s.loaded_turns),
            },
            Err(_) => BackendProbe {
                reachable: false,
                loaded_turns: None,
            },
        }
    }

    /// Relay a chat message to the backend and return its reply.
    ///
    /// One POST to `/api/chat`, no retry. Non-2xx statuses, network errors,
    /// and malformed bodies all surface as errors — the chat relay converts
    /// every one of them into its fixed offline message.
    pub fn chat(&self, request: &ChatRequest<'_>) -> Result<String> {
        let url = format!("{}/api/chat", self.base_url);

        let resp = ureq::post(&url)
            .timeout(self.timeout)
            .send_json(request)
            .context("backend chat request failed")?;

        let parsed: ChatResponse = resp
            .into_json()
            .context("failed to parse backend chat response")?;

        Ok(parsed.response)
    }

    /// Fetch the causal analysis for a transcript.
    ///
    /// GET `/api/analyze/{transcript_id}` with caching disabled. Any failure
    /// (network, non-2xx, parse error) returns the fixed empty result — by
    /// contract, callers cannot observe a failure distinctly from "no data".
    pub fn fetch_analysis(&self, transcript_id: &str) -> AnalysisResult {
        let url = format!("{}/api/analyze/{transcript_id}", self.base_url);

        let result = ureq::get(&url)
            .timeout(self.timeout)
            .set("Cache-Control", "no-store")
            .call();

        match result {
            Ok(resp) => resp
                .into_json::<AnalysisResult>()
                .unwrap_or_else(|_| AnalysisResult::unavailable()),
            Err(_) => AnalysisResult::unavailable(),
        }
    }
}

/// Normalize a configured base URL: trim the trailing slash and resolve
/// `localhost` to `127.0.0.1`.
///
/// On Windows, "localhost" may try IPv6 (::1) first, causing delays when the
/// backend only binds to IPv4. Use 127.0.0.1 directly.
fn normalize_base_url(url: &str) -> String {
    url.trim_end_matches('/')
        .replace("://localhost", "://127.0.0.1")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_from_default_config() {
        let config = BackendConfig::default();
        let client = BackendClient::from_config(&config);
        assert_eq!(client.base_url, "http://127.0.0.1:8000");
        assert_eq!(client.timeout, Duration::from_millis(10_000));
        assert!(client.attach_context);
    }

    #[test]
    fn client_strips_trailing_slash() {
        let config = BackendConfig {
            base_url: "http://127.0.0.1:8000/".to_string(),
            ..BackendConfig::default()
        };
        let client = BackendClient::from_config(&config);
        assert_eq!(client.base_url, "http://127.0.0.1:8000");
    }

    #[test]
    fn client_rewrites_localhost() {
        let config = BackendConfig {
            base_url: "http://localhost:8000".to_string(),
            ..BackendConfig::default()
        };
        let client = BackendClient::from_config(&config);
        assert_eq!(client.base_url, "http://127.0.0.1:8000");
    }

    #[test]
    fn chat_request_omits_absent_context() {
        let request = ChatRequest {
            message: "why did the call escalate?",
            transcript_id: None,
            history: None,
        };
        let json = serde_json::to_string(&request).unwrap();
        assert_eq!(json, r#"{"message":"why did the call escalate?"}"#);
    }

    #[test]
    fn chat_request_serializes_context() {
        let history = vec![ChatMessage::system("Ready to analyze transcript ID: T1.")];
        let request = ChatRequest {
            message: "hello",
            transcript_id: Some("T1"),
            history: Some(&history),
        };
        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("\"transcript_id\":\"T1\""));
        assert!(json.contains("\"history\":[{\"role\":\"system\""));
    }

    #[test]
    fn fetch_analysis_failure_returns_empty_result() {
        // Port 1 is never listening — connection refused, immediately.
        let config = BackendConfig {
            base_url: "http://127.0.0.1:1".to_string(),
            timeout_ms: 1000,
            ..BackendConfig::default()
        };
        let client = BackendClient::from_config(&config);
        assert_eq!(client.fetch_analysis("T1"), AnalysisResult::unavailable());
    }

    #[test]
    fn unreachable_backend_probes_unhealthy() {
        let config = BackendConfig {
            base_url: "http://127.0.0.1:1".to_string(),
            timeout_ms: 1000,
            ..BackendConfig::default()
        };
        let client = BackendClient::from_config(&config);
        let probe = client.probe();
        assert!(!probe.reachable);
        assert_eq!(probe.loaded_turns, None);
    }
}

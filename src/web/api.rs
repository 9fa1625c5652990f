//! JSON API handlers for the web dashboard.
//!
//! Each handler corresponds to an API endpoint and returns a
//! `Response<Cursor<Vec<u8>>>` with JSON content. Handlers that talk to the
//! backend also append a request-log entry.

use std::io::Cursor;
use std::time::Instant;

use anyhow::{Context, Result};
use serde::Serialize;
use tiny_http::{Response, StatusCode};

use crate::analysis::{MOCK_SENTIMENT_POINTS, Metric, Metrics, TOPIC_SHORTCUTS, topic_prompt};
use crate::analytics::{self, RequestLogEntry};
use crate::chat::{Role, SendOutcome};
use crate::config;

use super::{DashboardState, content_type_json};

// ---------------------------------------------------------------------------
// JSON response types
// ---------------------------------------------------------------------------

/// Call API response — the view model plus the validated highlight index.
#[derive(Serialize)]
struct CallResponse<'a> {
    loaded: bool,
    call: Option<&'a crate::analysis::CallView>,
    /// `causal_turn_id` only when it is a valid index; otherwise no turn is
    /// highlighted.
    highlighted_turn: Option<usize>,
}

/// One KPI card in the metrics response.
#[derive(Serialize)]
struct MetricCardResponse {
    key: &'static str,
    title: &'static str,
    value: String,
    trend: String,
    /// Title of the explanation panel opened by clicking the card.
    panel_title: &'static str,
    explanation: &'static str,
}

/// Metrics API response — the three KPI cards plus the topic shortcuts for
/// the `reason` explanation panel.
#[derive(Serialize)]
struct MetricsResponse {
    loaded: bool,
    cards: Vec<MetricCardResponse>,
    topics: Vec<TopicResponse>,
}

/// A topic shortcut with its pre-templated chat prompt.
#[derive(Serialize)]
struct TopicResponse {
    topic: &'static str,
    prompt: String,
}

/// Sentiment API response — the mocked curve.
#[derive(Serialize)]
struct SentimentResponse {
    points: Vec<u32>,
}

/// Chat API response.
#[derive(Serialize)]
struct ChatReplyResponse<'a> {
    ok: bool,
    role: &'static str,
    response: &'a str,
}

/// Chat log API response.
#[derive(Serialize)]
struct ChatLogResponse<'a> {
    transcript_id: &'a str,
    messages: &'a [crate::chat::ChatMessage],
}

/// Chat send request body.
#[derive(serde::Deserialize)]
struct ChatSendRequest {
    message: String,
}

/// Health API response.
#[derive(Serialize)]
struct HealthResponse {
    backend_url: String,
    backend_reachable: bool,
    backend_loaded_turns: Option<usize>,
    transcript_loaded: bool,
    transcript_turns: usize,
    config_exists: bool,
    log_exists: bool,
}

/// Config API response — the full config as a JSON value + the raw TOML.
#[derive(Serialize)]
struct ConfigResponse {
    config: config::schema::CallsightConfig,
    toml_text: String,
}

/// Config update request — a list of key-value pairs.
#[derive(serde::Deserialize)]
struct ConfigUpdateRequest {
    updates: Vec<ConfigKeyValue>,
}

#[derive(serde::Deserialize)]
struct ConfigKeyValue {
    key: String,
    value: String,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Build a JSON success response.
fn json_response<T: Serialize>(data: &T) -> Result<Response<Cursor<Vec<u8>>>> {
    let body = serde_json::to_string(data).context("failed to serialize JSON response")?;
    Ok(Response::from_data(body.into_bytes())
        .with_header(content_type_json())
        .with_status_code(StatusCode(200)))
}

/// Build a JSON error response with the given status code.
fn error_response(status: u16, message: &str) -> Response<Cursor<Vec<u8>>> {
    let body = serde_json::json!({ "error": message }).to_string();
    Response::from_data(body.into_bytes())
        .with_header(content_type_json())
        .with_status_code(StatusCode(status))
}

// ---------------------------------------------------------------------------
// API Handlers
// ---------------------------------------------------------------------------

/// `GET /transcript.json` — the raw transcript document.
pub fn get_transcript_document(state: &DashboardState) -> Result<Response<Cursor<Vec<u8>>>> {
    match &state.raw_transcript {
        Some(raw) => Ok(Response::from_data(raw.as_bytes().to_vec())
            .with_header(content_type_json())
            .with_status_code(StatusCode(200))),
        None => Ok(error_response(404, "no transcript loaded")),
    }
}

/// `GET /api/call` — the view model, or the neutral no-data state.
pub fn get_call(state: &DashboardState) -> Result<Response<Cursor<Vec<u8>>>> {
    let resp = CallResponse {
        loaded: state.view.is_some(),
        call: state.view.as_ref(),
        highlighted_turn: state.view.as_ref().and_then(|v| v.highlighted_turn()),
    };
    json_response(&resp)
}

/// `GET /api/metrics` — the derived KPI metrics and explanation panel data.
pub fn get_metrics(state: &DashboardState) -> Result<Response<Cursor<Vec<u8>>>> {
    let (loaded, metrics) = match &state.view {
        Some(view) => (true, Metrics::from_view(view)),
        None => (
            false,
            Metrics {
                turns_count: 0,
                confidence_display: "N/A".to_string(),
                reason_label: "N/A".to_string(),
                confidence_trend: String::new(),
                turns_trend: String::new(),
                reason_trend: String::new(),
            },
        ),
    };

    let cards = vec![
        MetricCardResponse {
            key: Metric::Confidence.key(),
            title: "Confidence Score",
            value: metrics.confidence_display.clone(),
            trend: metrics.confidence_trend.clone(),
            panel_title: Metric::Confidence.title(),
            explanation: Metric::Confidence.explanation(),
        },
        MetricCardResponse {
            key: Metric::Turns.key(),
            title: "Total Turns",
            value: metrics.turns_count.to_string(),
            trend: metrics.turns_trend.clone(),
            panel_title: Metric::Turns.title(),
            explanation: Metric::Turns.explanation(),
        },
        MetricCardResponse {
            key: Metric::Reason.key(),
            title: "Reason For Call",
            value: metrics.reason_label.clone(),
            trend: metrics.reason_trend.clone(),
            panel_title: Metric::Reason.title(),
            explanation: Metric::Reason.explanation(),
        },
    ];

    let topics = TOPIC_SHORTCUTS
        .iter()
        .map(|&topic| TopicResponse {
            topic,
            prompt: topic_prompt(topic),
        })
        .collect();

    json_response(&MetricsResponse {
        loaded,
        cards,
        topics,
    })
}

/// `GET /api/sentiment` — the mocked sentiment curve.
pub fn get_sentiment() -> Result<Response<Cursor<Vec<u8>>>> {
    json_response(&SentimentResponse {
        points: MOCK_SENTIMENT_POINTS.to_vec(),
    })
}

/// `POST /api/chat` — relay a message through the server-owned session.
///
/// An empty or whitespace-only message is a 400 and appends nothing to the
/// log. Otherwise the response carries the single appended reply — the
/// backend's answer or the fixed offline message.
pub fn post_chat(state: &mut DashboardState, body: &str) -> Result<Response<Cursor<Vec<u8>>>> {
    let req: ChatSendRequest =
        serde_json::from_str(body).context("invalid JSON in chat request")?;

    let started = Instant::now();
    let outcome = state.session.send(&state.client, &req.message);
    let latency = started.elapsed().as_millis() as u64;

    match outcome {
        SendOutcome::Ignored => Ok(error_response(400, "empty message")),
        SendOutcome::Answered | SendOutcome::Failed => {
            analytics::log_request(
                &state.config.logging,
                &RequestLogEntry::now("chat", outcome == SendOutcome::Answered, Some(latency)),
            );

            let reply = state
                .session
                .last_reply()
                .context("send settled without appending a reply")?;
            json_response(&ChatReplyResponse {
                ok: outcome == SendOutcome::Answered,
                role: match reply.role {
                    Role::User => "user",
                    Role::System => "system",
                },
                response: &reply.content,
            })
        }
    }
}

/// `GET /api/chat/log` — the full session message log.
pub fn get_chat_log(state: &DashboardState) -> Result<Response<Cursor<Vec<u8>>>> {
    json_response(&ChatLogResponse {
        transcript_id: state.session.transcript_id(),
        messages: state.session.messages(),
    })
}

/// `GET /api/analysis/{transcript_id}` — same-origin analysis proxy.
///
/// Forwards to the backend's analyze endpoint and returns its result, or
/// the fixed empty result on any failure — never an error.
pub fn get_analysis(
    state: &DashboardState,
    transcript_id: &str,
) -> Result<Response<Cursor<Vec<u8>>>> {
    let started = Instant::now();
    let result = state.client.fetch_analysis(transcript_id);
    let latency = started.elapsed().as_millis() as u64;

    // "Empty" and "failed" are indistinguishable by contract; log the shape
    // we got as success since the proxy itself completed.
    analytics::log_request(
        &state.config.logging,
        &RequestLogEntry::now("analysis", true, Some(latency)),
    );

    json_response(&result)
}

/// `GET /api/health` — system health summary.
///
/// Reachability and loaded-turn count come from one probe request, and the
/// probe is logged like every other outbound backend call.
pub fn get_health(state: &DashboardState) -> Result<Response<Cursor<Vec<u8>>>> {
    let config_exists = config::global_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    let log_exists = analytics::log_path(&state.config.logging).exists();

    let started = Instant::now();
    let probe = state.client.probe();
    let latency = started.elapsed().as_millis() as u64;
    analytics::log_request(
        &state.config.logging,
        &RequestLogEntry::now("health", probe.reachable, Some(latency)),
    );

    let resp = HealthResponse {
        backend_url: state.client.base_url().to_string(),
        backend_reachable: probe.reachable,
        backend_loaded_turns: probe.loaded_turns,
        transcript_loaded: state.view.is_some(),
        transcript_turns: state
            .view
            .as_ref()
            .map(|v| v.transcript.len())
            .unwrap_or(0),
        config_exists,
        log_exists,
    };

    json_response(&resp)
}

/// `GET /api/config` — current effective configuration.
pub fn get_config() -> Result<Response<Cursor<Vec<u8>>>> {
    let cfg = config::load();
    let toml_text = toml::to_string_pretty(&cfg).unwrap_or_default();

    json_response(&ConfigResponse {
        config: cfg,
        toml_text,
    })
}

/// `PUT /api/config` — update configuration keys.
///
/// Expects JSON body: `{ "updates": [{ "key": "backend.base_url", "value": "..." }] }`
pub fn put_config(body: &str) -> Result<Response<Cursor<Vec<u8>>>> {
    let req: ConfigUpdateRequest =
        serde_json::from_str(body).context("invalid JSON in config update request")?;

    let mut errors: Vec<String> = Vec::new();
    let mut applied: Vec<String> = Vec::new();

    for kv in &req.updates {
        match config::set_config_value(&kv.key, &kv.value) {
            Ok(()) => applied.push(format!("{} = {}", kv.key, kv.value)),
            Err(e) => errors.push(format!("{}: {}", kv.key, e)),
        }
    }

    let result = serde_json::json!({
        "applied": applied,
        "errors": errors,
        "success": errors.is_empty(),
    });

    json_response(&result)
}

/// `POST /api/config/reset` — reset config to defaults.
pub fn post_config_reset() -> Result<Response<Cursor<Vec<u8>>>> {
    config::reset_config().context("failed to reset config")?;

    let result = serde_json::json!({
        "success": true,
        "message": "Configuration reset to defaults",
    });

    json_response(&result)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::CallView;
    use crate::backend::BackendClient;
    use crate::chat::ChatSession;
    use crate::config::schema::{BackendConfig, CallsightConfig};
    use crate::transcript;

    fn test_state(with_view: bool) -> DashboardState {
        let mut config = CallsightConfig::default();
        // Keep tests off the network and off the real log file.
        config.backend = BackendConfig {
            base_url: "http://127.0.0.1:1".to_string(),
            timeout_ms: 1000,
            ..BackendConfig::default()
        };
        config.logging.enabled = false;

        let (view, raw) = if with_view {
            let raw = r#"{"transcripts": [{
                "transcript_id": "T1",
                "conversation": [
                    {"speaker": "agent", "text": "hi"},
                    {"speaker": "caller", "text": "where is my package"}
                ]
            }]}"#;
            let file = transcript::parse(raw).unwrap();
            (Some(CallView::from_file(&file)), Some(raw.to_string()))
        } else {
            (None, None)
        };

        let client = BackendClient::from_config(&config.backend);
        let session = ChatSession::new(
            view.as_ref()
                .map(|v| v.transcript_id.clone())
                .unwrap_or_else(|| "UNKNOWN".to_string()),
        );

        DashboardState {
            config,
            view,
            raw_transcript: raw,
            client,
            session,
        }
    }

    fn body_of(resp: Response<Cursor<Vec<u8>>>) -> (u16, serde_json::Value) {
        let status = resp.status_code().0;
        let mut reader = resp.into_reader();
        let mut buf = String::new();
        use std::io::Read;
        reader.read_to_string(&mut buf).unwrap();
        (status, serde_json::from_str(&buf).unwrap())
    }

    #[test]
    fn call_endpoint_returns_view_model() {
        let state = test_state(true);
        let (status, body) = body_of(get_call(&state).unwrap());
        assert_eq!(status, 200);
        assert_eq!(body["loaded"], true);
        assert_eq!(body["call"]["transcript_id"], "T1");
        // Causal index 2 is out of range for the 2-turn conversation.
        assert_eq!(body["highlighted_turn"], serde_json::Value::Null);
    }

    #[test]
    fn call_endpoint_neutral_when_unloaded() {
        let state = test_state(false);
        let (status, body) = body_of(get_call(&state).unwrap());
        assert_eq!(status, 200);
        assert_eq!(body["loaded"], false);
        assert_eq!(body["call"], serde_json::Value::Null);
    }

    #[test]
    fn metrics_endpoint_projects_cards() {
        let state = test_state(true);
        let (status, body) = body_of(get_metrics(&state).unwrap());
        assert_eq!(status, 200);
        let cards = body["cards"].as_array().unwrap();
        assert_eq!(cards.len(), 3);
        assert_eq!(cards[0]["key"], "confidence");
        assert_eq!(cards[0]["value"], "91.4%");
        assert_eq!(cards[1]["key"], "turns");
        assert_eq!(cards[1]["value"], "2");
        assert_eq!(cards[2]["value"], "Delivery");

        let topics = body["topics"].as_array().unwrap();
        assert_eq!(topics.len(), 3);
        assert_eq!(
            topics[1]["prompt"],
            "Tell me more about the Refund Request issue detected in this call."
        );
    }

    #[test]
    fn sentiment_endpoint_returns_mock_curve() {
        let (status, body) = body_of(get_sentiment().unwrap());
        assert_eq!(status, 200);
        let points = body["points"].as_array().unwrap();
        assert_eq!(points.len(), 10);
        assert_eq!(points[0], 40);
    }

    #[test]
    fn chat_endpoint_rejects_empty_message() {
        let mut state = test_state(true);
        let (status, body) = body_of(post_chat(&mut state, r#"{"message": "   "}"#).unwrap());
        assert_eq!(status, 400);
        assert_eq!(body["error"], "empty message");
        // Nothing was appended — only the welcome message remains.
        assert_eq!(state.session.messages().len(), 1);
    }

    #[test]
    fn chat_endpoint_returns_offline_reply_on_failure() {
        let mut state = test_state(true);
        let (status, body) =
            body_of(post_chat(&mut state, r#"{"message": "why?"}"#).unwrap());
        assert_eq!(status, 200);
        assert_eq!(body["ok"], false);
        assert_eq!(body["role"], "system");
        assert_eq!(body["response"], crate::chat::BACKEND_OFFLINE_MESSAGE);
        // welcome + user + offline reply
        assert_eq!(state.session.messages().len(), 3);
    }

    #[test]
    fn chat_log_endpoint_returns_full_log() {
        let state = test_state(true);
        let (status, body) = body_of(get_chat_log(&state).unwrap());
        assert_eq!(status, 200);
        assert_eq!(body["transcript_id"], "T1");
        assert_eq!(body["messages"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn analysis_proxy_degrades_to_empty_result() {
        let state = test_state(true);
        let (status, body) = body_of(get_analysis(&state, "T1").unwrap());
        assert_eq!(status, 200);
        assert_eq!(body["transcript"].as_array().unwrap().len(), 0);
        assert_eq!(body["causal_turn_id"], serde_json::Value::Null);
        assert_eq!(body["confidence_score"], "0%");
    }

    #[test]
    fn health_endpoint_logs_probe_entry() {
        let dir = std::env::temp_dir().join(format!("callsight-health-{}", std::process::id()));
        let log_file = dir.join("request-log.jsonl");

        let mut state = test_state(true);
        state.config.logging.enabled = true;
        state.config.logging.path = log_file.to_string_lossy().to_string();

        let (status, body) = body_of(get_health(&state).unwrap());
        assert_eq!(status, 200);
        assert_eq!(body["backend_reachable"], false);
        assert_eq!(body["backend_loaded_turns"], serde_json::Value::Null);

        let content = std::fs::read_to_string(&log_file).unwrap();
        let entry: RequestLogEntry = serde_json::from_str(content.lines().next().unwrap()).unwrap();
        assert_eq!(entry.kind, "health");
        assert!(!entry.success);
        assert!(entry.latency_ms.is_some());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn transcript_document_served_verbatim() {
        let state = test_state(true);
        let (status, body) = body_of(get_transcript_document(&state).unwrap());
        assert_eq!(status, 200);
        assert_eq!(body["transcripts"][0]["transcript_id"], "T1");

        let empty = test_state(false);
        let (status, _) = body_of(get_transcript_document(&empty).unwrap());
        assert_eq!(status, 404);
    }
}

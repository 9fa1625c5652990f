//! Integration tests for transcript loading, metric projection, and the
//! analysis proxy client.

use std::fs;
use std::thread;

use callsight::analysis::{AnalysisResult, CallView, Metrics};
use callsight::backend::BackendClient;
use callsight::config::schema::BackendConfig;
use callsight::transcript;

// ---------------------------------------------------------------------------
// Transcript loading
// ---------------------------------------------------------------------------

#[test]
fn loading_document_yields_expected_metrics() {
    let dir = std::env::temp_dir().join(format!("callsight-it-{}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    let path = dir.join("transcript.json");
    fs::write(
        &path,
        r#"{ "transcripts": [{ "transcript_id": "T1", "conversation": [
            {"speaker": "agent", "text": "hi"},
            {"speaker": "caller", "text": "where is my package"}
        ] }] }"#,
    )
    .unwrap();

    let file = transcript::load_file(&path).unwrap();
    let view = CallView::from_file(&file);
    let metrics = Metrics::from_view(&view);

    assert_eq!(view.transcript_id, "T1");
    assert_eq!(metrics.turns_count, 2);

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn bundled_fixture_parses() {
    let file = transcript::load_file(std::path::Path::new("data/transcript.json")).unwrap();
    let view = CallView::from_file(&file);
    assert_eq!(view.transcript_id, "6794-8660");
    assert!(view.transcript.len() >= 3);
    // The fixture is long enough for the placeholder causal index to land.
    assert_eq!(view.highlighted_turn(), Some(2));
}

// ---------------------------------------------------------------------------
// Analysis proxy client
// ---------------------------------------------------------------------------

/// Stub backend that serves one analysis result and a root status endpoint.
fn spawn_analysis_stub() -> String {
    let server = tiny_http::Server::http("127.0.0.1:0").expect("failed to bind stub backend");
    let addr = server.server_addr().to_ip().expect("no IP address");

    thread::spawn(move || {
        for request in server.incoming_requests() {
            let url = request.url().to_string();
            let response = if url.starts_with("/api/analyze/T1") {
                tiny_http::Response::from_string(
                    serde_json::json!({
                        "transcript": [
                            {"speaker": "Customer", "text": "My order is late."},
                            {"speaker": "Agent", "text": "Let me check."}
                        ],
                        "causal_turn_id": 1,
                        "confidence_score": "91.4%"
                    })
                    .to_string(),
                )
                .with_status_code(200)
            } else if url == "/" {
                tiny_http::Response::from_string(
                    r#"{"status": "System Online", "loaded_turns": 42}"#,
                )
                .with_status_code(200)
            } else {
                tiny_http::Response::from_string(r#"{"error": "not found"}"#).with_status_code(404)
            };
            let _ = request.respond(response);
        }
    });

    format!("http://{addr}")
}

fn client_for(base_url: &str) -> BackendClient {
    BackendClient::from_config(&BackendConfig {
        base_url: base_url.to_string(),
        timeout_ms: 5000,
        ..BackendConfig::default()
    })
}

#[test]
fn fetch_analysis_returns_backend_result() {
    let base_url = spawn_analysis_stub();
    let client = client_for(&base_url);

    let result = client.fetch_analysis("T1");
    assert_eq!(result.transcript.len(), 2);
    assert_eq!(result.causal_turn_id, Some(1));
    assert_eq!(result.confidence_score, "91.4%");
}

#[test]
fn fetch_analysis_degrades_on_unknown_transcript() {
    let base_url = spawn_analysis_stub();
    let client = client_for(&base_url);

    // The stub 404s for this id; the caller sees the fixed empty result.
    let result = client.fetch_analysis("nope");
    assert_eq!(result, AnalysisResult::unavailable());
}

#[test]
fn fetch_analysis_degrades_on_unreachable_backend() {
    let client = client_for("http://127.0.0.1:1");
    let result = client.fetch_analysis("T1");
    assert!(result.transcript.is_empty());
    assert_eq!(result.causal_turn_id, None);
    assert_eq!(result.confidence_score, "0%");
}

#[test]
fn health_probe_reads_status_endpoint() {
    let base_url = spawn_analysis_stub();
    let client = client_for(&base_url);

    let probe = client.probe();
    assert!(probe.reachable);
    assert_eq!(probe.loaded_turns, Some(42));
}

//! Embedded web dashboard for callsight.
//!
//! Provides a lightweight HTTP server (sync, via `tiny_http`) that serves:
//! - The single-page analytics dashboard (KPI cards, metric explanations,
//!   sentiment graph, causal heatmap, chat sidebar)
//! - JSON API endpoints for the view model, metrics, chat relay, analysis
//!   proxy, health, and config management
//!
//! Launched via `callsight serve` (default: `http://127.0.0.1:8787`).
//!
//! Requests are handled sequentially — sufficient for a local single-user
//! dashboard, and it means the serve loop can own the chat session and view
//! model outright with no locking: there is never a concurrent writer.

mod api;
mod frontend;

use std::io::{Cursor, Read};

use anyhow::{Context, Result};
use tiny_http::{Header, Method, Response, Server, StatusCode};

use crate::analysis::CallView;
use crate::backend::BackendClient;
use crate::chat::ChatSession;
use crate::config::{self, CallsightConfig};
use crate::transcript::{self, UNKNOWN_TRANSCRIPT_ID};

// ---------------------------------------------------------------------------
// Dashboard state
// ---------------------------------------------------------------------------

/// Everything the dashboard owns for its lifetime: the resolved config, the
/// loaded view model (or none, if the transcript failed to load), the raw
/// transcript document, the backend client, and the chat session.
pub struct DashboardState {
    pub config: CallsightConfig,
    pub view: Option<CallView>,
    pub raw_transcript: Option<String>,
    pub client: BackendClient,
    pub session: ChatSession,
}

impl DashboardState {
    /// Build the dashboard state, loading the transcript once.
    ///
    /// A missing or malformed transcript file is logged and degraded to the
    /// neutral no-data state — the dashboard starts regardless.
    pub fn from_config(config: CallsightConfig) -> Self {
        let path = config::expand_tilde(&config.transcript.path);

        let (view, raw_transcript) = match transcript::load_file(&path) {
            Ok(file) => {
                let raw = std::fs::read_to_string(&path).ok();
                (Some(CallView::from_file(&file)), raw)
            }
            Err(e) => {
                eprintln!("warning: could not load transcript: {e:#}");
                (None, None)
            }
        };

        let client = BackendClient::from_config(&config.backend);
        let session = ChatSession::new(
            view.as_ref()
                .map(|v| v.transcript_id.clone())
                .unwrap_or_else(|| UNKNOWN_TRANSCRIPT_ID.to_string()),
        );

        Self {
            config,
            view,
            raw_transcript,
            client,
            session,
        }
    }
}

// ---------------------------------------------------------------------------
// Server entry point
// ---------------------------------------------------------------------------

/// Start the web dashboard server.
///
/// Blocks the current thread. Gracefully handles errors per-request without
/// crashing the server.
pub fn serve(config: CallsightConfig) -> Result<()> {
    let addr = config.server.addr.clone();
    let open = config.server.open_browser;
    let mut state = DashboardState::from_config(config);

    let server = Server::http(&addr)
        .map_err(|e| anyhow::anyhow!("failed to start HTTP server on {addr}: {e}"))?;

    println!("callsight dashboard running at http://{addr}");
    match &state.view {
        Some(view) => println!(
            "transcript {} loaded ({} turns)",
            view.transcript_id,
            view.transcript.len()
        ),
        None => println!("no transcript loaded — dashboard will show the empty state"),
    }
    println!("Press Ctrl+C to stop.\n");

    if open {
        let _ = open_browser(&format!("http://{addr}"));
    }

    for mut request in server.incoming_requests() {
        let method = request.method().clone();
        let url = request.url().to_string();

        // Read body up-front for methods that carry one
        let body = if matches!(method, Method::Put | Method::Post | Method::Patch) {
            let mut buf = String::new();
            let _ = request.as_reader().read_to_string(&mut buf);
            Some(buf)
        } else {
            None
        };

        let result = dispatch(&mut state, &method, &url, body.as_deref());

        match result {
            Ok(resp) => {
                let _ = request.respond(resp);
            }
            Err(e) => {
                let body = serde_json::json!({ "error": e.to_string() }).to_string();
                let resp = Response::from_data(body.as_bytes().to_vec())
                    .with_header(content_type_json())
                    .with_status_code(StatusCode(500));
                let _ = request.respond(resp);
            }
        }

        // Brief access log
        println!(
            "{} {} {}",
            method,
            url,
            chrono::Local::now().format("%H:%M:%S")
        );
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Dispatch an incoming request to the appropriate handler.
fn dispatch(
    state: &mut DashboardState,
    method: &Method,
    url: &str,
    body: Option<&str>,
) -> Result<Response<Cursor<Vec<u8>>>> {
    // Strip query string for path matching
    let path = url.split('?').next().unwrap_or(url);

    // Analysis proxy: GET /api/analysis/{transcript_id}
    if let Some(transcript_id) = path.strip_prefix("/api/analysis/")
        && *method == Method::Get
        && !transcript_id.is_empty()
    {
        return api::get_analysis(state, transcript_id);
    }

    match (method, path) {
        // Frontend
        (&Method::Get, "/") | (&Method::Get, "/index.html") => Ok(serve_frontend()),

        // Transcript document (static resource)
        (&Method::Get, "/transcript.json") => api::get_transcript_document(state),

        // API — Dashboard data
        (&Method::Get, "/api/call") => api::get_call(state),
        (&Method::Get, "/api/metrics") => api::get_metrics(state),
        (&Method::Get, "/api/sentiment") => api::get_sentiment(),

        // API — Chat relay
        (&Method::Post, "/api/chat") => api::post_chat(state, body.unwrap_or("{}")),
        (&Method::Get, "/api/chat/log") => api::get_chat_log(state),

        // API — Configuration
        (&Method::Get, "/api/config") => api::get_config(),
        (&Method::Put, "/api/config") => api::put_config(body.unwrap_or("{}")),
        (&Method::Post, "/api/config/reset") => api::post_config_reset(),

        // API — Health
        (&Method::Get, "/api/health") => api::get_health(state),

        // 404
        _ => Ok(not_found()),
    }
}

// ---------------------------------------------------------------------------
// Response helpers
// ---------------------------------------------------------------------------

/// Serve the embedded single-page frontend.
fn serve_frontend() -> Response<Cursor<Vec<u8>>> {
    let html = frontend::INDEX_HTML;
    Response::from_data(html.as_bytes().to_vec())
        .with_header(content_type_html())
        .with_status_code(StatusCode(200))
}

/// 404 response.
fn not_found() -> Response<Cursor<Vec<u8>>> {
    let body = r#"{"error": "not found"}"#;
    Response::from_data(body.as_bytes().to_vec())
        .with_header(content_type_json())
        .with_status_code(StatusCode(404))
}

/// JSON content type header.
pub(crate) fn content_type_json() -> Header {
    Header::from_bytes("Content-Type", "application/json; charset=utf-8").unwrap()
}

/// HTML content type header.
fn content_type_html() -> Header {
    Header::from_bytes("Content-Type", "text/html; charset=utf-8").unwrap()
}

/// Attempt to open a URL in the system default browser.
fn open_browser(url: &str) -> Result<()> {
    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/C", "start", url])
            .spawn()
            .context("failed to open browser")?;
    }

    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open")
            .arg(url)
            .spawn()
            .context("failed to open browser")?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open")
            .arg(url)
            .spawn()
            .context("failed to open browser")?;
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

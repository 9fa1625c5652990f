//! CLI command implementations for callsight.
//!
//! Provides subcommand handlers for:
//! - `callsight serve` — run the embedded web dashboard
//! - `callsight inspect` — derived metrics for the loaded transcript
//! - `callsight ask "question"` — one-shot chat relay from the terminal
//! - `callsight analysis [--id X]` — fetch the causal analysis via the proxy client
//! - `callsight health` — check backend, transcript, config, request log
//! - `callsight config show|init|set|reset` — configuration management

use std::time::Instant;

use anyhow::Result;
use colored::Colorize;

use crate::analysis::{AnalysisResult, CallView, Metrics};
use crate::analytics::{self, RequestLogEntry};
use crate::backend::BackendClient;
use crate::chat::{ChatSession, SendOutcome};
use crate::config;
use crate::transcript::{self, UNKNOWN_TRANSCRIPT_ID};
use crate::web;

/// Output format for data-printing commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

impl OutputFormat {
    pub fn from_str_opt(s: Option<&str>) -> Self {
        match s {
            Some("json") => Self::Json,
            Some("csv") => Self::Csv,
            _ => Self::Table,
        }
    }
}

/// Load the view model from the configured transcript path.
fn load_view(cfg: &config::CallsightConfig) -> Result<CallView> {
    let path = config::expand_tilde(&cfg.transcript.path);
    let file = transcript::load_file(&path)?;
    Ok(CallView::from_file(&file))
}

// ---------------------------------------------------------------------------
// callsight serve
// ---------------------------------------------------------------------------

/// Run the dashboard server, optionally overriding the bind address.
pub fn run_serve(addr_override: Option<String>) -> Result<()> {
    let mut cfg = config::load();
    if let Some(addr) = addr_override {
        cfg.server.addr = addr;
    }
    web::serve(cfg)
}

// ---------------------------------------------------------------------------
// callsight inspect
// ---------------------------------------------------------------------------

/// Print the derived display metrics for the loaded transcript.
pub fn run_inspect(format: OutputFormat) -> Result<()> {
    let cfg = config::load();
    let view = load_view(&cfg)?;
    let metrics = Metrics::from_view(&view);

    match format {
        OutputFormat::Json => print_inspect_json(&view, &metrics)?,
        OutputFormat::Csv => print_inspect_csv(&view, &metrics),
        OutputFormat::Table => print_inspect_table(&view, &metrics),
    }

    Ok(())
}

fn print_inspect_table(view: &CallView, metrics: &Metrics) {
    println!("{}", "callsight Transcript Report".bold().cyan());
    println!("{}", "=".repeat(60));
    println!();
    println!("  {} {}", "Transcript ID: ".bold(), view.transcript_id);
    println!(
        "  {} {} ({})",
        "Total turns:   ".bold(),
        metrics.turns_count,
        metrics.turns_trend
    );
    println!(
        "  {} {} ({})",
        "Confidence:    ".bold(),
        metrics.confidence_display,
        metrics.confidence_trend
    );
    println!(
        "  {} {} ({})",
        "Reason:        ".bold(),
        metrics.reason_label,
        metrics.reason_trend
    );
    match view.highlighted_turn() {
        Some(index) => {
            println!();
            println!("{}", "Causal Turn".bold().cyan());
            let turn = &view.transcript[index];
            println!("  [{index}] {}: {}", turn.speaker.bold(), turn.text);
        }
        None => {
            println!();
            println!(
                "  {}",
                "No causal turn highlighted (index out of range or unset).".dimmed()
            );
        }
    }
}

fn print_inspect_json(view: &CallView, metrics: &Metrics) -> Result<()> {
    let value = serde_json::json!({
        "transcript_id": view.transcript_id,
        "turns_count": metrics.turns_count,
        "confidence_display": metrics.confidence_display,
        "reason_label": metrics.reason_label,
        "highlighted_turn": view.highlighted_turn(),
    });
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

fn print_inspect_csv(view: &CallView, metrics: &Metrics) {
    println!("transcript_id,turns_count,confidence_display,reason_label");
    println!(
        "{},{},{},{}",
        view.transcript_id, metrics.turns_count, metrics.confidence_display, metrics.reason_label
    );
}

// ---------------------------------------------------------------------------
// callsight ask
// ---------------------------------------------------------------------------

/// Relay a single question to the backend and print the reply.
///
/// Failure is not an error exit: the fixed offline message prints like any
/// other reply, matching the relay contract.
pub fn run_ask(message: &str) -> Result<()> {
    let cfg = config::load();
    let client = BackendClient::from_config(&cfg.backend);

    // Attach transcript context when the transcript is loadable.
    let transcript_id = load_view(&cfg)
        .map(|v| v.transcript_id)
        .unwrap_or_else(|_| UNKNOWN_TRANSCRIPT_ID.to_string());
    let mut session = ChatSession::new(transcript_id);

    let started = Instant::now();
    let outcome = session.send(&client, message);
    let latency = started.elapsed().as_millis() as u64;

    match outcome {
        SendOutcome::Ignored => {
            println!("{}", "Nothing to send (empty message).".yellow());
            return Ok(());
        }
        SendOutcome::Answered | SendOutcome::Failed => {
            analytics::log_request(
                &cfg.logging,
                &RequestLogEntry::now("chat", outcome == SendOutcome::Answered, Some(latency)),
            );
        }
    }

    if let Some(reply) = session.last_reply() {
        if outcome == SendOutcome::Failed {
            println!("{}", reply.content.red());
        } else {
            println!("{}", reply.content);
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// callsight analysis
// ---------------------------------------------------------------------------

/// Fetch and print the causal analysis for a transcript.
pub fn run_analysis(id_override: Option<String>, format: OutputFormat) -> Result<()> {
    let cfg = config::load();
    let client = BackendClient::from_config(&cfg.backend);

    let transcript_id = match id_override {
        Some(id) => id,
        None => load_view(&cfg)
            .map(|v| v.transcript_id)
            .unwrap_or_else(|_| UNKNOWN_TRANSCRIPT_ID.to_string()),
    };

    let started = Instant::now();
    let result = client.fetch_analysis(&transcript_id);
    let latency = started.elapsed().as_millis() as u64;
    analytics::log_request(
        &cfg.logging,
        &RequestLogEntry::now("analysis", true, Some(latency)),
    );

    match format {
        OutputFormat::Json | OutputFormat::Csv => {
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        OutputFormat::Table => print_analysis_table(&transcript_id, &result),
    }

    Ok(())
}

fn print_analysis_table(transcript_id: &str, result: &AnalysisResult) {
    println!("{}", "callsight Causal Analysis".bold().cyan());
    println!("{}", "=".repeat(60));
    println!();
    println!("  {} {}", "Transcript ID:   ".bold(), transcript_id);
    println!("  {} {}", "Confidence:      ".bold(), result.confidence_score);
    match result.causal_turn_id {
        Some(index) => println!("  {} {}", "Causal turn:     ".bold(), index),
        None => println!("  {} none", "Causal turn:     ".bold()),
    }

    if result.transcript.is_empty() {
        println!();
        println!(
            "  {}",
            "No analysis data (backend unreachable or transcript unknown).".dimmed()
        );
        return;
    }

    println!();
    for (i, turn) in result.transcript.iter().enumerate() {
        let line = format!("  [{i}] {}: {}", turn.speaker, turn.text);
        if result.causal_turn_id == Some(i) {
            println!("{}", line.red().bold());
        } else {
            println!("{line}");
        }
    }
}

// ---------------------------------------------------------------------------
// callsight health
// ---------------------------------------------------------------------------

/// Print a colored system health summary.
pub fn run_health() -> Result<()> {
    let cfg = config::load();
    let client = BackendClient::from_config(&cfg.backend);

    println!("{}", "callsight Health Check".bold().cyan());
    println!("{}", "=".repeat(60));
    println!();

    // Backend — one probe, logged like every other outbound call
    let started = Instant::now();
    let probe = client.probe();
    let latency = started.elapsed().as_millis() as u64;
    analytics::log_request(
        &cfg.logging,
        &RequestLogEntry::now("health", probe.reachable, Some(latency)),
    );

    if probe.reachable {
        let turns = probe
            .loaded_turns
            .map(|n| format!(" ({n} turns indexed)"))
            .unwrap_or_default();
        println!(
            "  {} backend reachable at {}{}",
            "OK  ".green().bold(),
            client.base_url(),
            turns
        );
    } else {
        println!(
            "  {} backend unreachable at {}",
            "FAIL".red().bold(),
            client.base_url()
        );
    }

    // Transcript
    match load_view(&cfg) {
        Ok(view) => println!(
            "  {} transcript {} loaded ({} turns)",
            "OK  ".green().bold(),
            view.transcript_id,
            view.transcript.len()
        ),
        Err(e) => println!("  {} transcript: {e:#}", "FAIL".red().bold()),
    }

    // Config file
    let config_exists = config::global_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    if config_exists {
        println!("  {} global config present", "OK  ".green().bold());
    } else {
        println!(
            "  {} no global config (built-in defaults in effect)",
            "--  ".yellow().bold()
        );
    }

    // Request log
    if analytics::log_path(&cfg.logging).exists() {
        println!("  {} request log present", "OK  ".green().bold());
    } else {
        println!("  {} no request log yet", "--  ".yellow().bold());
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// callsight config show | init | set | reset
// ---------------------------------------------------------------------------

/// Show the effective (merged) configuration as TOML.
pub fn run_config_show() -> Result<()> {
    let toml_str = config::show_effective_config()?;
    println!("{}", "Effective callsight Configuration".bold().cyan());
    println!("{}", "=".repeat(50));
    println!();
    println!("{toml_str}");

    let global_exists = config::global_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    println!("{}", "Sources (highest priority last):".dimmed());
    println!("  {} built-in defaults", "·".dimmed());
    if global_exists {
        println!("  {} {}", "✓".green(), "~/.callsight/config.toml".dimmed());
    } else {
        println!(
            "  {} {}",
            "·".dimmed(),
            "~/.callsight/config.toml (not found)".dimmed()
        );
    }
    println!("  {} {}", "·".dimmed(), ".callsight.toml (if present)".dimmed());
    println!(
        "  {} {}",
        "·".dimmed(),
        "CALLSIGHT_* environment variables".dimmed()
    );

    Ok(())
}

/// Initialize a default config file at `~/.callsight/config.toml`.
pub fn run_config_init(force: bool) -> Result<()> {
    let path = config::init_config(force)?;
    println!(
        "{} Config written to {}",
        "✓".green().bold(),
        path.display()
    );
    println!(
        "  {}",
        "Edit the file to point callsight at your backend and transcript.".dimmed()
    );
    Ok(())
}

/// Set a single configuration value in the global config file.
pub fn run_config_set(key: &str, value: &str) -> Result<()> {
    config::set_config_value(key, value)?;
    println!("{} Set {} = {}", "✓".green().bold(), key.bold(), value);
    Ok(())
}

/// Reset configuration to defaults.
pub fn run_config_reset() -> Result<()> {
    let path = config::reset_config()?;
    println!(
        "{} Config reset to defaults at {}",
        "✓".green().bold(),
        path.display()
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_format_from_str() {
        assert_eq!(OutputFormat::from_str_opt(Some("json")), OutputFormat::Json);
        assert_eq!(OutputFormat::from_str_opt(Some("csv")), OutputFormat::Csv);
        assert_eq!(OutputFormat::from_str_opt(Some("table")), OutputFormat::Table);
        assert_eq!(OutputFormat::from_str_opt(Some("bogus")), OutputFormat::Table);
        assert_eq!(OutputFormat::from_str_opt(None), OutputFormat::Table);
    }
}

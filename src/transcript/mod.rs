//! Transcript data model and loader.
//!
//! A transcript document is a JSON file shaped
//! `{ "transcripts": [ { "transcript_id", "conversation": [ { "speaker", "text" } ] } ] }`.
//! The loader performs exactly one read — no retry, no watching. I/O and
//! parse failures surface as errors with context; callers decide whether to
//! degrade (the dashboard serves a neutral no-data state) or abort (the CLI
//! prints the error).

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Sentinel transcript id used when the document omits one.
pub const UNKNOWN_TRANSCRIPT_ID: &str = "UNKNOWN";

// ---------------------------------------------------------------------------
// Data model
// ---------------------------------------------------------------------------

/// One utterance within a conversation. Identity is positional — turns carry
/// no explicit id, and order is fixed by the source document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub speaker: String,
    pub text: String,
}

/// A recorded conversation: an ordered sequence of turns plus metadata.
///
/// `intent` and `reason_for_call` are present in the full dataset schema but
/// absent from minimal documents, so they deserialize as optional.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcript {
    #[serde(default)]
    pub transcript_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason_for_call: Option<String>,
    #[serde(default)]
    pub conversation: Vec<Turn>,
}

/// Root of a transcript JSON document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TranscriptFile {
    #[serde(default)]
    pub transcripts: Vec<Transcript>,
}

impl TranscriptFile {
    /// The first transcript in the document, if any. The dashboard displays
    /// exactly one call, so only the first element is ever used.
    pub fn first(&self) -> Option<&Transcript> {
        self.transcripts.first()
    }

    /// Look up a transcript by id.
    pub fn by_id(&self, transcript_id: &str) -> Option<&Transcript> {
        self.transcripts
            .iter()
            .find(|t| t.transcript_id == transcript_id)
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Load and parse a transcript document from disk.
pub fn load_file(path: &Path) -> Result<TranscriptFile> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read transcript file {}", path.display()))?;
    parse(&content).with_context(|| format!("malformed transcript file {}", path.display()))
}

/// Parse a transcript document from a JSON string.
pub fn parse(json: &str) -> Result<TranscriptFile> {
    serde_json::from_str(json).context("transcript JSON did not match expected shape")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

//! Analysis results, the call view model, and derived display metrics.
//!
//! Everything the dashboard presents as "analysis" flows through this module
//! so that presentation code never touches raw backend responses. Several
//! values are **placeholders pending real computation** — they are constants
//! here, clearly named, rather than data smuggled in as if it were derived:
//!
//! - [`PLACEHOLDER_CONFIDENCE`] — the confidence score shown on the KPI card
//! - [`PLACEHOLDER_CAUSAL_TURN`] — the highlighted causal turn index
//! - [`PLACEHOLDER_REASON`] — the "reason for call" label
//! - [`MOCK_SENTIMENT_POINTS`] — the sentiment graph curve
//! - the per-metric trend badges
//!
//! A real backend result deserializes into the same [`AnalysisResult`] shape,
//! so substituting live values means changing construction sites only.

use serde::{Deserialize, Serialize};

use crate::transcript::{Transcript, TranscriptFile, Turn, UNKNOWN_TRANSCRIPT_ID};

// ---------------------------------------------------------------------------
// Placeholder analysis values
// ---------------------------------------------------------------------------

/// Confidence display value (placeholder, not computed).
pub const PLACEHOLDER_CONFIDENCE: &str = "91.4%";

/// Causal turn index (placeholder, not computed).
pub const PLACEHOLDER_CAUSAL_TURN: usize = 2;

/// Reason-for-call label (placeholder, not computed).
pub const PLACEHOLDER_REASON: &str = "Delivery";

/// Mocked sentiment curve rendered by the dashboard graph (percentages over
/// the duration of the call).
pub const MOCK_SENTIMENT_POINTS: [u32; 10] = [40, 35, 30, 45, 60, 55, 70, 85, 90, 88];

// ---------------------------------------------------------------------------
// Analysis result (backend interface shape)
// ---------------------------------------------------------------------------

/// The analysis-result contract shared with the reasoning backend.
///
/// This is the shape the analysis proxy returns verbatim. A failed or
/// unreachable backend yields [`AnalysisResult::unavailable`] — callers
/// cannot distinguish "failed" from "no data", by contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    #[serde(default)]
    pub transcript: Vec<Turn>,
    #[serde(default)]
    pub causal_turn_id: Option<usize>,
    #[serde(default)]
    pub confidence_score: String,
}

impl AnalysisResult {
    /// The fixed empty result substituted for any proxy failure.
    pub fn unavailable() -> Self {
        Self {
            transcript: Vec::new(),
            causal_turn_id: None,
            confidence_score: "0%".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Call view model
// ---------------------------------------------------------------------------

/// The normalized, UI-ready projection of the loaded transcript document.
///
/// Constructed once after load and immutable thereafter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallView {
    pub transcript_id: String,
    /// Display-only percentage string (currently [`PLACEHOLDER_CONFIDENCE`]).
    pub confidence_score: String,
    /// Index of the causal turn (currently [`PLACEHOLDER_CAUSAL_TURN`]).
    pub causal_turn_id: Option<usize>,
    pub transcript: Vec<Turn>,
}

impl CallView {
    /// Build the view model from the first transcript in a document.
    ///
    /// A missing first transcript yields an empty conversation and the
    /// `"UNKNOWN"` sentinel id — the dashboard renders its neutral state
    /// rather than failing.
    pub fn from_file(file: &TranscriptFile) -> Self {
        match file.first() {
            Some(t) => Self::from_transcript(t),
            None => Self {
                transcript_id: UNKNOWN_TRANSCRIPT_ID.to_string(),
                confidence_score: PLACEHOLDER_CONFIDENCE.to_string(),
                causal_turn_id: Some(PLACEHOLDER_CAUSAL_TURN),
                transcript: Vec::new(),
            },
        }
    }

    /// Build the view model from a single transcript.
    pub fn from_transcript(transcript: &Transcript) -> Self {
        let transcript_id = if transcript.transcript_id.is_empty() {
            UNKNOWN_TRANSCRIPT_ID.to_string()
        } else {
            transcript.transcript_id.clone()
        };
        Self {
            transcript_id,
            confidence_score: PLACEHOLDER_CONFIDENCE.to_string(),
            causal_turn_id: Some(PLACEHOLDER_CAUSAL_TURN),
            transcript: transcript.conversation.clone(),
        }
    }

    /// The causal turn index, but only when it is a valid index into the
    /// conversation. An out-of-range index means no turn is highlighted.
    pub fn highlighted_turn(&self) -> Option<usize> {
        self.causal_turn_id.filter(|&i| i < self.transcript.len())
    }
}

// ---------------------------------------------------------------------------
// Derived metrics
// ---------------------------------------------------------------------------

/// The three KPI-card metrics, projected from the view model.
///
/// Pure projection — no I/O, no inference. Trend badges are static design
/// placeholders, not computed trends.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metrics {
    pub turns_count: usize,
    pub confidence_display: String,
    pub reason_label: String,
    pub confidence_trend: String,
    pub turns_trend: String,
    pub reason_trend: String,
}

impl Metrics {
    /// Project the display metrics from a view model.
    pub fn from_view(view: &CallView) -> Self {
        Self {
            turns_count: view.transcript.len(),
            confidence_display: view.confidence_score.clone(),
            reason_label: PLACEHOLDER_REASON.to_string(),
            confidence_trend: "+2.4%".to_string(),
            turns_trend: "Normal".to_string(),
            reason_trend: "Critical".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Metric explanation panel
// ---------------------------------------------------------------------------

/// The selectable KPI metrics. The active selection is an `Option<Metric>`:
/// selecting sets it, dismissing clears it, and selecting a different key
/// overwrites the current one directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Confidence,
    Turns,
    Reason,
}

impl Metric {
    /// All metrics, in KPI-card order.
    pub const ALL: [Metric; 3] = [Metric::Confidence, Metric::Turns, Metric::Reason];

    /// Stable string key for the metric (API and frontend selection key).
    pub fn key(&self) -> &'static str {
        match self {
            Metric::Confidence => "confidence",
            Metric::Turns => "turns",
            Metric::Reason => "reason",
        }
    }

    /// Parse a metric from its string key.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "confidence" => Some(Metric::Confidence),
            "turns" => Some(Metric::Turns),
            "reason" => Some(Metric::Reason),
            _ => None,
        }
    }

    /// Panel title for the metric.
    pub fn title(&self) -> &'static str {
        match self {
            Metric::Confidence => "AI Confidence Score",
            Metric::Turns => "Conversation Depth",
            Metric::Reason => "Critical Driver Analysis",
        }
    }

    /// Static explanatory text shown in the panel.
    ///
    /// The `Reason` panel renders topic shortcuts instead of prose, so its
    /// text here is the lead-in line above the shortcut buttons.
    pub fn explanation(&self) -> &'static str {
        match self {
            Metric::Confidence => {
                "The AI is 91.4% certain that the intent of this call is \
                 'Delivery Investigation' based on keyword patterns."
            }
            Metric::Turns => {
                "Total turns indicate the back-and-forth count. High counts \
                 (15+) often signal complex, unresolved issues."
            }
            Metric::Reason => {
                "The AI identified Delivery as the primary driver. Detected \
                 sub-topics requiring attention:"
            }
        }
    }
}

/// Topic shortcuts rendered inside the `Reason` explanation panel.
pub const TOPIC_SHORTCUTS: [&str; 3] = ["Delivery Status", "Refund Request", "Shipping Delay"];

/// Build the templated chat prompt for a topic shortcut.
///
/// Activating a shortcut populates the pending chat input with this string
/// and focuses the input — it never auto-sends.
pub fn topic_prompt(topic: &str) -> String {
    format!("Tell me more about the {topic} issue detected in this call.")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcript;

    fn sample_file() -> TranscriptFile {
        transcript::parse(
            r#"{
                "transcripts": [{
                    "transcript_id": "T1",
                    "conversation": [
                        {"speaker": "agent", "text": "hi"},
                        {"speaker": "caller", "text": "where is my package"}
                    ]
                }]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn view_model_from_first_transcript() {
        let view = CallView::from_file(&sample_file());
        assert_eq!(view.transcript_id, "T1");
        assert_eq!(view.transcript.len(), 2);
        assert_eq!(view.confidence_score, PLACEHOLDER_CONFIDENCE);
        assert_eq!(view.causal_turn_id, Some(PLACEHOLDER_CAUSAL_TURN));
    }

    #[test]
    fn view_model_defaults_for_empty_document() {
        let view = CallView::from_file(&TranscriptFile::default());
        assert_eq!(view.transcript_id, UNKNOWN_TRANSCRIPT_ID);
        assert!(view.transcript.is_empty());
    }

    #[test]
    fn view_model_sentinel_for_blank_id() {
        let file = transcript::parse(
            r#"{"transcripts": [{"conversation": [{"speaker": "a", "text": "b"}]}]}"#,
        )
        .unwrap();
        let view = CallView::from_file(&file);
        assert_eq!(view.transcript_id, UNKNOWN_TRANSCRIPT_ID);
        assert_eq!(view.transcript.len(), 1);
    }

    #[test]
    fn highlighted_turn_requires_valid_index() {
        let mut view = CallView::from_file(&sample_file());

        // Placeholder index 2 is out of range for a 2-turn conversation.
        assert_eq!(view.highlighted_turn(), None);

        view.causal_turn_id = Some(1);
        assert_eq!(view.highlighted_turn(), Some(1));

        view.causal_turn_id = None;
        assert_eq!(view.highlighted_turn(), None);
    }

    #[test]
    fn metrics_project_turn_count() {
        let view = CallView::from_file(&sample_file());
        let metrics = Metrics::from_view(&view);
        assert_eq!(metrics.turns_count, 2);
        assert_eq!(metrics.confidence_display, "91.4%");
        assert_eq!(metrics.reason_label, "Delivery");
        assert_eq!(metrics.confidence_trend, "+2.4%");
        assert_eq!(metrics.turns_trend, "Normal");
        assert_eq!(metrics.reason_trend, "Critical");
    }

    #[test]
    fn unavailable_result_has_fixed_shape() {
        let result = AnalysisResult::unavailable();
        assert!(result.transcript.is_empty());
        assert_eq!(result.causal_turn_id, None);
        assert_eq!(result.confidence_score, "0%");
    }

    #[test]
    fn analysis_result_roundtrips_null_causal_turn() {
        let json = serde_json::to_string(&AnalysisResult::unavailable()).unwrap();
        assert!(json.contains("\"causal_turn_id\":null"));
        let back: AnalysisResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back, AnalysisResult::unavailable());
    }

    #[test]
    fn metric_keys_round_trip() {
        for metric in Metric::ALL {
            assert_eq!(Metric::from_key(metric.key()), Some(metric));
        }
        assert_eq!(Metric::from_key("sentiment"), None);
    }

    #[test]
    fn topic_prompt_matches_template() {
        assert_eq!(
            topic_prompt("Refund Request"),
            "Tell me more about the Refund Request issue detected in this call."
        );
    }
}

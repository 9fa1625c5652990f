//! Chat relay — the per-session message log and send state machine.
//!
//! A [`ChatSession`] owns everything a chat conversation needs: the
//! append-only message log, the pending input text, the active-metric
//! selection, and the sending flag. It is owned by exactly one component
//! (the serve loop, or a CLI invocation) and mutated only there — there is
//! no concurrent writer, so no locking.
//!
//! Send contract, per message:
//!
//! - Whitespace-only input is a no-op: nothing appended, no request issued.
//! - Otherwise the user message is appended synchronously, then exactly one
//!   reply is appended once the request settles — the backend's response on
//!   success, the fixed [`BACKEND_OFFLINE_MESSAGE`] on any failure. Never
//!   both, never zero.
//! - Errors never escape the relay, and the sending flag is cleared on both
//!   paths.
//! - No retry, no cancellation, no de-duplication of rapid repeated sends.

use serde::{Deserialize, Serialize};

use crate::analysis::{Metric, topic_prompt};
use crate::backend::{BackendClient, ChatRequest};

/// Fixed, user-visible reply appended when the backend cannot be reached or
/// returns garbage.
pub const BACKEND_OFFLINE_MESSAGE: &str =
    "System offline. Could not reach the analysis backend — is it running?";

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

/// Who authored a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    System,
}

/// A single message in the session log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    /// Build a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Build a system (analyst) message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }
}

/// Outcome of a [`ChatSession::send`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// Input was empty after trimming — nothing happened.
    Ignored,
    /// The backend replied; its response was appended.
    Answered,
    /// The request failed; the fixed offline message was appended.
    Failed,
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// One chat conversation about one transcript.
#[derive(Debug, Clone)]
pub struct ChatSession {
    transcript_id: String,
    messages: Vec<ChatMessage>,
    pending_input: String,
    active_metric: Option<Metric>,
    sending: bool,
}

impl ChatSession {
    /// Create a session for a transcript, seeding the log with the welcome
    /// message.
    pub fn new(transcript_id: impl Into<String>) -> Self {
        let transcript_id = transcript_id.into();
        let welcome = ChatMessage::system(format!(
            "Ready to analyze transcript ID: {transcript_id}. Ask me anything!"
        ));
        Self {
            transcript_id,
            messages: vec![welcome],
            pending_input: String::new(),
            active_metric: None,
            sending: false,
        }
    }

    /// The full message log, in send order.
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// The transcript this session is about.
    pub fn transcript_id(&self) -> &str {
        &self.transcript_id
    }

    /// Text staged in the input field but not yet sent.
    pub fn pending_input(&self) -> &str {
        &self.pending_input
    }

    /// Stage text in the input field without sending it.
    pub fn set_pending_input(&mut self, text: impl Into<String>) {
        self.pending_input = text.into();
    }

    /// Whether a request is currently outstanding.
    pub fn is_sending(&self) -> bool {
        self.sending
    }

    /// Send a message through the relay.
    ///
    /// Appends the user message, issues one POST to the backend, and appends
    /// exactly one reply — see the module docs for the full contract.
    pub fn send(&mut self, client: &BackendClient, text: &str) -> SendOutcome {
        let text = text.trim();
        if text.is_empty() {
            return SendOutcome::Ignored;
        }

        // History is the log as it stood before this message.
        let history = self.messages.clone();

        self.messages.push(ChatMessage::user(text));
        self.pending_input.clear();
        self.sending = true;

        let request = if client.attach_context() {
            ChatRequest {
                message: text,
                transcript_id: Some(&self.transcript_id),
                history: Some(&history),
            }
        } else {
            ChatRequest {
                message: text,
                transcript_id: None,
                history: None,
            }
        };

        let outcome = match client.chat(&request) {
            Ok(reply) => {
                self.messages.push(ChatMessage::system(reply));
                SendOutcome::Answered
            }
            Err(_) => {
                self.messages.push(ChatMessage::system(BACKEND_OFFLINE_MESSAGE));
                SendOutcome::Failed
            }
        };

        self.sending = false;
        outcome
    }

    /// Send whatever is staged in the input field.
    pub fn send_pending(&mut self, client: &BackendClient) -> SendOutcome {
        let text = self.pending_input.clone();
        self.send(client, &text)
    }

    /// The most recently appended reply, if any.
    pub fn last_reply(&self) -> Option<&ChatMessage> {
        self.messages.iter().rev().find(|m| m.role == Role::System)
    }

    // -- Metric explanation panel state ------------------------------------

    /// The currently selected metric, if any.
    pub fn active_metric(&self) -> Option<Metric> {
        self.active_metric
    }

    /// Select a metric. Selecting a different metric overwrites the current
    /// selection directly.
    pub fn select_metric(&mut self, metric: Metric) {
        self.active_metric = Some(metric);
    }

    /// Dismiss the explanation panel.
    pub fn dismiss_metric(&mut self) {
        self.active_metric = None;
    }

    /// Activate a topic shortcut: stage the templated prompt in the input
    /// field. Does not send.
    pub fn focus_topic(&mut self, topic: &str) {
        self.pending_input = topic_prompt(topic);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::BackendConfig;

    /// Client pointed at a port nothing listens on — every request fails
    /// fast with connection refused.
    fn offline_client() -> BackendClient {
        BackendClient::from_config(&BackendConfig {
            base_url: "http://127.0.0.1:1".to_string(),
            timeout_ms: 1000,
            ..BackendConfig::default()
        })
    }

    #[test]
    fn new_session_seeds_welcome_message() {
        let session = ChatSession::new("T1");
        assert_eq!(session.messages().len(), 1);
        assert_eq!(session.messages()[0].role, Role::System);
        assert!(session.messages()[0].content.contains("T1"));
        assert!(!session.is_sending());
    }

    #[test]
    fn empty_input_is_a_no_op() {
        let mut session = ChatSession::new("T1");
        let client = offline_client();

        assert_eq!(session.send(&client, ""), SendOutcome::Ignored);
        assert_eq!(session.send(&client, "   \t\n"), SendOutcome::Ignored);
        // Only the welcome message remains — nothing was appended.
        assert_eq!(session.messages().len(), 1);
    }

    #[test]
    fn failed_send_appends_user_then_offline_message() {
        let mut session = ChatSession::new("T1");
        let client = offline_client();

        let outcome = session.send(&client, "  why did this call escalate?  ");
        assert_eq!(outcome, SendOutcome::Failed);

        let messages = session.messages();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[1].role, Role::User);
        assert_eq!(messages[1].content, "why did this call escalate?");
        assert_eq!(messages[2].role, Role::System);
        assert_eq!(messages[2].content, BACKEND_OFFLINE_MESSAGE);
        assert!(!session.is_sending());
    }

    #[test]
    fn session_stays_usable_after_failure() {
        let mut session = ChatSession::new("T1");
        let client = offline_client();

        session.send(&client, "first");
        session.send(&client, "second");

        // Each send appended exactly one user message and one reply.
        let messages = session.messages();
        assert_eq!(messages.len(), 5);
        assert_eq!(messages[1].content, "first");
        assert_eq!(messages[3].content, "second");
        assert_eq!(messages[2].content, BACKEND_OFFLINE_MESSAGE);
        assert_eq!(messages[4].content, BACKEND_OFFLINE_MESSAGE);
    }

    #[test]
    fn send_clears_pending_input() {
        let mut session = ChatSession::new("T1");
        let client = offline_client();

        session.set_pending_input("hello there");
        session.send_pending(&client);
        assert_eq!(session.pending_input(), "");
    }

    #[test]
    fn metric_selection_overwrites_and_dismisses() {
        let mut session = ChatSession::new("T1");
        assert_eq!(session.active_metric(), None);

        session.select_metric(Metric::Confidence);
        assert_eq!(session.active_metric(), Some(Metric::Confidence));

        // Direct overwrite, no intermediate clear required.
        session.select_metric(Metric::Reason);
        assert_eq!(session.active_metric(), Some(Metric::Reason));

        session.dismiss_metric();
        assert_eq!(session.active_metric(), None);
    }

    #[test]
    fn topic_shortcut_stages_prompt_without_sending() {
        let mut session = ChatSession::new("T1");
        session.select_metric(Metric::Reason);
        session.focus_topic("Refund Request");

        assert_eq!(
            session.pending_input(),
            "Tell me more about the Refund Request issue detected in this call."
        );
        // Nothing was sent: only the welcome message is in the log.
        assert_eq!(session.messages().len(), 1);
    }
}

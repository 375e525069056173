//! Structured diagnostics for conversation history.
//!
//! The store reports rejected messages and trimming through a
//! [`DiagnosticSink`]. The default sink forwards to `tracing`; embedders can
//! plug in their own to collect or forward the events elsewhere.

use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

use crate::history::ValidationError;

/// Event for logging a message refused by validation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageSkippedEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    pub session_id: String,
    /// Position of the message in its `add` batch.
    pub index: usize,
    /// Role of the message, empty when the message itself was absent.
    pub role: String,
    /// Reason code, e.g. `MissingToolCallID`.
    pub reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_call_index: Option<usize>,
    pub error: String,
}

impl MessageSkippedEvent {
    pub fn new(
        session_id: impl Into<String>,
        index: usize,
        role: impl Into<String>,
        reason: &ValidationError,
    ) -> Self {
        Self {
            event_type: "MessageSkipped".to_string(),
            session_id: session_id.into(),
            index,
            role: role.into(),
            reason: reason.code().to_string(),
            tool_call_index: reason.tool_call_index(),
            error: reason.to_string(),
        }
    }
}

impl std::fmt::Display for MessageSkippedEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match serde_json::to_string(self) {
            Ok(json) => write!(f, "{}", json),
            Err(_) => write!(f, "MessageSkippedEvent serialization error"),
        }
    }
}

/// Event for logging a trim that dropped messages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryTrimmedEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    pub session_id: String,
    pub before: usize,
    pub after: usize,
    /// Whether the session's system anchor was held in place.
    pub anchored: bool,
}

impl HistoryTrimmedEvent {
    pub fn new(session_id: impl Into<String>, before: usize, after: usize, anchored: bool) -> Self {
        Self {
            event_type: "HistoryTrimmed".to_string(),
            session_id: session_id.into(),
            before,
            after,
            anchored,
        }
    }

    pub fn dropped(&self) -> usize {
        self.before.saturating_sub(self.after)
    }
}

impl std::fmt::Display for HistoryTrimmedEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match serde_json::to_string(self) {
            Ok(json) => write!(f, "{}", json),
            Err(_) => write!(f, "HistoryTrimmedEvent serialization error"),
        }
    }
}

/// Receiver for conversation-history diagnostics.
///
/// Called outside of any session lock.
#[cfg_attr(test, mockall::automock)]
pub trait DiagnosticSink: Send + Sync {
    /// A message was rejected and left out of the history.
    fn message_skipped(&self, event: &MessageSkippedEvent);

    /// A session buffer was trimmed.
    fn history_trimmed(&self, event: &HistoryTrimmedEvent);
}

/// Default sink: emits each diagnostic as a `tracing` event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingDiagnostics;

impl DiagnosticSink for TracingDiagnostics {
    fn message_skipped(&self, event: &MessageSkippedEvent) {
        tracing::warn!(
            session_id = %event.session_id,
            index = event.index,
            role = %event.role,
            reason = %event.reason,
            tool_call_index = ?event.tool_call_index,
            error = %event.error,
            "Invalid message skipped"
        );
    }

    fn history_trimmed(&self, event: &HistoryTrimmedEvent) {
        tracing::debug!(
            session_id = %event.session_id,
            before = event.before,
            after = event.after,
            anchored = event.anchored,
            "Conversation history trimmed"
        );
    }
}

/// Install a global `tracing` subscriber for binaries and tests.
///
/// `filter` takes `EnvFilter` directives; when `None`, `RUST_LOG` is used and
/// falls back to `info`. Returns `false` if a global subscriber was already
/// installed, in which case nothing changes.
pub fn init_tracing(filter: Option<&str>, json: bool) -> bool {
    let filter = match filter {
        Some(directives) => EnvFilter::new(directives),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let installed = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.is_ok()
}

//! Concurrency-safe, session-keyed conversation store.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use dashmap::DashMap;

use crate::config::HistoryConfig;
use crate::logging::{DiagnosticSink, HistoryTrimmedEvent, MessageSkippedEvent, TracingDiagnostics};
use crate::models::Message;

use super::trimmer::{HistoryLimit, HistoryTrimmer};
use super::validation::{validate_message, ValidationError};

/// A message of an `add` batch that was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedMessage {
    /// Position in the batch.
    pub index: usize,
    /// Role of the message, empty when the message itself was absent.
    pub role: String,
    pub reason: ValidationError,
}

/// Result of [`ConversationStore::add`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddOutcome {
    /// Number of messages appended to the session.
    pub admitted: usize,
    /// Rejected messages, in batch order.
    pub skipped: Vec<SkippedMessage>,
}

impl AddOutcome {
    pub fn rejected(&self) -> usize {
        self.skipped.len()
    }

    /// True when every message of the batch was admitted.
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// Per-session state. Only touched under its mutex.
#[derive(Debug, Default)]
struct SessionHistory {
    messages: Vec<Message>,
    /// The first message ever admitted had the system role. Sticky.
    system_anchor: bool,
    admitted_total: u64,
}

/// Owns every session buffer and applies validation and trimming on each add.
///
/// Operations on one session are linearizable: a batch is validated up front,
/// then appended and trimmed under the session's own lock, so readers see the
/// buffer either before or after a whole `add`. Different sessions only share
/// the sharded map and never wait on each other's locks.
///
/// # Example
///
/// ```rust
/// use chat_history::history::ConversationStore;
/// use chat_history::models::Message;
///
/// let store = ConversationStore::new(3);
///
/// store.add("session-1", vec![Message::system("You are a helpful assistant.")]);
/// for i in 0..5 {
///     store.add("session-1", vec![Message::user(format!("Message {}", i))]);
/// }
///
/// let history = store.get("session-1");
/// assert_eq!(history.len(), 3);
/// assert!(history[0].is_system());
/// assert_eq!(history[2].text(), Some("Message 4"));
/// ```
pub struct ConversationStore {
    sessions: DashMap<String, Arc<Mutex<SessionHistory>>>,
    trimmer: HistoryTrimmer,
    diagnostics: Arc<dyn DiagnosticSink>,
}

impl ConversationStore {
    /// Create a store retaining at most `max_history_length` messages per
    /// session. Zero or negative disables trimming.
    pub fn new(max_history_length: i64) -> Self {
        Self::with_diagnostics(
            HistoryLimit::from_max_length(max_history_length),
            Arc::new(TracingDiagnostics),
        )
    }

    /// Create from configuration
    pub fn from_config(config: &HistoryConfig) -> Self {
        Self::with_diagnostics(config.limit(), Arc::new(TracingDiagnostics))
    }

    /// Create a store that reports diagnostics to `diagnostics`.
    pub fn with_diagnostics(limit: HistoryLimit, diagnostics: Arc<dyn DiagnosticSink>) -> Self {
        if !limit.is_bounded() {
            tracing::info!("max_history_length is not positive, conversation history trimming is disabled");
        }
        Self {
            sessions: DashMap::new(),
            trimmer: HistoryTrimmer::new(limit),
            diagnostics,
        }
    }

    pub fn limit(&self) -> HistoryLimit {
        self.trimmer.limit()
    }

    /// Validate and append `messages` to a session, then trim it.
    ///
    /// Messages are processed in order. Invalid ones are reported and skipped
    /// without affecting the rest of the batch. Accepts plain messages as well
    /// as `Option<Message>` items, where `None` is rejected as a nil message.
    /// A batch with nothing admissible leaves the store untouched and does not
    /// create the session.
    pub fn add<I, M>(&self, session_id: &str, messages: I) -> AddOutcome
    where
        I: IntoIterator<Item = M>,
        M: Into<Option<Message>>,
    {
        let mut admitted = Vec::new();
        let mut skipped = Vec::new();

        for (index, message) in messages.into_iter().enumerate() {
            let message = message.into();
            match validate_message(message.as_ref()) {
                Ok(()) => admitted.extend(message),
                Err(reason) => {
                    let role = message.map(|m| m.role).unwrap_or_default();
                    self.diagnostics
                        .message_skipped(&MessageSkippedEvent::new(session_id, index, role.as_str(), &reason));
                    skipped.push(SkippedMessage { index, role, reason });
                }
            }
        }

        let admitted_count = admitted.len();
        if admitted_count == 0 {
            return AddOutcome {
                admitted: 0,
                skipped,
            };
        }

        let session = self.session_or_insert(session_id);
        let trimmed = {
            let mut history = lock(&session);
            if history.admitted_total == 0 {
                history.system_anchor = admitted[0].is_system();
            }
            history.admitted_total += admitted_count as u64;
            history.messages.extend(admitted);

            let before = history.messages.len();
            let anchored = history.system_anchor;
            let dropped = self.trimmer.apply_in_place(&mut history.messages, anchored);
            (dropped > 0).then(|| HistoryTrimmedEvent::new(session_id, before, before - dropped, anchored))
        };

        if let Some(event) = trimmed {
            self.diagnostics.history_trimmed(&event);
        }

        AddOutcome {
            admitted: admitted_count,
            skipped,
        }
    }

    /// Snapshot of a session's history; empty for unknown sessions.
    ///
    /// The returned messages are owned copies and never change afterwards.
    pub fn get(&self, session_id: &str) -> Vec<Message> {
        match self.session(session_id) {
            Some(session) => lock(&session).messages.clone(),
            None => Vec::new(),
        }
    }

    /// Number of messages currently retained for a session.
    pub fn session_len(&self, session_id: &str) -> usize {
        self.session(session_id)
            .map_or(0, |session| lock(&session).messages.len())
    }

    /// Whether the session's first admitted message was a system message.
    pub fn has_system_anchor(&self, session_id: &str) -> bool {
        self.session(session_id)
            .is_some_and(|session| lock(&session).system_anchor)
    }

    pub fn contains_session(&self, session_id: &str) -> bool {
        self.sessions.contains_key(session_id)
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    // The map guard is released before the caller takes the session lock.
    fn session(&self, session_id: &str) -> Option<Arc<Mutex<SessionHistory>>> {
        self.sessions
            .get(session_id)
            .map(|entry| Arc::clone(entry.value()))
    }

    fn session_or_insert(&self, session_id: &str) -> Arc<Mutex<SessionHistory>> {
        if let Some(session) = self.session(session_id) {
            return session;
        }
        let entry = self.sessions.entry(session_id.to_string()).or_default();
        Arc::clone(entry.value())
    }
}

impl Default for ConversationStore {
    fn default() -> Self {
        Self::from_config(&HistoryConfig::default())
    }
}

impl fmt::Debug for ConversationStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversationStore")
            .field("sessions", &self.sessions.len())
            .field("limit", &self.trimmer.limit())
            .finish_non_exhaustive()
    }
}

// No user code runs while a session lock is held, so a poisoned lock still
// guards a consistent buffer.
fn lock(session: &Mutex<SessionHistory>) -> MutexGuard<'_, SessionHistory> {
    session.lock().unwrap_or_else(PoisonError::into_inner)
}

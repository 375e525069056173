//! # Chat History
//!
//! Conversation history management for chat-completion clients. Every
//! session keeps an ordered buffer of messages in the OpenAI chat shape;
//! inbound messages are validated before admission and the buffer is kept
//! within a configurable length while preserving the session's original
//! system prompt.
//!
//! ## Features
//!
//! - **Validation**: malformed messages are skipped and reported, the rest of
//!   the batch is still admitted
//! - **Trimming**: count-based, keeps the system anchor and the most recent
//!   messages
//! - **Concurrency**: one lock per session, snapshots are owned copies
//! - **Observability**: structured `tracing` diagnostics through a pluggable
//!   sink
//!
//! ## Quick Start
//!
//! ```rust
//! use chat_history::{ConversationStore, Message, ToolCall};
//!
//! let store = ConversationStore::new(10);
//!
//! let outcome = store.add(
//!     "session-1",
//!     vec![
//!         Message::system("You are a helpful assistant."),
//!         Message::user("What's the weather in London?"),
//!         Message::assistant_tool_calls(vec![ToolCall::function(
//!             "call_1",
//!             "get_weather",
//!             r#"{"location":"London"}"#,
//!         )]),
//!         Message::tool("call_1", r#"{"temperature":"20C"}"#),
//!         // Rejected: a tool result must carry a tool_call_id.
//!         Message::new("tool").with_content("orphan"),
//!     ],
//! );
//!
//! assert_eq!(outcome.admitted, 4);
//! assert_eq!(outcome.skipped[0].reason.code(), "MissingToolCallID");
//! assert_eq!(store.get("session-1").len(), 4);
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]

// Error types (must be first for other modules to use)
pub mod error;

pub mod config;
pub mod history;
pub mod logging;
pub mod models;

pub use crate::config::HistoryConfig;
pub use error::{HistoryError, Result};
pub use history::{
    trim_history, validate_message, AddOutcome, ConversationStore, HistoryLimit, HistoryTrimmer,
    SkippedMessage, ValidationError,
};
pub use logging::{DiagnosticSink, HistoryTrimmedEvent, MessageSkippedEvent, TracingDiagnostics};
pub use models::{ContentPart, FunctionCall, ImageUrl, Message, MessageContent, ToolCall};

/// Current version of chat-history
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

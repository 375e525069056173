//! Conversation history: admission rules, trimming and per-session storage.
//!
//! Messages enter through [`ConversationStore::add`], which validates each of
//! them with [`validate_message`], appends the admitted ones to the session
//! buffer and reduces the buffer with a [`HistoryTrimmer`].

mod store;
mod trimmer;
mod validation;

pub use store::{AddOutcome, ConversationStore, SkippedMessage};
pub use trimmer::{trim_history, HistoryLimit, HistoryTrimmer};
pub use validation::{validate_message, ValidationError};

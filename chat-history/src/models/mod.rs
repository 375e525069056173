//! Chat message types.
//!
//! Messages follow the OpenAI chat-completions shape: a role tag, an optional
//! polymorphic content payload, tool calls on assistant turns and a
//! correlation id on tool results.

mod types;

pub use types::{
    ContentPart, FunctionCall, ImageUrl, Message, MessageContent, ToolCall, ASSISTANT_ROLE,
    SYSTEM_ROLE, TOOL_ROLE, USER_ROLE,
};

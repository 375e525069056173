//! Structural validation of inbound messages.

use thiserror::Error;

use crate::models::{Message, ASSISTANT_ROLE, TOOL_ROLE};

/// Why a message was refused admission to a conversation history.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("message cannot be nil")]
    NilMessage,
    #[error("message role cannot be empty")]
    EmptyRole,
    #[error("tool role message must have a tool_call_id")]
    MissingToolCallId,
    #[error("tool role message must have content")]
    MissingToolContent,
    #[error("tool call at index {index} must have an ID")]
    ToolCallMissingId { index: usize },
    #[error("tool call at index {index} must have a type")]
    ToolCallMissingType { index: usize },
    #[error("tool call at index {index} must have a function name")]
    ToolCallMissingFunctionName { index: usize },
}

impl ValidationError {
    /// Stable reason code, used in diagnostics.
    pub fn code(&self) -> &'static str {
        match self {
            ValidationError::NilMessage => "NilMessage",
            ValidationError::EmptyRole => "EmptyRole",
            ValidationError::MissingToolCallId => "MissingToolCallID",
            ValidationError::MissingToolContent => "MissingToolContent",
            ValidationError::ToolCallMissingId { .. } => "ToolCallMissingID",
            ValidationError::ToolCallMissingType { .. } => "ToolCallMissingType",
            ValidationError::ToolCallMissingFunctionName { .. } => "ToolCallMissingFunctionName",
        }
    }

    /// Zero-based index of the offending tool call, for tool-call failures.
    pub fn tool_call_index(&self) -> Option<usize> {
        match self {
            ValidationError::ToolCallMissingId { index }
            | ValidationError::ToolCallMissingType { index }
            | ValidationError::ToolCallMissingFunctionName { index } => Some(*index),
            _ => None,
        }
    }
}

/// Check a single message against the admission rules.
///
/// Only the role, the tool-result correlation and the completeness of tool
/// calls are checked. The shape of `content` is deliberately not inspected:
/// empty text, absent content on non-tool roles, part lists and arbitrary JSON
/// values are all admissible. Empty tool-call `arguments` are valid.
pub fn validate_message(message: Option<&Message>) -> Result<(), ValidationError> {
    let message = message.ok_or(ValidationError::NilMessage)?;

    if message.role.is_empty() {
        return Err(ValidationError::EmptyRole);
    }

    match message.role.as_str() {
        TOOL_ROLE => {
            if !message.has_tool_call_id() {
                return Err(ValidationError::MissingToolCallId);
            }
            if !message.has_content() {
                return Err(ValidationError::MissingToolContent);
            }
        }
        ASSISTANT_ROLE => {
            for (index, call) in message.tool_calls.iter().enumerate() {
                if call.id.is_empty() {
                    return Err(ValidationError::ToolCallMissingId { index });
                }
                if call.call_type.is_empty() {
                    return Err(ValidationError::ToolCallMissingType { index });
                }
                if call.function.name.is_empty() {
                    return Err(ValidationError::ToolCallMissingFunctionName { index });
                }
            }
        }
        _ => {}
    }

    Ok(())
}

impl Message {
    /// Validate this message, see [`validate_message`].
    pub fn validate(&self) -> crate::Result<()> {
        validate_message(Some(self))?;
        Ok(())
    }
}

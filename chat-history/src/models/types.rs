use serde::{Deserialize, Deserializer, Serialize};
use serde_json::value::RawValue;

use crate::error::Result;

/// Role tag of the leading instruction message.
pub const SYSTEM_ROLE: &str = "system";
/// Role tag of end-user turns.
pub const USER_ROLE: &str = "user";
/// Role tag of model turns, which may carry tool calls.
pub const ASSISTANT_ROLE: &str = "assistant";
/// Role tag of tool results, correlated through `tool_call_id`.
pub const TOOL_ROLE: &str = "tool";

/// The function a tool call asks the caller to invoke.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    /// Serialized JSON arguments. Empty for zero-parameter functions.
    #[serde(default)]
    pub arguments: String,
}

/// A structured request embedded in an assistant message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    #[serde(rename = "type")]
    pub call_type: String,
    pub function: FunctionCall,
}

impl ToolCall {
    /// Create a `function` tool call.
    pub fn function(
        id: impl Into<String>,
        name: impl Into<String>,
        arguments: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            call_type: "function".to_string(),
            function: FunctionCall {
                name: name.into(),
                arguments: arguments.into(),
            },
        }
    }
}

/// Image reference inside a multimodal content part.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ImageUrl {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// One typed element of a multimodal message body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", deny_unknown_fields)]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

impl ContentPart {
    pub fn text(text: impl Into<String>) -> Self {
        ContentPart::Text { text: text.into() }
    }

    pub fn image_url(url: impl Into<String>) -> Self {
        ContentPart::ImageUrl {
            image_url: ImageUrl {
                url: url.into(),
                detail: None,
            },
        }
    }
}

/// Message payload.
///
/// History management treats this as opaque: it is stored and returned as
/// received, whatever its shape or size. Plain strings and part lists are
/// exposed as typed variants only when they re-encode to exactly the bytes
/// that were received; anything else (unknown part types, extra fields, other
/// key orders, escapes, high-precision numbers) is kept as the raw JSON slice
/// in `Other` and written back verbatim.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
    Other(Box<RawValue>),
}

impl MessageContent {
    /// Classify a raw JSON value, keeping it raw unless a typed variant
    /// reproduces it byte for byte.
    pub fn from_raw(raw: Box<RawValue>) -> Self {
        let json = raw.get();
        if let Ok(text) = serde_json::from_str::<String>(json) {
            if encodes_to(&text, json) {
                return MessageContent::Text(text);
            }
        } else if let Ok(parts) = serde_json::from_str::<Vec<ContentPart>>(json) {
            if encodes_to(&parts, json) {
                return MessageContent::Parts(parts);
            }
        }
        MessageContent::Other(raw)
    }

    /// Returns the text if this is plain string content.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            MessageContent::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Returns the parts if this is multimodal content.
    pub fn as_parts(&self) -> Option<&[ContentPart]> {
        match self {
            MessageContent::Parts(parts) => Some(parts),
            _ => None,
        }
    }

    /// Returns the raw JSON if the content was kept verbatim.
    pub fn as_raw(&self) -> Option<&str> {
        match self {
            MessageContent::Other(raw) => Some(raw.get()),
            _ => None,
        }
    }

    /// True for the empty string and for raw `null` or `""`, all of which
    /// count as absent content. Empty part lists and other values are
    /// considered present.
    pub fn is_empty_text(&self) -> bool {
        match self {
            MessageContent::Text(text) => text.is_empty(),
            MessageContent::Parts(_) => false,
            MessageContent::Other(raw) => serde_json::from_str::<Option<String>>(raw.get())
                .is_ok_and(|text| text.map_or(true, |text| text.is_empty())),
        }
    }
}

fn encodes_to<T: Serialize>(value: &T, json: &str) -> bool {
    serde_json::to_string(value).is_ok_and(|encoded| encoded == json)
}

impl<'de> Deserialize<'de> for MessageContent {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Box::<RawValue>::deserialize(deserializer).map(MessageContent::from_raw)
    }
}

impl PartialEq for MessageContent {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (MessageContent::Text(a), MessageContent::Text(b)) => a == b,
            (MessageContent::Parts(a), MessageContent::Parts(b)) => a == b,
            (MessageContent::Other(a), MessageContent::Other(b)) => a.get() == b.get(),
            _ => false,
        }
    }
}

impl From<Box<RawValue>> for MessageContent {
    fn from(raw: Box<RawValue>) -> Self {
        MessageContent::Other(raw)
    }
}

impl From<String> for MessageContent {
    fn from(text: String) -> Self {
        MessageContent::Text(text)
    }
}

impl From<&str> for MessageContent {
    fn from(text: &str) -> Self {
        MessageContent::Text(text.to_string())
    }
}

impl From<Vec<ContentPart>> for MessageContent {
    fn from(parts: Vec<ContentPart>) -> Self {
        MessageContent::Parts(parts)
    }
}

/// A chat message in OpenAI chat-completions shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<MessageContent>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl Message {
    /// Create a message with the given role and no content.
    pub fn new(role: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            ..Default::default()
        }
    }

    pub fn system(content: impl Into<MessageContent>) -> Self {
        Self::new(SYSTEM_ROLE).with_content(content)
    }

    pub fn user(content: impl Into<MessageContent>) -> Self {
        Self::new(USER_ROLE).with_content(content)
    }

    pub fn assistant(content: impl Into<MessageContent>) -> Self {
        Self::new(ASSISTANT_ROLE).with_content(content)
    }

    /// Assistant turn that only requests tool invocations.
    pub fn assistant_tool_calls(tool_calls: Vec<ToolCall>) -> Self {
        Self::new(ASSISTANT_ROLE).with_tool_calls(tool_calls)
    }

    /// Tool result answering the call identified by `tool_call_id`.
    pub fn tool(tool_call_id: impl Into<String>, content: impl Into<MessageContent>) -> Self {
        Self::new(TOOL_ROLE)
            .with_tool_call_id(tool_call_id)
            .with_content(content)
    }

    pub fn with_content(mut self, content: impl Into<MessageContent>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn with_tool_calls(mut self, tool_calls: Vec<ToolCall>) -> Self {
        self.tool_calls = tool_calls;
        self
    }

    pub fn with_tool_call_id(mut self, tool_call_id: impl Into<String>) -> Self {
        self.tool_call_id = Some(tool_call_id.into());
        self
    }

    pub fn is_system(&self) -> bool {
        self.role == SYSTEM_ROLE
    }

    /// Content is present and is not the empty string.
    pub fn has_content(&self) -> bool {
        self.content
            .as_ref()
            .is_some_and(|content| !content.is_empty_text())
    }

    pub fn has_tool_call_id(&self) -> bool {
        self.tool_call_id.as_deref().is_some_and(|id| !id.is_empty())
    }

    /// Shorthand for the text content, if any.
    pub fn text(&self) -> Option<&str> {
        self.content.as_ref().and_then(MessageContent::as_text)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

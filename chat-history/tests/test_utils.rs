//! Test utilities and helpers for chat-history tests

#![allow(dead_code)]

use std::io;
use std::sync::{Arc, Mutex};

use chat_history::{Message, ToolCall};
use tracing::Level;
use tracing_subscriber::fmt::MakeWriter;

/// Create `count` user messages named `"{prefix} {i}"`.
pub fn user_messages(prefix: &str, count: usize) -> Vec<Message> {
    (0..count)
        .map(|i| Message::user(format!("{} {}", prefix, i)))
        .collect()
}

/// Text contents of `messages`, skipping non-text ones.
pub fn texts(messages: &[Message]) -> Vec<String> {
    messages
        .iter()
        .filter_map(|m| m.text().map(String::from))
        .collect()
}

/// Assistant message requesting a single weather lookup.
pub fn weather_call(id: &str) -> Message {
    Message::assistant_tool_calls(vec![ToolCall::function(
        id,
        "get_weather",
        r#"{"location":"London"}"#,
    )])
}

/// In-memory log sink for asserting on formatted `tracing` output.
#[derive(Debug, Clone, Default)]
pub struct LogCapture {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl LogCapture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Plain-text subscriber writing `level` and above into this capture.
    pub fn subscriber(&self, level: Level) -> impl tracing::Subscriber + Send + Sync {
        tracing_subscriber::fmt()
            .with_writer(self.clone())
            .with_max_level(level)
            .with_ansi(false)
            .finish()
    }

    pub fn contents(&self) -> String {
        let buffer = self.buffer.lock().unwrap();
        String::from_utf8_lossy(&buffer).into_owned()
    }

    pub fn count(&self, needle: &str) -> usize {
        self.contents().matches(needle).count()
    }
}

impl io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogCapture {
    type Writer = LogCapture;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

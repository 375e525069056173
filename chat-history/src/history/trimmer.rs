//! Count-based history trimming.

use std::num::NonZeroUsize;

use crate::config::HistoryConfig;
use crate::models::Message;

/// Maximum number of messages a session retains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HistoryLimit {
    /// No trimming is enforced.
    #[default]
    Unbounded,
    /// Keep at most this many messages.
    Bounded(NonZeroUsize),
}

impl HistoryLimit {
    /// Interpret a configured `max_history_length`. Zero and negative values
    /// mean unbounded.
    pub fn from_max_length(max_history_length: i64) -> Self {
        if max_history_length <= 0 {
            return HistoryLimit::Unbounded;
        }
        let max = usize::try_from(max_history_length).unwrap_or(usize::MAX);
        NonZeroUsize::new(max).map_or(HistoryLimit::Unbounded, HistoryLimit::Bounded)
    }

    /// The bound, or `None` when unbounded.
    pub fn max_len(&self) -> Option<usize> {
        match self {
            HistoryLimit::Unbounded => None,
            HistoryLimit::Bounded(max) => Some(max.get()),
        }
    }

    pub fn is_bounded(&self) -> bool {
        matches!(self, HistoryLimit::Bounded(_))
    }
}

/// Reduces a conversation buffer to a maximum length.
///
/// Drops the oldest messages first. When the buffer is anchored, its first
/// element is the session's original system message and is always kept; the
/// rest of the budget goes to the most recent messages. Surviving messages are
/// never reordered or modified.
///
/// The projection is idempotent: applying it twice with the same limit gives
/// the same result as applying it once.
///
/// # Example
///
/// ```rust
/// use chat_history::history::{HistoryLimit, HistoryTrimmer};
/// use chat_history::models::Message;
///
/// let trimmer = HistoryTrimmer::new(HistoryLimit::from_max_length(3));
///
/// let mut buffer = vec![Message::system("Be brief.")];
/// for i in 0..5 {
///     buffer.push(Message::user(format!("Message {}", i)));
/// }
///
/// let retained = trimmer.apply(&buffer, true);
/// assert_eq!(retained.len(), 3);
/// assert!(retained[0].is_system());
/// assert_eq!(retained[2].text(), Some("Message 4"));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct HistoryTrimmer {
    limit: HistoryLimit,
}

impl HistoryTrimmer {
    pub fn new(limit: HistoryLimit) -> Self {
        Self { limit }
    }

    /// Create from configuration
    pub fn from_config(config: &HistoryConfig) -> Self {
        Self::new(config.limit())
    }

    /// Convert to configuration
    pub fn to_config(&self) -> HistoryConfig {
        let max_history_length = self
            .limit
            .max_len()
            .map_or(0, |max| i64::try_from(max).unwrap_or(i64::MAX));
        HistoryConfig { max_history_length }
    }

    pub fn limit(&self) -> HistoryLimit {
        self.limit
    }

    /// Return the retained subsequence of `buffer`.
    pub fn apply(&self, buffer: &[Message], anchored: bool) -> Vec<Message> {
        trim_history(buffer, self.limit, anchored)
    }

    /// Trim `buffer` in place, returning how many messages were dropped.
    pub fn apply_in_place(&self, buffer: &mut Vec<Message>, anchored: bool) -> usize {
        trim_in_place(buffer, self.limit, anchored)
    }
}

/// Return the messages of `buffer` that survive trimming to `limit`.
///
/// `anchored` must only be set when `buffer[0]` is the session's first-ever
/// admitted message and has the system role; the caller tracks that, since a
/// later system message at the front of the buffer is not an anchor.
pub fn trim_history(buffer: &[Message], limit: HistoryLimit, anchored: bool) -> Vec<Message> {
    let range = retained_range(buffer.len(), limit, anchored);
    let mut retained = Vec::with_capacity(range.len() + usize::from(anchored && range.start > 0));
    if anchored && range.start > 0 {
        retained.push(buffer[0].clone());
    }
    retained.extend_from_slice(&buffer[range]);
    retained
}

pub(crate) fn trim_in_place(buffer: &mut Vec<Message>, limit: HistoryLimit, anchored: bool) -> usize {
    let range = retained_range(buffer.len(), limit, anchored);
    let keep_anchor = anchored && range.start > 0;
    let drop_from = usize::from(keep_anchor);
    let dropped = range.start - drop_from;
    buffer.drain(drop_from..range.start);
    dropped
}

/// Range of the non-anchor tail that survives. Everything before `start`
/// except an anchor at index 0 is dropped.
fn retained_range(len: usize, limit: HistoryLimit, anchored: bool) -> std::ops::Range<usize> {
    let max_len = match limit.max_len() {
        Some(max_len) if len > max_len => max_len,
        _ => return 0..len,
    };
    // len > max_len >= 1, so the buffer is non-empty here.
    let tail = if anchored { max_len - 1 } else { max_len };
    len - tail..len
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounded(max: i64) -> HistoryLimit {
        HistoryLimit::from_max_length(max)
    }

    fn numbered(count: usize) -> Vec<Message> {
        (0..count)
            .map(|i| Message::user(format!("Message {}", i)))
            .collect()
    }

    fn anchored(count: usize) -> Vec<Message> {
        let mut buffer = vec![Message::system("System instructions.")];
        buffer.extend(numbered(count));
        buffer
    }

    fn texts(messages: &[Message]) -> Vec<&str> {
        messages.iter().filter_map(Message::text).collect()
    }

    #[test]
    fn test_limit_from_max_length() {
        assert_eq!(HistoryLimit::from_max_length(0), HistoryLimit::Unbounded);
        assert_eq!(HistoryLimit::from_max_length(-5), HistoryLimit::Unbounded);
        assert_eq!(HistoryLimit::from_max_length(3).max_len(), Some(3));
        assert!(HistoryLimit::from_max_length(1).is_bounded());
    }

    #[test]
    fn test_within_limit_is_identity() {
        let buffer = numbered(3);
        assert_eq!(trim_history(&buffer, bounded(3), false), buffer);
        assert_eq!(trim_history(&buffer, bounded(10), false), buffer);
        assert_eq!(trim_history(&buffer, HistoryLimit::Unbounded, false), buffer);
    }

    #[test]
    fn test_keeps_most_recent_without_anchor() {
        let retained = trim_history(&numbered(20), bounded(5), false);
        assert_eq!(
            texts(&retained),
            vec!["Message 15", "Message 16", "Message 17", "Message 18", "Message 19"]
        );
    }

    #[test]
    fn test_keeps_anchor_and_most_recent() {
        let retained = trim_history(&anchored(20), bounded(5), true);
        assert_eq!(
            texts(&retained),
            vec![
                "System instructions.",
                "Message 16",
                "Message 17",
                "Message 18",
                "Message 19"
            ]
        );
    }

    #[test]
    fn test_anchor_only_when_limit_is_one() {
        let retained = trim_history(&anchored(4), bounded(1), true);
        assert_eq!(retained.len(), 1);
        assert!(retained[0].is_system());
    }

    #[test]
    fn test_unanchored_system_message_is_not_preserved() {
        let buffer = anchored(4);
        let retained = trim_history(&buffer, bounded(2), false);
        assert_eq!(texts(&retained), vec!["Message 2", "Message 3"]);
    }

    #[test]
    fn test_empty_buffer() {
        assert!(trim_history(&[], bounded(3), false).is_empty());
        assert!(trim_history(&[], bounded(1), true).is_empty());
        assert!(trim_history(&[], HistoryLimit::Unbounded, true).is_empty());
    }

    #[test]
    fn test_idempotent() {
        for len in 0..8 {
            for max in 0..8 {
                for is_anchored in [false, true] {
                    let buffer = if is_anchored { anchored(len) } else { numbered(len) };
                    let once = trim_history(&buffer, bounded(max), is_anchored);
                    let twice = trim_history(&once, bounded(max), is_anchored);
                    assert_eq!(once, twice, "len={} max={} anchored={}", len, max, is_anchored);
                }
            }
        }
    }

    #[test]
    fn test_in_place_matches_pure() {
        for len in 0..8 {
            for max in 0..6 {
                let buffer = anchored(len);
                let expected = trim_history(&buffer, bounded(max), true);

                let mut in_place = buffer.clone();
                let dropped = trim_in_place(&mut in_place, bounded(max), true);

                assert_eq!(in_place, expected);
                assert_eq!(dropped, buffer.len() - expected.len());
            }
        }
    }

    #[test]
    fn test_trimmer_config_round_trip() {
        let trimmer = HistoryTrimmer::from_config(&HistoryConfig {
            max_history_length: 7,
        });
        assert_eq!(trimmer.limit().max_len(), Some(7));
        assert_eq!(trimmer.to_config().max_history_length, 7);

        let unbounded = HistoryTrimmer::from_config(&HistoryConfig {
            max_history_length: -1,
        });
        assert_eq!(unbounded.to_config().max_history_length, 0);
    }
}

//! Fold of stream deltas into the one assistant message being built.

use crate::api::StreamDelta;
use crate::core::message::Message;

/// Owns the mutable state of "the answer currently being streamed".
///
/// Text deltas are appended exactly as received, with no trimming or
/// normalization: a single word may arrive split across deltas.
/// Citations are replaced wholesale (last write wins) and persist until
/// the stream explicitly delivers a new list; text deltas never clear
/// them. Holds no history of past deltas.
#[derive(Debug)]
pub struct MessageAccumulator {
    message: Message,
}

impl Default for MessageAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageAccumulator {
    pub fn new() -> Self {
        Self {
            message: Message::assistant(""),
        }
    }

    /// Apply one delta and return an owned snapshot of the merged state.
    ///
    /// Snapshots are independent clones: an observer may render one
    /// asynchronously, so a later delta must never mutate it retroactively.
    pub fn apply_delta(&mut self, delta: &StreamDelta) -> Message {
        if let Some(text) = &delta.text {
            self.message.content.push_str(text);
        }
        if let Some(citations) = &delta.citations {
            self.message.citations = citations.clone();
        }
        self.snapshot()
    }

    pub fn snapshot(&self) -> Message {
        self.message.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Citation;

    fn text_delta(text: &str) -> StreamDelta {
        StreamDelta {
            text: Some(text.to_string()),
            citations: None,
        }
    }

    fn citation(source: &str) -> Citation {
        Citation {
            source: source.to_string(),
            url: format!("https://example.fi/{source}"),
            content: String::new(),
        }
    }

    #[test]
    fn appends_text_preserving_whitespace_and_partial_tokens() {
        let mut accumulator = MessageAccumulator::new();
        accumulator.apply_delta(&text_delta("Resi"));
        accumulator.apply_delta(&text_delta("dence "));
        let snapshot = accumulator.apply_delta(&text_delta(" permit"));
        assert_eq!(snapshot.content, "Residence  permit");
    }

    #[test]
    fn citations_are_replaced_wholesale() {
        let mut accumulator = MessageAccumulator::new();
        accumulator.apply_delta(&StreamDelta {
            text: None,
            citations: Some(vec![citation("a")]),
        });
        let snapshot = accumulator.apply_delta(&StreamDelta {
            text: None,
            citations: Some(vec![citation("b")]),
        });
        assert_eq!(snapshot.citations, vec![citation("b")]);
    }

    #[test]
    fn citations_persist_across_text_deltas() {
        let mut accumulator = MessageAccumulator::new();
        accumulator.apply_delta(&StreamDelta {
            text: None,
            citations: Some(vec![citation("a")]),
        });
        let snapshot = accumulator.apply_delta(&text_delta("more text"));
        assert_eq!(snapshot.citations, vec![citation("a")]);
    }

    #[test]
    fn empty_delta_is_a_no_op() {
        let mut accumulator = MessageAccumulator::new();
        accumulator.apply_delta(&text_delta("answer"));
        let snapshot = accumulator.apply_delta(&StreamDelta::default());
        assert_eq!(snapshot.content, "answer");
        assert!(snapshot.citations.is_empty());
    }

    #[test]
    fn snapshots_are_independent_of_later_deltas() {
        let mut accumulator = MessageAccumulator::new();
        let first = accumulator.apply_delta(&text_delta("Hello"));
        accumulator.apply_delta(&text_delta(" world"));
        assert_eq!(first.content, "Hello");
        assert_eq!(accumulator.snapshot().content, "Hello world");
    }
}

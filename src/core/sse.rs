//! Event-stream framing for the advisor endpoint.
//!
//! The transport hands us the response body in arbitrary chunks: a single
//! event frame may span several chunks and a single chunk may carry several
//! frames. [`FrameSplitter`] reassembles complete frames; [`decode_frame`]
//! turns one frame into a [`FrameEvent`].

use memchr::memmem;

use crate::api::StreamDelta;

/// Payload value the backend sends to mark the end of an answer.
pub const DONE_SENTINEL: &str = "[DONE]";

const FRAME_DELIMITER: &[u8] = b"\n\n";

/// Reassembles blank-line delimited frames from a chunked byte stream.
///
/// Any text after the last delimiter in a chunk is buffered and prepended
/// to the next chunk, so a frame is only ever emitted once and never
/// partially. The one exception is [`FrameSplitter::finish`], which flushes
/// the trailing frame when the stream closes without a final delimiter.
#[derive(Debug, Default)]
pub struct FrameSplitter {
    buffer: Vec<u8>,
}

impl FrameSplitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one transport chunk, returning every frame it completed.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(chunk);

        let mut frames = Vec::new();
        while let Some(pos) = memmem::find(&self.buffer, FRAME_DELIMITER) {
            let frame = String::from_utf8_lossy(&self.buffer[..pos]).into_owned();
            self.buffer.drain(..pos + FRAME_DELIMITER.len());
            if !frame.is_empty() {
                frames.push(frame);
            }
        }
        frames
    }

    /// Flush the residual as the final frame once the transport has ended.
    /// No further data will arrive, so an unterminated frame is complete.
    pub fn finish(&mut self) -> Option<String> {
        if self.buffer.is_empty() {
            return None;
        }
        let frame = String::from_utf8_lossy(&self.buffer).into_owned();
        self.buffer.clear();
        Some(frame)
    }
}

/// What one complete frame meant.
#[derive(Debug, Clone)]
pub enum FrameEvent {
    /// A data frame carrying an increment of the answer.
    Delta(StreamDelta),
    /// The `[DONE]` sentinel: the answer is complete.
    Done,
    /// Comment, keep-alive, unknown event type, or an unparseable payload.
    Ignored,
}

fn extract_data_payload(frame: &str) -> Option<&str> {
    frame.strip_prefix("data:").map(str::trim_start)
}

/// Classify one complete frame.
///
/// Frames that do not start with the `data:` field are skipped, not
/// treated as errors: the protocol may carry comments and keep-alives we
/// do not act on. A payload that fails to parse is also skipped, so one
/// corrupted event cannot lose the rest of an in-progress answer.
pub fn decode_frame(frame: &str) -> FrameEvent {
    let Some(payload) = extract_data_payload(frame) else {
        return FrameEvent::Ignored;
    };

    let payload = payload.trim_end();
    if payload == DONE_SENTINEL {
        return FrameEvent::Done;
    }

    match serde_json::from_str::<StreamDelta>(payload) {
        Ok(delta) => FrameEvent::Delta(delta),
        Err(err) => {
            tracing::warn!("skipping malformed stream event: {err}");
            FrameEvent::Ignored
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn push_str(splitter: &mut FrameSplitter, chunk: &str) -> Vec<String> {
        splitter.push(chunk.as_bytes())
    }

    #[test]
    fn splits_multiple_frames_in_one_chunk() {
        let mut splitter = FrameSplitter::new();
        let frames = push_str(&mut splitter, "data: a\n\ndata: b\n\n");
        assert_eq!(frames, vec!["data: a", "data: b"]);
        assert!(splitter.finish().is_none());
    }

    #[test]
    fn buffers_partial_frame_across_chunks() {
        let mut splitter = FrameSplitter::new();
        assert!(push_str(&mut splitter, "data: {\"text\":\"Hel").is_empty());
        let frames = push_str(&mut splitter, "lo\"}\n\ndata: done\n\n");
        assert_eq!(frames, vec!["data: {\"text\":\"Hello\"}", "data: done"]);
    }

    #[test]
    fn delimiter_split_across_chunks() {
        let mut splitter = FrameSplitter::new();
        assert!(push_str(&mut splitter, "data: a\n").is_empty());
        assert_eq!(push_str(&mut splitter, "\ndata: b\n\n"), vec!["data: a", "data: b"]);
    }

    #[test]
    fn empty_and_delimiter_only_chunks_emit_nothing() {
        let mut splitter = FrameSplitter::new();
        assert!(push_str(&mut splitter, "").is_empty());
        assert!(push_str(&mut splitter, "\n\n").is_empty());
        assert!(push_str(&mut splitter, "\n\n\n\n").is_empty());
        assert!(splitter.finish().is_none());
    }

    #[test]
    fn finish_flushes_trailing_frame() {
        let mut splitter = FrameSplitter::new();
        assert!(push_str(&mut splitter, "data: [DONE]").is_empty());
        assert_eq!(splitter.finish().as_deref(), Some("data: [DONE]"));
        assert!(splitter.finish().is_none());
    }

    #[test]
    fn decodes_text_delta() {
        let event = decode_frame(r#"data: {"text":"Hei!"}"#);
        match event {
            FrameEvent::Delta(delta) => assert_eq!(delta.text.as_deref(), Some("Hei!")),
            other => panic!("expected delta, got {other:?}"),
        }
    }

    #[test]
    fn decodes_spacing_variants() {
        for frame in [r#"data: {"text":"x"}"#, r#"data:{"text":"x"}"#] {
            assert!(matches!(decode_frame(frame), FrameEvent::Delta(_)));
        }
        for frame in ["data: [DONE]", "data:[DONE]", "data: [DONE]\r"] {
            assert!(matches!(decode_frame(frame), FrameEvent::Done));
        }
    }

    #[test]
    fn skips_non_data_frames() {
        assert!(matches!(decode_frame(": keep-alive"), FrameEvent::Ignored));
        assert!(matches!(decode_frame("event: ping"), FrameEvent::Ignored));
        assert!(matches!(decode_frame("retry: 1000"), FrameEvent::Ignored));
    }

    #[test]
    fn skips_malformed_payloads() {
        assert!(matches!(
            decode_frame("data: {not json at all"),
            FrameEvent::Ignored
        ));
    }

    #[test]
    fn unrecognized_payload_fields_yield_empty_delta() {
        match decode_frame(r#"data: {"usage":{"tokens":12}}"#) {
            FrameEvent::Delta(delta) => assert!(delta.is_empty()),
            other => panic!("expected empty delta, got {other:?}"),
        }
    }
}

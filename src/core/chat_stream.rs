//! Streaming consumption of advisor answers.
//!
//! One spawned task per question: it sends the request, reassembles event
//! frames from the chunked response body, folds deltas into the growing
//! assistant message, and publishes a snapshot of that message over the
//! service channel after every change. The observer never sees raw frames
//! or deltas, only `(StreamUpdate, stream_id)` pairs.

use futures_util::{Stream, StreamExt};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::api::{AskRequest, HistoryMessage};
use crate::core::accumulator::MessageAccumulator;
use crate::core::constants::CONNECT_ERROR_MESSAGE;
use crate::core::message::Message;
use crate::core::sse::{decode_frame, FrameEvent, FrameSplitter};
use crate::utils::url::construct_api_url;

#[derive(Clone, Debug)]
pub enum StreamUpdate {
    /// Current state of the assistant message being built. Published once
    /// when streaming begins (the empty placeholder), then after every
    /// applied delta, and for the fallback message on connection failure.
    Snapshot(Message),
    /// The stream is over; nothing further will be published for this id.
    Completed(TerminationReason),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TerminationReason {
    /// The backend sent the `[DONE]` sentinel.
    Done,
    /// The transport ended without a sentinel. Some transports omit it;
    /// this is a normal completion, not an error.
    Closed,
    /// The transport failed. Partial content already published stands.
    Error,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StreamPhase {
    Idle,
    AwaitingFirstChunk,
    Streaming,
    Terminated(TerminationReason),
}

/// Transient state owned by one streaming call: the frame reassembly
/// residual, the accumulating message, and the phase tag. Dropped when the
/// stream ends, errors, or is cancelled.
pub struct StreamState {
    splitter: FrameSplitter,
    accumulator: MessageAccumulator,
    phase: StreamPhase,
}

impl StreamState {
    pub fn new() -> Self {
        Self {
            splitter: FrameSplitter::new(),
            accumulator: MessageAccumulator::new(),
            phase: StreamPhase::Idle,
        }
    }

    pub fn phase(&self) -> StreamPhase {
        self.phase
    }

    pub fn is_terminated(&self) -> bool {
        matches!(self.phase, StreamPhase::Terminated(_))
    }

    fn begin_request(&mut self) {
        self.phase = StreamPhase::AwaitingFirstChunk;
    }

    /// Enter `Streaming` and hand back the empty placeholder snapshot so
    /// the observer can show a pending state before the first delta.
    fn begin_streaming(&mut self) -> Message {
        self.phase = StreamPhase::Streaming;
        self.accumulator.snapshot()
    }

    fn terminate(&mut self, reason: TerminationReason) {
        if !self.is_terminated() {
            self.phase = StreamPhase::Terminated(reason);
        }
    }
}

impl Default for StreamState {
    fn default() -> Self {
        Self::new()
    }
}

fn handle_frame(
    frame: &str,
    state: &mut StreamState,
    tx: &mpsc::UnboundedSender<(StreamUpdate, u64)>,
    stream_id: u64,
) {
    // Frames arriving after termination are discarded.
    if state.is_terminated() {
        return;
    }

    match decode_frame(frame) {
        FrameEvent::Delta(delta) => {
            let snapshot = state.accumulator.apply_delta(&delta);
            let _ = tx.send((StreamUpdate::Snapshot(snapshot), stream_id));
        }
        FrameEvent::Done => {
            state.terminate(TerminationReason::Done);
            let _ = tx.send((StreamUpdate::Completed(TerminationReason::Done), stream_id));
        }
        FrameEvent::Ignored => {}
    }
}

/// Consume the transport chunk stream until termination or cancellation.
///
/// Generic over the chunk source so tests can feed fixed chunk sequences;
/// production passes `response.bytes_stream()`.
async fn drive_stream<S, B, E>(
    mut chunks: S,
    state: &mut StreamState,
    tx: &mpsc::UnboundedSender<(StreamUpdate, u64)>,
    stream_id: u64,
    cancel_token: &CancellationToken,
) where
    S: Stream<Item = Result<B, E>> + Unpin,
    B: AsRef<[u8]>,
    E: std::fmt::Display,
{
    while let Some(chunk) = chunks.next().await {
        if cancel_token.is_cancelled() {
            return;
        }

        let chunk = match chunk {
            Ok(chunk) => chunk,
            Err(err) => {
                warn!("transport failed mid-stream: {err}");
                state.terminate(TerminationReason::Error);
                let _ = tx.send((StreamUpdate::Completed(TerminationReason::Error), stream_id));
                return;
            }
        };

        for frame in state.splitter.push(chunk.as_ref()) {
            handle_frame(&frame, state, tx, stream_id);
            if state.is_terminated() {
                return;
            }
        }
    }

    // Transport ended without a sentinel. The trailing unterminated frame,
    // if any, is complete by definition: no further data will arrive.
    if let Some(frame) = state.splitter.finish() {
        handle_frame(&frame, state, tx, stream_id);
        if state.is_terminated() {
            return;
        }
    }

    state.terminate(TerminationReason::Closed);
    let _ = tx.send((StreamUpdate::Completed(TerminationReason::Closed), stream_id));
}

/// Failure before any data arrived. No assistant message exists yet for
/// this turn, so a single fixed fallback message is published in its place.
fn publish_transport_failure(
    state: &mut StreamState,
    tx: &mpsc::UnboundedSender<(StreamUpdate, u64)>,
    stream_id: u64,
) {
    state.terminate(TerminationReason::Error);
    let fallback = Message::assistant(CONNECT_ERROR_MESSAGE);
    let _ = tx.send((StreamUpdate::Snapshot(fallback), stream_id));
    let _ = tx.send((StreamUpdate::Completed(TerminationReason::Error), stream_id));
}

async fn run_stream(
    client: reqwest::Client,
    server_url: String,
    query: String,
    history: Vec<HistoryMessage>,
    tx: &mpsc::UnboundedSender<(StreamUpdate, u64)>,
    stream_id: u64,
    cancel_token: &CancellationToken,
) {
    let mut state = StreamState::new();
    state.begin_request();

    let ask_url = construct_api_url(&server_url, "api/ask");
    let request = AskRequest { query, history };
    debug!(stream_id, "requesting streamed answer");

    let response = match client.post(ask_url).json(&request).send().await {
        Ok(response) => response,
        Err(err) => {
            warn!("request to advisor backend failed: {err}");
            publish_transport_failure(&mut state, tx, stream_id);
            return;
        }
    };

    if !response.status().is_success() {
        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<no body>".to_string());
        warn!("advisor backend returned {status}: {body}");
        publish_transport_failure(&mut state, tx, stream_id);
        return;
    }

    let placeholder = state.begin_streaming();
    let _ = tx.send((StreamUpdate::Snapshot(placeholder), stream_id));

    drive_stream(response.bytes_stream(), &mut state, tx, stream_id, cancel_token).await;
    debug!(stream_id, phase = ?state.phase(), "stream finished");
}

pub struct StreamParams {
    pub client: reqwest::Client,
    pub server_url: String,
    pub query: String,
    pub history: Vec<HistoryMessage>,
    pub cancel_token: CancellationToken,
    pub stream_id: u64,
}

#[derive(Clone)]
pub struct ChatStreamService {
    tx: mpsc::UnboundedSender<(StreamUpdate, u64)>,
}

impl ChatStreamService {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<(StreamUpdate, u64)>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Start consuming one answer in the background. Cancelling the token
    /// in `params` aborts promptly in any state: before the first chunk,
    /// mid-stream, or after termination (a no-op by then), and drops the
    /// transport with the task.
    pub fn spawn_stream(&self, params: StreamParams) {
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let StreamParams {
                client,
                server_url,
                query,
                history,
                cancel_token,
                stream_id,
            } = params;

            tokio::select! {
                _ = run_stream(client, server_url, query, history, &tx, stream_id, &cancel_token) => {}
                _ = cancel_token.cancelled() => {}
            }
        });
    }
}

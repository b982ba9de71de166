//! Server-Sent Events decoding for streamed chat completions
//!
//! The provider sends `data: {json}` lines separated by blank lines and ends
//! with `data: [DONE]`. Network reads can split a line (or a UTF-8 sequence)
//! anywhere, so bytes are buffered until a newline arrives.

use super::{ChunkStream, ProviderError, StreamChunk};
use futures::{Stream, StreamExt, stream};
use serde::Deserialize;
use std::collections::VecDeque;

/// A decoded SSE line that matters to us
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SseEvent {
    Data(String),
    Done,
}

/// Incremental line decoder
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed raw bytes, returning every complete event they finish
    pub fn push(&mut self, bytes: &[u8]) -> Vec<SseEvent> {
        self.buffer.extend_from_slice(bytes);

        let mut events = Vec::new();
        while let Some(newline) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=newline).collect();
            if let Some(event) = Self::decode_line(&line) {
                events.push(event);
            }
        }
        events
    }

    /// Flush a trailing line that was not newline-terminated
    pub fn finish(&mut self) -> Option<SseEvent> {
        let line = std::mem::take(&mut self.buffer);
        Self::decode_line(&line)
    }

    fn decode_line(line: &[u8]) -> Option<SseEvent> {
        let line = String::from_utf8_lossy(line);
        let line = line.trim();

        // blank separators, comments and non-data fields (event:, id:, retry:)
        let data = line.strip_prefix("data:")?.trim_start();
        if data == "[DONE]" {
            Some(SseEvent::Done)
        } else if data.is_empty() {
            None
        } else {
            Some(SseEvent::Data(data.to_string()))
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChunkBody {
    #[serde(default)]
    choices: Vec<ChunkChoice>,
}

#[derive(Debug, Deserialize)]
struct ChunkChoice {
    #[serde(default)]
    delta: ChunkDelta,
}

#[derive(Debug, Default, Deserialize)]
struct ChunkDelta {
    content: Option<String>,
}

/// Parse one `data:` payload into a chunk
///
/// Chunks without choices (usage reports) become empty chunks.
pub fn parse_chunk(data: &str) -> Result<StreamChunk, ProviderError> {
    let body: ChunkBody = serde_json::from_str(data).map_err(|e| {
        let preview: String = data.chars().take(200).collect();
        ProviderError::MalformedResponse(format!("invalid stream chunk ({}): {}", e, preview))
    })?;

    let delta = body
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.delta.content);
    Ok(StreamChunk { delta })
}

struct DecodeState<S> {
    bytes: S,
    decoder: SseDecoder,
    pending: VecDeque<Result<StreamChunk, ProviderError>>,
    bytes_received: usize,
    finished: bool,
}

impl<S> DecodeState<S> {
    /// Queue decoded events; stops at `[DONE]` or the first bad payload
    fn enqueue(&mut self, events: impl IntoIterator<Item = SseEvent>) {
        for event in events {
            match event {
                SseEvent::Done => {
                    self.finished = true;
                    return;
                }
                SseEvent::Data(data) => {
                    let chunk = parse_chunk(&data);
                    let failed = chunk.is_err();
                    self.pending.push_back(chunk);
                    if failed {
                        self.finished = true;
                        return;
                    }
                }
            }
        }
    }
}

/// Turn a raw byte stream into a stream of completion chunks
///
/// The returned stream ends after `[DONE]`, after the underlying byte stream
/// ends, or right after the first error item.
pub fn decode_stream<S, B, E>(bytes: S) -> ChunkStream
where
    S: Stream<Item = Result<B, E>> + Send + Unpin + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: std::fmt::Display + Send + 'static,
{
    let state = DecodeState {
        bytes,
        decoder: SseDecoder::new(),
        pending: VecDeque::new(),
        bytes_received: 0,
        finished: false,
    };

    let chunks = stream::unfold(state, |mut state| async move {
        loop {
            if let Some(item) = state.pending.pop_front() {
                return Some((item, state));
            }
            if state.finished {
                return None;
            }

            match state.bytes.next().await {
                Some(Ok(bytes)) => {
                    let bytes = bytes.as_ref();
                    state.bytes_received += bytes.len();
                    let events = state.decoder.push(bytes);
                    state.enqueue(events);
                }
                Some(Err(e)) => {
                    tracing::warn!(
                        bytes_received = state.bytes_received,
                        error = %e,
                        "Completion stream interrupted"
                    );
                    state.finished = true;
                    let err = ProviderError::Stream {
                        bytes_received: state.bytes_received,
                        message: e.to_string(),
                    };
                    return Some((Err(err), state));
                }
                None => {
                    let trailing = state.decoder.finish();
                    state.enqueue(trailing);
                    state.finished = true;
                }
            }
        }
    });

    Box::pin(chunks)
}

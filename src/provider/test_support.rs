//! Scripted provider for unit tests

use super::{ChatRequest, ChunkStream, CompletionProvider, ProviderError, StreamChunk};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

type ScriptedStream = Result<Vec<Result<StreamChunk, ProviderError>>, ProviderError>;

/// Replays queued responses and records every request it receives
#[derive(Default)]
pub(crate) struct ScriptedProvider {
    completions: Mutex<VecDeque<Result<String, ProviderError>>>,
    streams: Mutex<VecDeque<ScriptedStream>>,
    requests: Mutex<Vec<(ChatRequest, bool)>>,
}

impl ScriptedProvider {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push_completion(&self, response: Result<String, ProviderError>) {
        self.completions.lock().unwrap().push_back(response);
    }

    pub(crate) fn push_stream(&self, stream: ScriptedStream) {
        self.streams.lock().unwrap().push_back(stream);
    }

    /// Requests seen so far, flagged `true` when streamed
    pub(crate) fn requests(&self) -> Vec<(ChatRequest, bool)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionProvider for ScriptedProvider {
    async fn complete(&self, request: ChatRequest) -> Result<String, ProviderError> {
        self.requests.lock().unwrap().push((request, false));
        self.completions
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ProviderError::Network("no scripted completion".into())))
    }

    async fn stream(&self, request: ChatRequest) -> Result<ChunkStream, ProviderError> {
        self.requests.lock().unwrap().push((request, true));
        let scripted = self
            .streams
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ProviderError::Network("no scripted stream".into())))?;
        Ok(Box::pin(futures::stream::iter(scripted)))
    }
}

//! Shared test doubles for integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::Mutex;
use study_partner::provider::{
    ChatRequest, ChunkStream, CompletionProvider, ProviderError, StreamChunk,
};

/// Replies the way a well-behaved model follows the router prompt
///
/// Classification requests are answered from the text after
/// `[NEW MESSAGE]`: follow-ups like "Why?" are CONTINUATION, everything
/// else is NEW. Streaming requests get `reply` split into words.
pub struct StubProvider {
    reply: String,
    fail_classification: bool,
    requests: Mutex<Vec<(ChatRequest, bool)>>,
}

impl StubProvider {
    pub fn new(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            fail_classification: false,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Classification calls fail with a network error
    pub fn failing_router(reply: &str) -> Self {
        Self {
            fail_classification: true,
            ..Self::new(reply)
        }
    }

    pub fn requests(&self) -> Vec<(ChatRequest, bool)> {
        self.requests.lock().unwrap().clone()
    }

    /// Number of non-streamed (routing) requests
    pub fn classification_calls(&self) -> usize {
        self.requests().iter().filter(|(_, streamed)| !streamed).count()
    }

    /// Requests that produced an answer
    pub fn answer_requests(&self) -> Vec<ChatRequest> {
        self.requests()
            .into_iter()
            .filter(|(_, streamed)| *streamed)
            .map(|(request, _)| request)
            .collect()
    }

    fn classify(prompt: &str) -> &'static str {
        let new_message = prompt
            .split("[NEW MESSAGE]:")
            .nth(1)
            .and_then(|rest| rest.lines().next())
            .unwrap_or_default()
            .trim()
            .trim_matches('"')
            .to_lowercase();

        let follow_ups = ["why", "how so", "give me an example", "explain", "what do you mean"];
        if follow_ups.iter().any(|f| new_message.starts_with(f)) {
            "CONTINUATION"
        } else {
            "NEW"
        }
    }
}

#[async_trait]
impl CompletionProvider for StubProvider {
    async fn complete(&self, request: ChatRequest) -> Result<String, ProviderError> {
        let prompt = request
            .messages
            .last()
            .map(|m| m.content.clone())
            .unwrap_or_default();
        self.requests.lock().unwrap().push((request, false));

        if self.fail_classification {
            return Err(ProviderError::Network("connection refused".to_string()));
        }
        Ok(Self::classify(&prompt).to_string())
    }

    async fn stream(&self, request: ChatRequest) -> Result<ChunkStream, ProviderError> {
        self.requests.lock().unwrap().push((request, true));

        let chunks: Vec<Result<StreamChunk, ProviderError>> = self
            .reply
            .split_inclusive(' ')
            .map(|word| Ok(StreamChunk::text(word)))
            .collect();
        Ok(Box::pin(futures::stream::iter(chunks)))
    }
}

/// Surface that keeps everything it is asked to show
#[derive(Default)]
pub struct RecordingSurface {
    pub fragments: Vec<String>,
    pub errors: Vec<String>,
    pub planning_prompts: Vec<String>,
}

impl study_partner::surface::ChatSurface for RecordingSurface {
    fn render_message(&mut self, _role: study_partner::conversation::Role, _content: &str) {}

    fn render_fragment(&mut self, fragment: &str) {
        self.fragments.push(fragment.to_string());
    }

    fn render_error(&mut self, text: &str) {
        self.errors.push(text.to_string());
    }

    fn render_notice(&mut self, _text: &str) {}

    fn render_planning_prompt(&mut self, question: &str) {
        self.planning_prompts.push(question.to_string());
    }
}

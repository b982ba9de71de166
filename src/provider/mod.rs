//! Completion provider boundary
//!
//! `CompletionProvider` is the seam between the tutoring logic and the hosted
//! chat-completion service. The HTTP implementation lives in [`openai`]; tests
//! substitute scripted providers.

pub mod openai;
pub mod sse;
#[cfg(test)]
pub(crate) mod test_support;

pub use openai::OpenAiCompatClient;

use crate::conversation::Message;
use async_trait::async_trait;
use futures::Stream;
use std::pin::Pin;

/// Errors raised while talking to the completion provider
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProviderError {
    /// Connection refused, DNS failure, TLS failure, etc.
    #[error("Network error: {0}")]
    Network(String),

    /// Provider answered with a non-success HTTP status (auth, rate limit, 5xx)
    #[error("Provider returned HTTP {status}: {message}")]
    Api { status: u16, message: String },

    /// Response body was not the expected chat-completion shape
    #[error("Malformed provider response: {0}")]
    MalformedResponse(String),

    /// Stream broke after it had started
    #[error("Stream interrupted after {bytes_received} bytes: {message}")]
    Stream {
        bytes_received: usize,
        message: String,
    },

    /// Stream completed without producing any text
    #[error("Provider returned an empty completion")]
    EmptyCompletion,

    #[error("Provider did not respond within {timeout_seconds} seconds")]
    Timeout { timeout_seconds: u64 },
}

/// One chat-completion request
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

impl ChatRequest {
    pub fn new(model: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            model: model.into(),
            messages,
            temperature: None,
            max_tokens: None,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

/// Incremental piece of a streamed completion
///
/// `delta` is `None` for chunks that carry no text (role announcement,
/// finish reason).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StreamChunk {
    pub delta: Option<String>,
}

impl StreamChunk {
    pub fn text(delta: impl Into<String>) -> Self {
        Self {
            delta: Some(delta.into()),
        }
    }

    pub fn empty() -> Self {
        Self { delta: None }
    }
}

/// Lazy, single-pass sequence of stream chunks
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<StreamChunk, ProviderError>> + Send>>;

/// A hosted chat-completion service
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Run a non-streaming completion and return the full text
    async fn complete(&self, request: ChatRequest) -> Result<String, ProviderError>;

    /// Start a streaming completion
    ///
    /// Errors that occur before the first byte are returned directly; later
    /// errors arrive as an `Err` item and end the stream.
    async fn stream(&self, request: ChatRequest) -> Result<ChunkStream, ProviderError>;
}

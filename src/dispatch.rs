//! Response dispatch
//!
//! Sends the conversation to the provider as a streaming request and exposes
//! the reply as a lazy sequence of non-empty text fragments.

use crate::conversation::Message;
use crate::provider::{ChatRequest, CompletionProvider, ProviderError};
use futures::{Stream, StreamExt, future};
use std::pin::Pin;
use std::sync::Arc;

/// Single-pass stream of reply fragments in arrival order
///
/// The first `Err` item is also the last item.
pub type FragmentStream = Pin<Box<dyn Stream<Item = Result<String, ProviderError>> + Send>>;

/// Streams assistant replies from the completion provider
pub struct ResponseDispatcher {
    provider: Arc<dyn CompletionProvider>,
    model: String,
}

impl ResponseDispatcher {
    pub fn new(provider: Arc<dyn CompletionProvider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
        }
    }

    /// Stream a reply to the full history, sent verbatim
    pub async fn answer(&self, history: &[Message]) -> Result<FragmentStream, ProviderError> {
        self.start(history.to_vec()).await
    }

    /// Stream a reply to the history plus one trailing user instruction
    ///
    /// The instruction goes out with this request only; the caller's history
    /// is not modified.
    pub async fn answer_with_instruction(
        &self,
        history: &[Message],
        instruction: &str,
    ) -> Result<FragmentStream, ProviderError> {
        let mut messages = history.to_vec();
        messages.push(Message::user(instruction));
        self.start(messages).await
    }

    async fn start(&self, messages: Vec<Message>) -> Result<FragmentStream, ProviderError> {
        tracing::debug!(
            model = %self.model,
            messages = messages.len(),
            "Dispatching streaming completion"
        );

        let chunks = self
            .provider
            .stream(ChatRequest::new(self.model.clone(), messages))
            .await?;

        Ok(fragments(chunks))
    }
}

/// Drop chunks without text and stop right after the first error
pub fn fragments<S>(chunks: S) -> FragmentStream
where
    S: Stream<Item = Result<crate::provider::StreamChunk, ProviderError>> + Send + 'static,
{
    let mut failed = false;
    let fragments = chunks
        .take_while(move |item| {
            let keep = !failed;
            failed |= item.is_err();
            future::ready(keep)
        })
        .filter_map(|item| {
            future::ready(match item {
                Ok(chunk) => chunk.delta.filter(|text| !text.is_empty()).map(Ok),
                Err(e) => Some(Err(e)),
            })
        });

    Box::pin(fragments)
}

/// Concatenate a fragment stream, failing on the first error
pub async fn collect_text(mut fragments: FragmentStream) -> Result<String, ProviderError> {
    let mut text = String::new();
    while let Some(fragment) = fragments.next().await {
        text.push_str(&fragment?);
    }
    Ok(text)
}

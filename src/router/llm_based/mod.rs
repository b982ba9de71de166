//! LLM-based topic router
//!
//! Asks the completion provider, at zero temperature and with a tiny output
//! cap, whether a new message is NEW or a CONTINUATION of the last exchange.
//! Any failure along the way falls back to [`RoutingDecision::FAIL_SAFE`].

use crate::config::RouterConfig;
use crate::conversation::Message;
use crate::provider::{ChatRequest, CompletionProvider, ProviderError};
use crate::router::RoutingDecision;
use std::sync::Arc;
use std::time::Duration;

/// Errors specific to topic classification
///
/// Split into provider failures (the call itself went wrong) and malformed
/// classifications (the call succeeded but the answer is unusable).
#[derive(Debug, thiserror::Error)]
pub enum RouterError {
    /// Network, auth, rate limit or malformed HTTP body
    #[error("Router query failed: {0}")]
    Provider(#[from] ProviderError),

    /// Router query did not finish in time
    #[error("Router query timed out after {timeout_seconds}s")]
    Timeout { timeout_seconds: u64 },

    /// Router LLM returned nothing
    #[error(
        "Router LLM returned empty response. Expected one of: NEW or CONTINUATION."
    )]
    EmptyResponse,

    /// Router LLM returned text with neither keyword
    ///
    /// The `response` field contains a truncated preview (max 500 chars).
    #[error("Router LLM returned unparseable response ({response_length} bytes): {response}")]
    UnparseableResponse {
        response: String,
        response_length: usize,
    },

    /// Router LLM produced far more than one word
    #[error(
        "Router response exceeded {max_size} bytes (got {size} bytes). LLM not following instructions."
    )]
    SizeExceeded { size: usize, max_size: usize },
}

impl RouterError {
    /// True when the provider answered but the answer could not be used
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            RouterError::EmptyResponse
                | RouterError::UnparseableResponse { .. }
                | RouterError::SizeExceeded { .. }
        )
    }
}

/// Maximum size for router LLM response (bytes)
///
/// Expected answers are one word ("NEW" or "CONTINUATION"). Anything past
/// 1KB means the model ignored its instructions.
pub const MAX_ROUTER_RESPONSE: usize = 1024;

/// Longest slice of any single message quoted into the router prompt
const MAX_QUOTED_CHARS: usize = 500;

/// LLM-powered topic router
pub struct TopicRouter {
    provider: Arc<dyn CompletionProvider>,
    model: String,
    settings: RouterConfig,
}

impl TopicRouter {
    /// Create a router that queries `model` through `provider`
    pub fn new(
        provider: Arc<dyn CompletionProvider>,
        model: impl Into<String>,
        settings: RouterConfig,
    ) -> Self {
        Self {
            provider,
            model: model.into(),
            settings,
        }
    }

    /// Classify `new_prompt` against the tail of `history`
    ///
    /// Never fails: every error kind is mapped to the fail-safe decision.
    /// `history` must not yet contain `new_prompt` itself.
    pub async fn classify(&self, history: &[Message], new_prompt: &str) -> RoutingDecision {
        match self.try_classify(history, new_prompt).await {
            Ok(decision) => decision,
            Err(e) => Self::fail_safe(&e),
        }
    }

    /// Decision to use when classification failed
    pub fn fail_safe(error: &RouterError) -> RoutingDecision {
        match error {
            RouterError::Provider(_) | RouterError::Timeout { .. } => {
                tracing::warn!(
                    error = %error,
                    fallback = RoutingDecision::FAIL_SAFE.as_str(),
                    "Topic router provider failure, using fail-safe decision"
                );
            }
            RouterError::EmptyResponse
            | RouterError::UnparseableResponse { .. }
            | RouterError::SizeExceeded { .. } => {
                tracing::warn!(
                    error = %error,
                    fallback = RoutingDecision::FAIL_SAFE.as_str(),
                    "Topic router returned malformed classification, using fail-safe decision"
                );
            }
        }
        RoutingDecision::FAIL_SAFE
    }

    /// Fallible form of [`classify`](Self::classify)
    ///
    /// Empty history short-circuits to `NewTopic` without a provider call.
    pub async fn try_classify(
        &self,
        history: &[Message],
        new_prompt: &str,
    ) -> Result<RoutingDecision, RouterError> {
        if history.is_empty() {
            tracing::debug!("Empty history, classifying as new topic without a router query");
            return Ok(RoutingDecision::NewTopic);
        }

        let context = Self::context_window(history, self.settings.context_window());
        let router_prompt = Self::build_router_prompt(context, new_prompt);

        tracing::debug!(
            prompt_length = router_prompt.len(),
            context_messages = context.len(),
            "Built router prompt for topic classification"
        );

        let request = ChatRequest::new(self.model.clone(), vec![Message::user(router_prompt)])
            .with_temperature(self.settings.temperature())
            .with_max_tokens(self.settings.max_tokens());

        let timeout_seconds = self.settings.timeout_seconds();
        let response = tokio::time::timeout(
            Duration::from_secs(timeout_seconds),
            self.provider.complete(request),
        )
        .await
        .map_err(|_elapsed| RouterError::Timeout { timeout_seconds })??;

        if response.len() > MAX_ROUTER_RESPONSE {
            return Err(RouterError::SizeExceeded {
                size: response.len(),
                max_size: MAX_ROUTER_RESPONSE,
            });
        }

        tracing::debug!(response = %response, "Received router decision from LLM");

        let decision = Self::parse_classification(&response)?;
        tracing::info!(
            decision = decision.as_str(),
            history_len = history.len(),
            "Topic router decision"
        );
        Ok(decision)
    }

    /// The last `window` messages of `history`
    pub fn context_window(history: &[Message], window: usize) -> &[Message] {
        &history[history.len().saturating_sub(window)..]
    }

    /// Build the classification prompt
    ///
    /// Quoted text is truncated on char boundaries to keep the prompt short
    /// and to limit what a pasted message can inject.
    pub fn build_router_prompt(context: &[Message], new_prompt: &str) -> String {
        let context_lines: Vec<String> = context
            .iter()
            .map(|m| format!("{}: {}", m.role, truncate_chars(&m.content, MAX_QUOTED_CHARS)))
            .collect();

        format!(
            "Analyze the conversation context and the new user message.\n\n\
             [CONTEXT]:\n{}\n\n\
             [NEW MESSAGE]: \"{}\"\n\n\
             Task: Classify the [NEW MESSAGE] as \"NEW\" or \"CONTINUATION\".\n\n\
             Rules:\n\
             1. CONTINUATION: the user asks for elaboration, an example, a simpler explanation, \
             or a reason about the exact subject of the last reply \
             (e.g. \"Give me an example of that\", \"Why does it happen?\", \"Explain simpler\").\n\
             2. NEW: the user asks to define, name, or introduce a concept or term \
             (e.g. \"What is Genetic Variation?\", \"Define Mutation\", \"How does Speciation work?\").\n\n\
             A message of the form \"What is [Concept]?\" or \"Define [Concept]\" is ALWAYS NEW, \
             even if that concept was mentioned before.\n\n\
             Respond with ONLY one word: NEW or CONTINUATION.",
            context_lines.join("\n"),
            truncate_chars(new_prompt, MAX_QUOTED_CHARS)
        )
    }

    /// Parse the router LLM's answer
    ///
    /// Case-insensitive. Any answer containing `NEW` is a new topic; otherwise
    /// an answer containing `CONTINUATION` is a continuation. Everything else
    /// is an error so the caller applies the fail-safe decision.
    pub fn parse_classification(response: &str) -> Result<RoutingDecision, RouterError> {
        let normalized = response.trim().to_uppercase();

        if normalized.is_empty() {
            return Err(RouterError::EmptyResponse);
        }

        if normalized.contains("NEW") {
            return Ok(RoutingDecision::NewTopic);
        }

        if normalized.contains("CONTINUATION") {
            return Ok(RoutingDecision::Continuation);
        }

        tracing::error!(
            response = %response,
            response_length = response.len(),
            "Router LLM returned unparseable response - cannot extract NEW or CONTINUATION"
        );

        Err(RouterError::UnparseableResponse {
            response: truncate_chars(response, MAX_QUOTED_CHARS),
            response_length: response.len(),
        })
    }
}

/// Truncate to at most `max_chars` chars, marking the cut
fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        let truncated: String = text.chars().take(max_chars).collect();
        format!("{}... [truncated]", truncated)
    } else {
        text.to_string()
    }
}

// Test modules
#[cfg(test)]
mod error_type_tests;
#[cfg(test)]
mod prompt_tests;
#[cfg(test)]
mod size_limit_tests;

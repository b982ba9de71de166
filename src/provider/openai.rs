//! OpenAI-compatible chat completions client
//!
//! Works against any `/chat/completions` endpoint that speaks the OpenAI wire
//! format (Groq by default). Supports blocking and SSE streaming responses.

use super::sse::decode_stream;
use super::{ChatRequest, ChunkStream, CompletionProvider, ProviderError};
use crate::config::ProviderConfig;
use crate::credentials::ApiKey;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

/// Connection establishment limit, separate from the per-request timeout
const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Longest error body kept in `ProviderError::Api`
const MAX_ERROR_BODY_CHARS: usize = 500;

/// HTTP client for an OpenAI-compatible completion API
pub struct OpenAiCompatClient {
    http: reqwest::Client,
    base_url: String,
    api_key: ApiKey,
    request_timeout: Duration,
}

impl OpenAiCompatClient {
    /// Build a client from provider settings and a resolved key
    pub fn new(config: &ProviderConfig, api_key: ApiKey) -> Result<Self, ProviderError> {
        let request_timeout = Duration::from_secs(config.request_timeout_seconds());

        // read_timeout bounds every socket read, so a stalled stream fails
        // even though streamed requests carry no total deadline
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .read_timeout(request_timeout)
            .build()
            .map_err(|e| ProviderError::Network(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.base_url().trim_end_matches('/').to_string(),
            api_key,
            request_timeout,
        })
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    /// Request body in OpenAI chat-completions format
    pub fn build_request_body(request: &ChatRequest, stream: bool) -> serde_json::Value {
        let mut body = serde_json::json!({
            "model": request.model,
            "messages": request.messages,
            "stream": stream,
        });

        if let Some(temperature) = request.temperature {
            body["temperature"] = serde_json::json!(temperature);
        }
        if let Some(max_tokens) = request.max_tokens {
            body["max_tokens"] = serde_json::json!(max_tokens);
        }

        body
    }

    fn send_error(&self, e: reqwest::Error) -> ProviderError {
        if e.is_timeout() {
            ProviderError::Timeout {
                timeout_seconds: self.request_timeout.as_secs(),
            }
        } else {
            ProviderError::Network(e.to_string())
        }
    }

    async fn post(
        &self,
        request: &ChatRequest,
        stream: bool,
    ) -> Result<reqwest::Response, ProviderError> {
        let body = Self::build_request_body(request, stream);

        let mut builder = self
            .http
            .post(self.completions_url())
            .bearer_auth(self.api_key.expose())
            .json(&body);

        // A streamed answer may run longer than one request timeout in total
        if !stream {
            builder = builder.timeout(self.request_timeout);
        }

        let response = builder.send().await.map_err(|e| self.send_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message: String = text.chars().take(MAX_ERROR_BODY_CHARS).collect();
            tracing::warn!(
                status = status.as_u16(),
                model = %request.model,
                stream = stream,
                "Completion provider returned error status"
            );
            return Err(ProviderError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response)
    }
}

#[derive(Debug, Deserialize)]
struct CompletionBody {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    content: Option<String>,
}

#[async_trait]
impl CompletionProvider for OpenAiCompatClient {
    async fn complete(&self, request: ChatRequest) -> Result<String, ProviderError> {
        tracing::debug!(
            model = %request.model,
            messages = request.messages.len(),
            "Sending completion request"
        );

        let response = self.post(&request, false).await?;
        let body: CompletionBody = response.json().await.map_err(|e| {
            if e.is_timeout() {
                self.send_error(e)
            } else {
                ProviderError::MalformedResponse(e.to_string())
            }
        })?;

        let choice = body.choices.into_iter().next().ok_or_else(|| {
            ProviderError::MalformedResponse("completion has no choices".to_string())
        })?;

        Ok(choice.message.content.unwrap_or_default())
    }

    async fn stream(&self, request: ChatRequest) -> Result<ChunkStream, ProviderError> {
        tracing::debug!(
            model = %request.model,
            messages = request.messages.len(),
            "Sending streaming completion request"
        );

        let response = self.post(&request, true).await?;
        Ok(decode_stream(Box::pin(response.bytes_stream())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::Message;

    #[test]
    fn test_request_body_includes_optional_sampling() {
        let request = ChatRequest::new("llama", vec![Message::user("hi")])
            .with_temperature(0.0)
            .with_max_tokens(5);
        let body = OpenAiCompatClient::build_request_body(&request, false);

        assert_eq!(body["model"], "llama");
        assert_eq!(body["stream"], false);
        assert_eq!(body["temperature"], 0.0);
        assert_eq!(body["max_tokens"], 5);
        assert_eq!(
            body["messages"],
            serde_json::json!([{"role": "user", "content": "hi"}])
        );
    }

    #[test]
    fn test_request_body_omits_unset_sampling() {
        let request = ChatRequest::new("llama", vec![Message::assistant("hello")]);
        let body = OpenAiCompatClient::build_request_body(&request, true);

        assert_eq!(body["stream"], true);
        assert!(body.get("temperature").is_none());
        assert!(body.get("max_tokens").is_none());
    }

    #[test]
    fn test_completions_url_strips_trailing_slash() {
        let config: crate::config::Config =
            toml::from_str("[provider]\nbase_url = \"http://localhost:9/v1/\"\n").unwrap();
        let client =
            OpenAiCompatClient::new(&config.provider, ApiKey::new("k").unwrap()).unwrap();
        assert_eq!(
            client.completions_url(),
            "http://localhost:9/v1/chat/completions"
        );
    }
}

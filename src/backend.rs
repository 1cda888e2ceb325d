//! HTTP client for the assistant completion backend
//!
//! Posts the transcript, mode, and system instruction to the configured
//! chat endpoint and resolves the response text. The route contract is a
//! single JSON POST; the body coming back carries either `response` or
//! `error`. There is no automatic retry; the user re-initiates a failed
//! cycle.

use crate::config::BackendConfig;
use crate::error::AssistantError;
use crate::events::{AssistantEvent, EventSender};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Request body for the chat completion endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionRequest {
    /// The user's transcript
    pub message: String,
    /// Selected mode id
    pub mode: String,
    /// System instruction resolved from the mode catalog
    pub system_prompt: String,
    /// Credential forwarded to the provider
    pub api_key: String,
}

/// Response body from the chat completion endpoint
#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    response: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Dispatch seam between the controller and the completion service.
///
/// `submit` must not block; the result arrives later as
/// [`AssistantEvent::Backend`] tagged with the same cycle token.
pub trait AssistantBackend {
    fn submit(&self, request: CompletionRequest, cycle: u64, events: EventSender);
}

/// HTTP chat completion client
#[derive(Debug, Clone)]
pub struct ChatBackend {
    endpoint: String,
    client: reqwest::Client,
    timeout: Duration,
    runtime: tokio::runtime::Handle,
}

impl ChatBackend {
    /// Create a client from backend configuration, spawning requests on the
    /// given runtime.
    pub fn new(config: &BackendConfig, runtime: tokio::runtime::Handle) -> Self {
        let timeout = Duration::from_secs(config.timeout_secs);
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();

        Self {
            endpoint: config.endpoint.clone(),
            client,
            timeout,
            runtime,
        }
    }

    /// Get the configured timeout
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Resolve a completion request to response text.
    ///
    /// Preconditions are checked before any network activity: a missing
    /// credential or empty transcript fails locally.
    pub async fn complete(&self, request: &CompletionRequest) -> Result<String, AssistantError> {
        if request.api_key.trim().is_empty() {
            return Err(AssistantError::MissingCredential);
        }
        if request.message.trim().is_empty() {
            return Err(AssistantError::Validation(
                "Message cannot be empty".to_string(),
            ));
        }

        tracing::debug!(
            "Sending completion request (mode: {}, {} chars)",
            request.mode,
            request.message.len()
        );

        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AssistantError::NetworkFailure(format!(
                        "request timed out after {} seconds",
                        self.timeout.as_secs()
                    ))
                } else {
                    AssistantError::NetworkFailure(e.to_string())
                }
            })?;

        let status = response.status();
        let body: CompletionResponse = response.json().await.unwrap_or(CompletionResponse {
            response: None,
            error: None,
        });

        if !status.is_success() {
            let detail = body
                .error
                .unwrap_or_else(|| format!("server returned status {}", status.as_u16()));
            return Err(AssistantError::BackendFailure(detail));
        }

        match body.response {
            Some(text) => Ok(text),
            None => Err(AssistantError::BackendFailure(
                body.error
                    .unwrap_or_else(|| "response body had no response text".to_string()),
            )),
        }
    }
}

impl AssistantBackend for ChatBackend {
    fn submit(&self, request: CompletionRequest, cycle: u64, events: EventSender) {
        let backend = self.clone();
        self.runtime.spawn(async move {
            let result = backend.complete(&request).await;
            if let Err(ref e) = result {
                tracing::warn!("Completion request for cycle {} failed: {}", cycle, e);
            }
            let _ = events.send(AssistantEvent::Backend { cycle, result });
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BackendConfig;

    fn test_backend() -> ChatBackend {
        let runtime = tokio::runtime::Handle::current();
        ChatBackend::new(&BackendConfig::default(), runtime)
    }

    fn request(message: &str, api_key: &str) -> CompletionRequest {
        CompletionRequest {
            message: message.to_string(),
            mode: "general".to_string(),
            system_prompt: "You are a helpful voice assistant.".to_string(),
            api_key: api_key.to_string(),
        }
    }

    #[test]
    fn test_request_serialisation_uses_camel_case() {
        let json = serde_json::to_string(&request("hello", "sk-test")).unwrap();
        assert!(json.contains("\"message\":\"hello\""));
        assert!(json.contains("\"systemPrompt\""));
        assert!(json.contains("\"apiKey\":\"sk-test\""));
    }

    #[test]
    fn test_response_deserialisation() {
        let ok: CompletionResponse =
            serde_json::from_str(r#"{"response": "Lights are on."}"#).unwrap();
        assert_eq!(ok.response.as_deref(), Some("Lights are on."));
        assert!(ok.error.is_none());

        let err: CompletionResponse =
            serde_json::from_str(r#"{"error": "model overloaded"}"#).unwrap();
        assert!(err.response.is_none());
        assert_eq!(err.error.as_deref(), Some("model overloaded"));
    }

    #[tokio::test]
    async fn test_missing_credential_fails_before_network() {
        let backend = test_backend();
        let result = backend.complete(&request("hello", "")).await;
        assert!(matches!(result, Err(AssistantError::MissingCredential)));
    }

    #[tokio::test]
    async fn test_blank_credential_fails_before_network() {
        let backend = test_backend();
        let result = backend.complete(&request("hello", "   ")).await;
        assert!(matches!(result, Err(AssistantError::MissingCredential)));
    }

    #[tokio::test]
    async fn test_empty_message_fails_before_network() {
        let backend = test_backend();
        let result = backend.complete(&request("", "sk-test")).await;
        assert!(matches!(result, Err(AssistantError::Validation(_))));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_network_failure() {
        let config = BackendConfig {
            // Reserved TEST-NET address, nothing listens here
            endpoint: "http://192.0.2.1:9/api/chat".to_string(),
            api_key: String::new(),
            timeout_secs: 1,
        };
        let backend = ChatBackend::new(&config, tokio::runtime::Handle::current());
        let result = backend.complete(&request("hello", "sk-test")).await;
        assert!(matches!(result, Err(AssistantError::NetworkFailure(_))));
    }
}

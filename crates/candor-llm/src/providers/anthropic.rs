//! Anthropic Claude provider.
//!
//! Talks to the Messages API. The system prompt is lifted out of the
//! conversation into the top-level `system` field, as the API requires.

use async_trait::async_trait;
use backon::{ExponentialBuilder, Retryable};
use candor_chat::{Message, Role};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{message_text, wire_role};
use crate::completer::{ChatCompleter, CompletionError};

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com/v1";
const DEFAULT_MODEL: &str = "claude-sonnet-4-5";
const API_VERSION: &str = "2023-06-01";

/// Anthropic Claude client.
///
/// The API key is held as a [`SecretString`]: it never appears in `Debug`
/// output and is exposed only when the request headers are built.
pub struct Anthropic {
    client: reqwest::Client,
    api_key: SecretString,
    model: String,
    temperature: f64,
    top_p: f64,
    max_tokens: u32,
    base_url: String,
    timeout: Duration,
}

impl std::fmt::Debug for Anthropic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Anthropic")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl Anthropic {
    /// Create a client with default generation parameters.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: SecretString::from(api_key.into()),
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.1,
            top_p: 1.0,
            max_tokens: 1024,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Set the model to use.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the generation temperature (0.0-1.0).
    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set top-p sampling (0.0-1.0).
    pub fn with_top_p(mut self, top_p: f64) -> Self {
        self.top_p = top_p;
        self
    }

    /// Set the maximum number of response tokens.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Set a custom API base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn build_request(&self, msgs: &[Message]) -> Result<AnthropicRequest, CompletionError> {
        // The Messages API takes the system prompt out-of-band.
        let mut system = None;
        let mut api_messages = Vec::with_capacity(msgs.len());

        for msg in msgs {
            let role = wire_role(msg.sender)?;
            let text = message_text(msg)?;

            if msg.sender == Role::System {
                if system.is_none() {
                    system = Some(text.to_string());
                }
                continue;
            }

            api_messages.push(AnthropicMessage {
                role: role.to_string(),
                content: vec![ContentBlock::Text {
                    text: text.to_string(),
                }],
            });
        }

        Ok(AnthropicRequest {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            system,
            messages: api_messages,
            temperature: self.temperature,
            top_p: self.top_p,
        })
    }

    async fn send_request(
        &self,
        request: &AnthropicRequest,
    ) -> Result<AnthropicResponse, CompletionError> {
        let response = self
            .client
            .post(format!("{}/messages", self.base_url))
            .header("x-api-key", self.api_key.expose_secret())
            .header("anthropic-version", API_VERSION)
            .header("content-type", "application/json")
            .timeout(self.timeout)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    CompletionError::Timeout(self.timeout)
                } else {
                    CompletionError::Http(e.to_string())
                }
            })?;

        let status = response.status();

        if status == 429 {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .map(Duration::from_secs);
            return Err(CompletionError::RateLimited { retry_after });
        }

        if !status.is_success() {
            let error_body = response
                .json::<AnthropicError>()
                .await
                .map_err(|e| CompletionError::Parse(e.to_string()))?;

            return Err(CompletionError::Api {
                status: status.as_u16(),
                message: error_body.error.message,
            });
        }

        response
            .json()
            .await
            .map_err(|e| CompletionError::Parse(e.to_string()))
    }
}

/// Messages API request format.
#[derive(Debug, Serialize)]
struct AnthropicRequest {
    model: String,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<AnthropicMessage>,
    temperature: f64,
    top_p: f64,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage {
    role: String,
    content: Vec<ContentBlock>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    Text { text: String },
}

/// Messages API response format.
#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    content: Vec<ContentBlockResponse>,
}

#[derive(Debug, Deserialize)]
struct ContentBlockResponse {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AnthropicError {
    error: AnthropicErrorDetail,
}

#[derive(Debug, Deserialize)]
struct AnthropicErrorDetail {
    message: String,
}

#[async_trait]
impl ChatCompleter for Anthropic {
    async fn complete(&self, msgs: &[Message]) -> Result<Message, CompletionError> {
        let request = self.build_request(msgs)?;

        let body = (|| async { self.send_request(&request).await })
            .retry(ExponentialBuilder::default().with_max_times(2))
            .when(CompletionError::is_transient)
            .notify(|err, dur| {
                tracing::warn!(error = %err, backoff = ?dur, "retrying anthropic request");
            })
            .await?;

        let text = body
            .content
            .into_iter()
            .filter_map(|block| block.text)
            .collect::<Vec<_>>()
            .join("");

        Ok(Message::assistant(text))
    }

    fn name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use candor_chat::{Content, Select};

    #[test]
    fn test_api_key_not_in_debug_output() {
        let secret = "sk-ant-super-secret-key";
        let client = Anthropic::new(secret);
        let debug_output = format!("{:?}", client);
        assert!(!debug_output.contains(secret));
    }

    #[test]
    fn test_system_prompt_lifted_out_of_band() {
        let client = Anthropic::new("key");
        let msgs = vec![
            Message::system("be brief"),
            Message::user("hello"),
            Message::assistant("hi"),
        ];

        let request = client.build_request(&msgs).unwrap();
        assert_eq!(request.system.as_deref(), Some("be brief"));
        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.messages[0].role, "user");
        assert_eq!(request.messages[1].role, "assistant");
    }

    #[test]
    fn test_undefined_role_rejected() {
        let client = Anthropic::new("key");
        let msgs = vec![Message::new(Role::Undefined, "orphan")];

        let err = client.build_request(&msgs).unwrap_err();
        assert!(matches!(err, CompletionError::UnsupportedRole { .. }));
    }

    #[test]
    fn test_interactive_content_rejected() {
        let client = Anthropic::new("key");
        let msgs = vec![Message::new(
            Role::User,
            Content::Select(Select {
                header: "pick".into(),
                items: vec![],
            }),
        )];

        let err = client.build_request(&msgs).unwrap_err();
        assert!(matches!(
            err,
            CompletionError::UnsupportedContent { kind: "select" }
        ));
    }
}

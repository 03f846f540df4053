//! OpenAI chat completions provider.
//!
//! Also serves DeepSeek and Mistral, whose chat APIs are wire-compatible
//! with `/chat/completions`; only the base URL, default model, and label
//! differ. Use the [`OpenAi::deepseek`] and [`OpenAi::mistral`] constructors.

use async_trait::async_trait;
use backon::{ExponentialBuilder, Retryable};
use candor_chat::Message;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{message_text, wire_role};
use crate::completer::{ChatCompleter, CompletionError};

const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const DEEPSEEK_BASE_URL: &str = "https://api.deepseek.com";
const MISTRAL_BASE_URL: &str = "https://api.mistral.ai/v1";

/// OpenAI-compatible chat completions client.
pub struct OpenAi {
    client: reqwest::Client,
    api_key: SecretString,
    label: &'static str,
    model: String,
    temperature: f64,
    top_p: f64,
    max_tokens: u32,
    base_url: String,
    timeout: Duration,
}

impl std::fmt::Debug for OpenAi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAi")
            .field("label", &self.label)
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl OpenAi {
    fn with_defaults(
        api_key: impl Into<String>,
        label: &'static str,
        base_url: &str,
        model: &str,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: SecretString::from(api_key.into()),
            label,
            model: model.to_string(),
            temperature: 0.1,
            top_p: 1.0,
            max_tokens: 1024,
            base_url: base_url.to_string(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Create a client against the OpenAI API.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_defaults(api_key, "openai", OPENAI_BASE_URL, "gpt-4o")
    }

    /// Create a client against the DeepSeek API.
    pub fn deepseek(api_key: impl Into<String>) -> Self {
        Self::with_defaults(api_key, "deepseek", DEEPSEEK_BASE_URL, "deepseek-chat")
    }

    /// Create a client against the Mistral API.
    pub fn mistral(api_key: impl Into<String>) -> Self {
        Self::with_defaults(api_key, "mistral", MISTRAL_BASE_URL, "mistral-large-latest")
    }

    /// Set the model to use.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the generation temperature.
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

    fn build_request(&self, msgs: &[Message]) -> Result<ChatRequest, CompletionError> {
        let messages = msgs
            .iter()
            .map(|msg| {
                Ok(ChatRequestMessage {
                    role: wire_role(msg.sender)?.to_string(),
                    content: message_text(msg)?.to_string(),
                })
            })
            .collect::<Result<Vec<_>, CompletionError>>()?;

        Ok(ChatRequest {
            model: self.model.clone(),
            messages,
            temperature: self.temperature,
            top_p: self.top_p,
            max_tokens: self.max_tokens,
        })
    }

    async fn send_request(&self, request: &ChatRequest) -> Result<ChatResponse, CompletionError> {
        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(self.api_key.expose_secret())
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
                .json::<ChatError>()
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

/// Chat completions request format.
#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatRequestMessage>,
    temperature: f64,
    top_p: f64,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatRequestMessage {
    role: String,
    content: String,
}

/// Chat completions response format.
#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatError {
    error: ChatErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ChatErrorDetail {
    message: String,
}

#[async_trait]
impl ChatCompleter for OpenAi {
    async fn complete(&self, msgs: &[Message]) -> Result<Message, CompletionError> {
        let request = self.build_request(msgs)?;

        let body = (|| async { self.send_request(&request).await })
            .retry(ExponentialBuilder::default().with_max_times(2))
            .when(CompletionError::is_transient)
            .notify(|err, dur| {
                tracing::warn!(
                    error = %err,
                    backoff = ?dur,
                    provider = self.label,
                    "retrying chat completions request"
                );
            })
            .await?;

        let choice = body
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| CompletionError::Parse("response contained no choices".into()))?;

        Ok(Message::assistant(choice.message.content))
    }

    fn name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use candor_chat::Role;

    #[test]
    fn test_api_key_not_in_debug_output() {
        let secret = "sk-super-secret";
        let client = OpenAi::new(secret);
        let debug_output = format!("{:?}", client);
        assert!(!debug_output.contains(secret));
    }

    #[test]
    fn test_compatible_constructors() {
        let deepseek = OpenAi::deepseek("key");
        assert_eq!(deepseek.base_url, DEEPSEEK_BASE_URL);
        assert_eq!(deepseek.model, "deepseek-chat");

        let mistral = OpenAi::mistral("key");
        assert_eq!(mistral.base_url, MISTRAL_BASE_URL);
        assert_eq!(mistral.model, "mistral-large-latest");
    }

    #[test]
    fn test_system_role_kept_inline() {
        let client = OpenAi::new("key");
        let msgs = vec![Message::system("be brief"), Message::user("hello")];

        let request = client.build_request(&msgs).unwrap();
        assert_eq!(request.messages[0].role, "system");
        assert_eq!(request.messages[1].role, "user");
    }

    #[test]
    fn test_undefined_role_rejected() {
        let client = OpenAi::new("key");
        let msgs = vec![Message::new(Role::Undefined, "orphan")];

        let err = client.build_request(&msgs).unwrap_err();
        assert!(matches!(err, CompletionError::UnsupportedRole { .. }));
    }
}

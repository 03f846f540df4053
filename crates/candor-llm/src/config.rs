//! Backend configuration surface.
//!
//! Mirrors the YAML the `candor` binary consumes:
//!
//! ```yaml
//! provider: anthropic
//! validate_responses: true
//! validation:
//!   max_retry: 5
//!   debug: false
//! anthropic:
//!   api_key: sk-ant-...
//!   model: claude-sonnet-4-5
//! ```

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::completer::{ChatCompleter, CompletionError};
use crate::validator::Validator;

/// Supported LLM providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    OpenAi,
    Anthropic,
    DeepSeek,
    Mistral,
}

/// Connection and generation settings for one provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// API key. Wrapped in a secret at client construction; config structs
    /// should not be logged.
    pub api_key: String,

    /// Model override; each provider has its own default.
    #[serde(default)]
    pub model: Option<String>,

    #[serde(default)]
    pub temperature: Option<f64>,

    #[serde(default)]
    pub top_p: Option<f64>,

    #[serde(default)]
    pub max_tokens: Option<u32>,

    /// Custom API base URL.
    #[serde(default)]
    pub base_url: Option<String>,
}

/// Settings for the validation pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Retry budget; values <= 0 normalize to 5 at construction.
    #[serde(default)]
    pub max_retry: i32,

    /// Append visible confidence annotations to approved prose answers.
    #[serde(default)]
    pub debug: bool,
}

/// Top-level LLM configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Which provider answers completions.
    pub provider: ProviderKind,

    /// Wrap the provider in the validation pipeline. The judge uses the
    /// same provider configuration as the primary backend.
    #[serde(default)]
    pub validate_responses: bool,

    #[serde(default)]
    pub validation: ValidationConfig,

    #[serde(default)]
    pub openai: Option<ProviderConfig>,

    #[serde(default)]
    pub anthropic: Option<ProviderConfig>,

    #[serde(default)]
    pub deepseek: Option<ProviderConfig>,

    #[serde(default)]
    pub mistral: Option<ProviderConfig>,
}

impl LlmConfig {
    /// Build the configured completion backend, validated when
    /// `validate_responses` is set.
    pub fn build(&self) -> Result<Arc<dyn ChatCompleter>, CompletionError> {
        let backend = self.build_provider()?;

        if !self.validate_responses {
            return Ok(backend);
        }

        let judge = self.build_provider()?;
        Ok(Arc::new(
            Validator::new(backend, judge)
                .with_max_retry(self.validation.max_retry)
                .with_debug(self.validation.debug),
        ))
    }

    fn provider_section(&self) -> Result<&ProviderConfig, CompletionError> {
        let section = match self.provider {
            ProviderKind::OpenAi => self.openai.as_ref(),
            ProviderKind::Anthropic => self.anthropic.as_ref(),
            ProviderKind::DeepSeek => self.deepseek.as_ref(),
            ProviderKind::Mistral => self.mistral.as_ref(),
        };

        section.ok_or_else(|| {
            CompletionError::NotConfigured(format!(
                "missing configuration section for provider {:?}",
                self.provider
            ))
        })
    }

    fn build_provider(&self) -> Result<Arc<dyn ChatCompleter>, CompletionError> {
        match self.provider {
            ProviderKind::Anthropic => self.build_anthropic(),
            ProviderKind::OpenAi | ProviderKind::DeepSeek | ProviderKind::Mistral => {
                self.build_openai_compatible()
            }
        }
    }

    #[cfg(feature = "anthropic")]
    fn build_anthropic(&self) -> Result<Arc<dyn ChatCompleter>, CompletionError> {
        let section = self.provider_section()?;
        let mut client = crate::providers::Anthropic::new(section.api_key.clone());
        if let Some(model) = &section.model {
            client = client.with_model(model);
        }
        if let Some(temperature) = section.temperature {
            client = client.with_temperature(temperature);
        }
        if let Some(top_p) = section.top_p {
            client = client.with_top_p(top_p);
        }
        if let Some(max_tokens) = section.max_tokens {
            client = client.with_max_tokens(max_tokens);
        }
        if let Some(base_url) = &section.base_url {
            client = client.with_base_url(base_url);
        }
        Ok(Arc::new(client))
    }

    #[cfg(not(feature = "anthropic"))]
    fn build_anthropic(&self) -> Result<Arc<dyn ChatCompleter>, CompletionError> {
        self.provider_section()?;
        Err(CompletionError::NotConfigured(
            "anthropic provider requires the 'anthropic' feature".into(),
        ))
    }

    #[cfg(feature = "openai")]
    fn build_openai_compatible(&self) -> Result<Arc<dyn ChatCompleter>, CompletionError> {
        let section = self.provider_section()?;
        let mut client = match self.provider {
            ProviderKind::OpenAi => crate::providers::OpenAi::new(section.api_key.clone()),
            ProviderKind::DeepSeek => crate::providers::OpenAi::deepseek(section.api_key.clone()),
            _ => crate::providers::OpenAi::mistral(section.api_key.clone()),
        };
        if let Some(model) = &section.model {
            client = client.with_model(model);
        }
        if let Some(temperature) = section.temperature {
            client = client.with_temperature(temperature);
        }
        if let Some(top_p) = section.top_p {
            client = client.with_top_p(top_p);
        }
        if let Some(max_tokens) = section.max_tokens {
            client = client.with_max_tokens(max_tokens);
        }
        if let Some(base_url) = &section.base_url {
            client = client.with_base_url(base_url);
        }
        Ok(Arc::new(client))
    }

    #[cfg(not(feature = "openai"))]
    fn build_openai_compatible(&self) -> Result<Arc<dyn ChatCompleter>, CompletionError> {
        self.provider_section()?;
        Err(CompletionError::NotConfigured(
            "openai-compatible providers require the 'openai' feature".into(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_kind_lowercase_names() {
        assert_eq!(
            serde_json::to_value(ProviderKind::OpenAi).unwrap(),
            "openai"
        );
        assert_eq!(
            serde_json::to_value(ProviderKind::DeepSeek).unwrap(),
            "deepseek"
        );
    }

    #[test]
    fn test_config_defaults() {
        let config: LlmConfig = serde_json::from_value(serde_json::json!({
            "provider": "anthropic",
            "anthropic": { "api_key": "k" }
        }))
        .unwrap();

        assert!(!config.validate_responses);
        assert_eq!(config.validation.max_retry, 0);
        assert!(!config.validation.debug);
        assert!(config.openai.is_none());
    }

    #[test]
    fn test_missing_section_is_not_configured() {
        let config: LlmConfig = serde_json::from_value(serde_json::json!({
            "provider": "mistral"
        }))
        .unwrap();

        let err = config.provider_section().unwrap_err();
        assert!(matches!(err, CompletionError::NotConfigured(_)));
    }

    #[cfg(feature = "all-providers")]
    #[test]
    fn test_build_validated_backend() {
        let config: LlmConfig = serde_json::from_value(serde_json::json!({
            "provider": "openai",
            "validate_responses": true,
            "validation": { "max_retry": 3, "debug": true },
            "openai": { "api_key": "k", "model": "gpt-4o-mini" }
        }))
        .unwrap();

        let backend = config.build().unwrap();
        assert_eq!(backend.name(), "gpt-4o-mini");
    }
}

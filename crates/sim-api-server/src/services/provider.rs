//! Model provider registry.
//!
//! Every supported backend speaks the OpenAI-compatible API; selecting a
//! provider only changes the base URL, the key source, and the default
//! model names.

use serde::{Deserialize, Serialize};

use crate::config::{EmbeddingConfig, LlmConfig};
use crate::services::{EmbeddingService, LlmService};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    OpenAi,
    Gemini,
    DeepSeek,
    Zhipu,
}

/// Static per-provider defaults.
pub struct ProviderProfile {
    pub base_url: &'static str,
    pub env_key_name: &'static str,
    pub default_model: &'static str,
    /// None when the provider has no embeddings API.
    pub default_embedding_model: Option<&'static str>,
    pub default_embedding_dimension: usize,
    /// Whether the embeddings endpoint accepts a `dimensions` parameter.
    pub supports_embedding_dimensions: bool,
}

impl Provider {
    pub fn profile(&self) -> ProviderProfile {
        match self {
            Provider::OpenAi => ProviderProfile {
                base_url: "https://api.openai.com/v1",
                env_key_name: "OPENAI_API_KEY",
                default_model: "gpt-4o",
                default_embedding_model: Some("text-embedding-3-small"),
                default_embedding_dimension: 1536,
                supports_embedding_dimensions: true,
            },
            Provider::Gemini => ProviderProfile {
                base_url: "https://generativelanguage.googleapis.com/v1beta/openai",
                env_key_name: "GEMINI_API_KEY",
                default_model: "gemini-2.0-flash",
                default_embedding_model: Some("text-embedding-004"),
                default_embedding_dimension: 768,
                supports_embedding_dimensions: false,
            },
            Provider::DeepSeek => ProviderProfile {
                base_url: "https://api.deepseek.com",
                env_key_name: "DEEPSEEK_API_KEY",
                default_model: "deepseek-chat",
                default_embedding_model: None,
                default_embedding_dimension: 768,
                supports_embedding_dimensions: false,
            },
            Provider::Zhipu => ProviderProfile {
                base_url: "https://open.bigmodel.cn/api/paas/v4",
                env_key_name: "ZHIPU_API_KEY",
                default_model: "glm-4.5",
                default_embedding_model: Some("embedding-3"),
                default_embedding_dimension: 2048,
                supports_embedding_dimensions: false,
            },
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Provider::OpenAi => "openai",
            Provider::Gemini => "gemini",
            Provider::DeepSeek => "deepseek",
            Provider::Zhipu => "zhipu",
        }
    }
}

fn resolve_api_key(configured: &str, env_key_name: &str) -> String {
    if !configured.is_empty() {
        return configured.to_string();
    }
    std::env::var(env_key_name).unwrap_or_default()
}

/// Build the generation client for the configured provider.
pub fn create_llm_service(config: &LlmConfig) -> LlmService {
    let profile = config.provider.profile();

    let base_url = if config.base_url.is_empty() {
        profile.base_url.to_string()
    } else {
        config.base_url.clone()
    };
    let model = if config.model.is_empty() {
        profile.default_model.to_string()
    } else {
        config.model.clone()
    };
    let api_key = resolve_api_key(&config.api_key, profile.env_key_name);

    tracing::info!(
        provider = config.provider.name(),
        model = %model,
        "Creating LLM client"
    );

    LlmService::new(
        base_url,
        api_key,
        model,
        config.temperature,
        config.max_tokens,
        config.timeout_seconds,
        config.provider.name(),
    )
}

/// Build the embedding client, falling back to another provider when the
/// configured one has no embeddings API (e.g. DeepSeek).
pub fn create_embedding_service(config: &EmbeddingConfig) -> EmbeddingService {
    let provider = if config.provider.profile().default_embedding_model.is_none() {
        let fallback = config.fallback_provider.unwrap_or(Provider::Gemini);
        tracing::warn!(
            provider = config.provider.name(),
            fallback = fallback.name(),
            "Provider has no embedding API, falling back"
        );
        fallback
    } else {
        config.provider
    };

    let profile = provider.profile();
    let model = if config.model.is_empty() {
        profile
            .default_embedding_model
            .unwrap_or("text-embedding-3-small")
            .to_string()
    } else {
        config.model.clone()
    };
    let api_key = resolve_api_key(&config.api_key, profile.env_key_name);

    tracing::info!(provider = provider.name(), model = %model, "Creating embedding client");

    EmbeddingService::new(
        profile.base_url.to_string(),
        api_key,
        model,
        config.dimension,
        profile.supports_embedding_dimensions,
        config.timeout_seconds,
        provider.name(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_deserializes_from_lowercase() {
        let provider: Provider = serde_json::from_str("\"deepseek\"").unwrap();
        assert_eq!(provider, Provider::DeepSeek);
    }

    #[test]
    fn test_unknown_provider_is_rejected() {
        let result: Result<Provider, _> = serde_json::from_str("\"mystery\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_deepseek_has_no_embedding_model() {
        assert!(Provider::DeepSeek.profile().default_embedding_model.is_none());
        assert!(Provider::OpenAi.profile().default_embedding_model.is_some());
    }
}

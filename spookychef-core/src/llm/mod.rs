//! LLM provider abstraction for recipe generation.
//!
//! This module provides a trait-based abstraction over LLM providers (Gemini
//! and a fake for tests/offline runs), selected from environment configuration.

mod config;
mod fake;
mod gemini;

pub use config::{LlmConfig, ProviderKind, DEFAULT_MODEL, DEFAULT_TIMEOUT_SECS};
pub use fake::FakeProvider;
pub use gemini::GeminiProvider;

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Error type for LLM operations.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("API request failed: {0}")]
    RequestFailed(String),

    #[error("API returned error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("Failed to parse response: {0}")]
    ParseError(String),

    #[error("Rate limited, retry after {retry_after_secs:?} seconds")]
    RateLimited { retry_after_secs: Option<u64> },

    #[error("Provider not configured: {0}")]
    NotConfigured(String),
}

/// A system + user prompt pair.
#[derive(Debug, Clone, Default)]
pub struct CompletionRequest {
    pub system: String,
    pub user: String,
    /// Ask the provider for a JSON-only response.
    pub json_response: bool,
    pub temperature: Option<f32>,
}

/// Trait for LLM providers.
///
/// Implementations should be stateless and thread-safe. The provider is
/// responsible for making the API call and returning the model's text.
#[async_trait]
pub trait LlmProvider: Send + Sync + fmt::Debug {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError>;

    /// Provider name, e.g. "gemini" or "fake".
    fn provider_name(&self) -> &'static str;

    fn model_name(&self) -> &str;
}

/// Build the configured provider, or `None` when generation is disabled.
pub fn create_provider(config: &LlmConfig) -> Result<Option<Arc<dyn LlmProvider>>, LlmError> {
    match config.provider {
        ProviderKind::Disabled => Ok(None),
        ProviderKind::Fake => Ok(Some(Arc::new(FakeProvider::default()))),
        ProviderKind::Gemini => {
            let api_key = config
                .api_key
                .clone()
                .ok_or_else(|| LlmError::NotConfigured("GEMINI_API_KEY not set".to_string()))?;
            let provider = GeminiProvider::new(api_key, config.model.clone(), config.timeout)?;
            Ok(Some(Arc::new(provider)))
        }
    }
}

/// Read [`LlmConfig`] from the environment and build the provider.
pub fn create_provider_from_env() -> Result<Option<Arc<dyn LlmProvider>>, LlmError> {
    let config = LlmConfig::from_env()?;
    create_provider(&config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_create_provider() {
        let disabled = LlmConfig {
            provider: ProviderKind::Disabled,
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            timeout: Duration::from_secs(1),
        };
        assert!(create_provider(&disabled).unwrap().is_none());

        let fake = LlmConfig {
            provider: ProviderKind::Fake,
            ..disabled.clone()
        };
        let provider = create_provider(&fake).unwrap().unwrap();
        assert_eq!(provider.provider_name(), "fake");

        let gemini_without_key = LlmConfig {
            provider: ProviderKind::Gemini,
            ..disabled.clone()
        };
        assert!(matches!(
            create_provider(&gemini_without_key),
            Err(LlmError::NotConfigured(_))
        ));

        let gemini = LlmConfig {
            provider: ProviderKind::Gemini,
            api_key: Some("key".to_string()),
            ..disabled
        };
        let provider = create_provider(&gemini).unwrap().unwrap();
        assert_eq!(provider.provider_name(), "gemini");
        assert_eq!(provider.model_name(), DEFAULT_MODEL);
    }
}

//! LLM configuration from environment variables.

use std::env;
use std::time::Duration;

use super::LlmError;

/// Default Gemini model.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Default per-request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Gemini,
    Fake,
    /// No provider; generation endpoints report the service as unavailable.
    Disabled,
}

#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub provider: ProviderKind,
    pub api_key: Option<String>,
    pub model: String,
    pub timeout: Duration,
}

impl LlmConfig {
    /// Load configuration from environment variables.
    ///
    /// - `SPOOKYCHEF_LLM_PROVIDER`: "gemini" | "fake" | "none" (default: "gemini"
    ///   when `GEMINI_API_KEY` is set, otherwise "none")
    /// - `GEMINI_API_KEY`: API key, required for "gemini"
    /// - `SPOOKYCHEF_LLM_MODEL`: model name (default: "gemini-2.5-flash")
    /// - `SPOOKYCHEF_LLM_TIMEOUT_SECS`: request timeout (default: 30)
    pub fn from_env() -> Result<Self, LlmError> {
        let api_key = env::var("GEMINI_API_KEY").ok().filter(|k| !k.is_empty());

        let provider = match env::var("SPOOKYCHEF_LLM_PROVIDER") {
            Ok(name) => Self::parse_provider(&name)?,
            Err(_) if api_key.is_some() => ProviderKind::Gemini,
            Err(_) => ProviderKind::Disabled,
        };

        let model = env::var("SPOOKYCHEF_LLM_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        let timeout_secs = env::var("SPOOKYCHEF_LLM_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        Ok(Self {
            provider,
            api_key,
            model,
            timeout: Duration::from_secs(timeout_secs),
        })
    }

    fn parse_provider(name: &str) -> Result<ProviderKind, LlmError> {
        match name.trim().to_lowercase().as_str() {
            "gemini" => Ok(ProviderKind::Gemini),
            "fake" => Ok(ProviderKind::Fake),
            "none" | "" => Ok(ProviderKind::Disabled),
            other => Err(LlmError::NotConfigured(format!(
                "Unknown provider: {}",
                other
            ))),
        }
    }
}

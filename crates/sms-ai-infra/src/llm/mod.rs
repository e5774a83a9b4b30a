//! LLM provider implementations.

pub mod openai_compat;

use secrecy::SecretString;

use sms_ai_core::llm::BoxLlmProvider;
use sms_ai_types::config::{EndpointSettings, Settings};
use sms_ai_types::llm::{LlmError, ProviderType};

pub use openai_compat::OpenAiCompatibleProvider;

/// Build a boxed provider of `provider_type` for `model` from settings.
///
/// Fails with `AuthenticationFailed` when the matching API key is missing.
pub fn build_provider(
    settings: &Settings,
    provider_type: ProviderType,
    model: &str,
    max_retries: u32,
) -> Result<BoxLlmProvider, LlmError> {
    let (key, endpoint): (Option<&SecretString>, &EndpointSettings) = match provider_type {
        ProviderType::OpenAi => (settings.secrets.openai_api_key.as_ref(), &settings.openai),
        ProviderType::Gemini => (settings.secrets.gemini_api_key.as_ref(), &settings.gemini),
    };
    let key = key.cloned().ok_or(LlmError::AuthenticationFailed)?;

    let mut provider = match provider_type {
        ProviderType::OpenAi => OpenAiCompatibleProvider::openai(key, model)?,
        ProviderType::Gemini => OpenAiCompatibleProvider::gemini(key, model)?,
    }
    .with_max_retries(max_retries);

    if let Some(base_url) = &endpoint.base_url {
        provider = provider.with_base_url(base_url.clone());
    }
    Ok(BoxLlmProvider::new(provider))
}

//! Settings for the sms-ai service.
//!
//! `Settings` mirrors the optional `sms-ai.toml` file. Every section has
//! defaults, so an empty file (or no file) is valid. API keys and auth tokens
//! are never read from the file; they come from the environment and live in
//! [`Secrets`].

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::llm::ProviderType;

/// Top-level settings.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub glossary: GlossarySettings,
    pub pipeline: PipelineSettings,
    pub translation: TranslationSettings,
    pub answer: AnswerSettings,
    pub agent: AgentSettings,
    pub search: SearchSettings,
    pub twilio: TwilioSettings,
    pub openai: EndpointSettings,
    pub gemini: EndpointSettings,
    pub logging: LoggingSettings,
    #[serde(skip)]
    pub secrets: Secrets,
}

/// Credentials resolved from the environment.
#[derive(Debug, Default)]
pub struct Secrets {
    pub openai_api_key: Option<SecretString>,
    pub gemini_api_key: Option<SecretString>,
    pub tavily_api_key: Option<SecretString>,
    pub twilio_auth_token: Option<SecretString>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    /// `sqlite:` URL. SQLAlchemy-style `sqlite:////abs/path` is accepted.
    pub url: String,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            url: "sqlite://sms_ai.db".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GlossarySettings {
    /// Path to the glossary CSV. A missing path or file yields an empty glossary.
    pub csv_path: Option<PathBuf>,
}

/// Which strategy produces the reply to an inbound SMS.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Reply `We got: {text}` without calling any model.
    #[default]
    Echo,
    /// Translate to English, answer, translate back to Setswana.
    Translate,
    /// Single agent call that detects, translates, searches, and answers.
    Agent,
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::Echo => write!(f, "echo"),
            Backend::Translate => write!(f, "translate"),
            Backend::Agent => write!(f, "agent"),
        }
    }
}

impl FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "echo" => Ok(Backend::Echo),
            "translate" => Ok(Backend::Translate),
            "agent" => Ok(Backend::Agent),
            other => Err(format!("invalid backend: '{other}' (expected echo, translate, agent)")),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PipelineSettings {
    pub backend: Backend,
    /// Acknowledge the webhook immediately and send the reply through the
    /// Twilio REST API once it is ready.
    pub async_reply: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TranslationSettings {
    pub provider: ProviderType,
    pub model: String,
    pub temperature: f64,
    pub max_tokens: Option<u32>,
    pub max_retries: u32,
}

impl Default for TranslationSettings {
    fn default() -> Self {
        Self {
            provider: ProviderType::OpenAi,
            model: "gpt-4o-mini".to_string(),
            temperature: 0.0,
            max_tokens: Some(256),
            max_retries: 2,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnswerSettings {
    pub provider: ProviderType,
    pub model: String,
    pub temperature: f64,
    pub max_tokens: Option<u32>,
    pub max_retries: u32,
}

impl Default for AnswerSettings {
    fn default() -> Self {
        Self {
            provider: ProviderType::OpenAi,
            model: "gpt-4o-mini".to_string(),
            temperature: 0.2,
            max_tokens: Some(256),
            max_retries: 2,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AgentSettings {
    pub provider: ProviderType,
    pub model: String,
    /// Kept below 0.7 to avoid reasoning loops.
    pub temperature: f64,
    pub max_tokens: Option<u32>,
    pub max_retries: u32,
    pub max_tool_loops: u32,
    /// Bind the web search tool when a Tavily key is available.
    pub web_search: bool,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            provider: ProviderType::Gemini,
            model: "gemini-3-pro-preview".to_string(),
            temperature: 0.4,
            max_tokens: None,
            max_retries: 2,
            max_tool_loops: 3,
            web_search: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    pub base_url: String,
    pub max_results: u32,
    pub topic: String,
    pub search_depth: String,
    pub include_answer: String,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.tavily.com".to_string(),
            max_results: 5,
            topic: "general".to_string(),
            search_depth: "advanced".to_string(),
            include_answer: "basic".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TwilioSettings {
    pub base_url: String,
    pub account_sid: Option<String>,
    pub from_number: Option<String>,
}

impl Default for TwilioSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.twilio.com".to_string(),
            account_sid: None,
            from_number: None,
        }
    }
}

/// Optional base URL override for an OpenAI-compatible endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EndpointSettings {
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("invalid log format: '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub format: LogFormat,
    /// Export spans through OpenTelemetry (stdout exporter).
    pub otel: bool,
}

use thiserror::Error;

use crate::llm::LlmError;

/// Errors from repository operations (used by trait definitions in sms-ai-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("query error: {0}")]
    Query(String),
}

/// Errors loading the glossary CSV.
#[derive(Debug, Error)]
pub enum GlossaryError {
    #[error("failed to read glossary file: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed glossary CSV: {0}")]
    Csv(String),
}

/// Errors from the translator.
#[derive(Debug, Error)]
pub enum TranslationError {
    #[error("translation model call failed: {0}")]
    Llm(#[from] LlmError),
}

/// Errors from web search tools.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("search request failed: {0}")]
    Request(String),

    #[error("search API returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid search arguments: {0}")]
    InvalidArguments(String),
}

/// Errors from the farming agent.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error("agent returned no text content")]
    EmptyResponse,

    #[error("agent did not return valid JSON: {message}\nraw content:\n{raw}")]
    InvalidJson { message: String, raw: String },
}

/// Errors sending outbound SMS.
#[derive(Debug, Error)]
pub enum SmsError {
    #[error("SMS sender is not configured: {0}")]
    NotConfigured(String),

    #[error("SMS request failed: {0}")]
    Request(String),

    #[error("SMS API returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
}

/// Errors from the message pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("storage error: {0}")]
    Storage(#[from] RepositoryError),

    #[error("translation failed: {0}")]
    Translation(#[from] TranslationError),

    #[error("answer generation failed: {0}")]
    Answer(#[from] LlmError),

    #[error("agent failed: {0}")]
    Agent(#[from] AgentError),
}

/// Errors loading settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {message}")]
    Parse { path: String, message: String },

    #[error("invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

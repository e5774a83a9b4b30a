//! Settings loader for sms-ai.
//!
//! Layers, lowest to highest precedence: built-in defaults, the TOML file,
//! then environment variables (after loading `.env` when present).

use std::path::{Path, PathBuf};

use secrecy::SecretString;
use tracing::debug;

use sms_ai_types::config::{Backend, LogFormat, Settings};
use sms_ai_types::error::ConfigError;

/// Config file read when neither `--config` nor `SMS_AI_CONFIG` is given.
pub const DEFAULT_CONFIG_FILE: &str = "sms-ai.toml";

/// Settings plus the files they were read from.
///
/// Loading happens before the tracing subscriber exists, so the sources are
/// kept here and logged by [`LoadedSettings::log_sources`] once it does.
#[derive(Debug)]
pub struct LoadedSettings {
    pub settings: Settings,
    /// TOML file that was read, if any.
    pub config_file: Option<PathBuf>,
    /// `.env` file that was loaded, if any.
    pub dotenv_file: Option<PathBuf>,
}

impl LoadedSettings {
    pub fn log_sources(&self) {
        match &self.dotenv_file {
            Some(path) => debug!(path = %path.display(), "loaded .env"),
            None => debug!("no .env file found"),
        }
        match &self.config_file {
            Some(path) => debug!(path = %path.display(), "loaded settings file"),
            None => debug!("no {DEFAULT_CONFIG_FILE} found, using defaults"),
        }
    }
}

/// Load settings from `path` (or the default locations) and the environment.
///
/// An explicit path that does not exist is an error; the implicit
/// `sms-ai.toml` is optional. Malformed TOML is always an error.
pub async fn load_settings(path: Option<&Path>) -> Result<LoadedSettings, ConfigError> {
    let dotenv_file = dotenvy::dotenv().ok();

    let explicit = path
        .map(Path::to_path_buf)
        .or_else(|| std::env::var_os("SMS_AI_CONFIG").map(PathBuf::from));

    let config_file = match explicit {
        Some(path) => Some(path),
        None => {
            let default = PathBuf::from(DEFAULT_CONFIG_FILE);
            tokio::fs::try_exists(&default)
                .await
                .unwrap_or(false)
                .then_some(default)
        }
    };

    let mut settings = match &config_file {
        Some(path) => read_settings_file(path).await?,
        None => Settings::default(),
    };

    apply_env_overrides(&mut settings, |key| std::env::var(key).ok())?;
    Ok(LoadedSettings {
        settings,
        config_file,
        dotenv_file,
    })
}

/// Read and parse a TOML settings file.
pub async fn read_settings_file(path: &Path) -> Result<Settings, ConfigError> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
    parse_settings(&content).map_err(|message| ConfigError::Parse {
        path: path.display().to_string(),
        message,
    })
}

/// Parse settings from TOML text.
pub fn parse_settings(content: &str) -> Result<Settings, String> {
    toml::from_str(content).map_err(|e| e.to_string())
}

/// Apply environment overrides through `lookup`.
///
/// Empty values are treated as unset.
pub fn apply_env_overrides(
    settings: &mut Settings,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<(), ConfigError> {
    let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

    if let Some(url) = get("DATABASE_URL") {
        settings.database.url = url;
    }
    if let Some(path) = get("GLOSSARY_CSV_PATH") {
        settings.glossary.csv_path = Some(PathBuf::from(path));
    }
    if let Some(host) = get("SMS_AI_HOST") {
        settings.server.host = host;
    }
    if let Some(port) = get("SMS_AI_PORT") {
        settings.server.port = port.parse().map_err(|e| invalid("SMS_AI_PORT", e))?;
    }
    if let Some(backend) = get("SMS_AI_BACKEND") {
        settings.pipeline.backend = backend
            .parse::<Backend>()
            .map_err(|e| invalid("SMS_AI_BACKEND", e))?;
    }
    if let Some(flag) = get("SMS_AI_ASYNC_REPLY") {
        settings.pipeline.async_reply = parse_bool(&flag).ok_or_else(|| {
            invalid("SMS_AI_ASYNC_REPLY", format!("expected a boolean, got '{flag}'"))
        })?;
    }
    if let Some(format) = get("SMS_AI_LOG_FORMAT") {
        settings.logging.format = format
            .parse::<LogFormat>()
            .map_err(|e| invalid("SMS_AI_LOG_FORMAT", e))?;
    }

    if let Some(key) = get("OPENAI_API_KEY") {
        settings.secrets.openai_api_key = Some(SecretString::from(key));
    }
    if let Some(url) = get("OPENAI_BASE_URL") {
        settings.openai.base_url = Some(url);
    }
    if let Some(key) = get("GOOGLE_API_KEY").or_else(|| get("GEMINI_API_KEY")) {
        settings.secrets.gemini_api_key = Some(SecretString::from(key));
    }
    if let Some(key) = get("TAVILY_API_KEY") {
        settings.secrets.tavily_api_key = Some(SecretString::from(key));
    }

    if let Some(sid) = get("TWILIO_ACCOUNT_SID") {
        settings.twilio.account_sid = Some(sid);
    }
    if let Some(token) = get("TWILIO_AUTH_TOKEN") {
        settings.secrets.twilio_auth_token = Some(SecretString::from(token));
    }
    if let Some(from) = get("TWILIO_FROM_NUMBER") {
        settings.twilio.from_number = Some(from);
    }

    Ok(())
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn invalid(key: &str, message: impl ToString) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        message: message.to_string(),
    }
}

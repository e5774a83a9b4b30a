//! OpenAiCompatibleProvider -- [`LlmProvider`] for any backend speaking the
//! OpenAI chat completions protocol (OpenAI itself, Gemini's OpenAI endpoint).
//!
//! The API key is wrapped in [`secrecy::SecretString`] and only exposed when
//! building the `Authorization` header.

mod types;

use std::time::Duration;

use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, warn};

use sms_ai_core::llm::LlmProvider;
use sms_ai_types::llm::{
    CompletionRequest, CompletionResponse, LlmError, Message, MessageRole, StopReason, ToolCall,
    Usage,
};

use types::{
    ChatFunction, ChatFunctionCall, ChatMessage, ChatRequest, ChatResponse, ChatTool,
    ChatToolCall,
};

pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/openai";

/// Upper bound on any single retry wait, including server-sent `Retry-After`.
pub const MAX_RETRY_DELAY: Duration = Duration::from_secs(30);

/// Chat-completions client with retry on rate limiting and overload.
pub struct OpenAiCompatibleProvider {
    client: reqwest::Client,
    provider_name: String,
    api_key: SecretString,
    base_url: String,
    model: String,
    max_retries: u32,
    retry_base_delay: Duration,
}

impl OpenAiCompatibleProvider {
    pub fn new(
        provider_name: impl Into<String>,
        base_url: impl Into<String>,
        api_key: SecretString,
        model: impl Into<String>,
    ) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| LlmError::Provider {
                message: format!("failed to create HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            provider_name: provider_name.into(),
            api_key,
            base_url: base_url.into(),
            model: model.into(),
            max_retries: 2,
            retry_base_delay: Duration::from_millis(500),
        })
    }

    /// OpenAI (`https://api.openai.com/v1`).
    pub fn openai(api_key: SecretString, model: &str) -> Result<Self, LlmError> {
        Self::new("openai", OPENAI_BASE_URL, api_key, model)
    }

    /// Google Gemini through its OpenAI-compatible endpoint.
    pub fn gemini(api_key: SecretString, model: &str) -> Result<Self, LlmError> {
        Self::new("gemini", GEMINI_BASE_URL, api_key, model)
    }

    /// Override the base URL (proxies, tests).
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Retries after the first attempt for rate-limit and overload errors.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_retry_base_delay(mut self, delay: Duration) -> Self {
        self.retry_base_delay = delay;
        self
    }

    /// The default model for this provider.
    pub fn model(&self) -> &str {
        &self.model
    }

    fn to_chat_request(&self, request: &CompletionRequest) -> ChatRequest {
        let mut messages = Vec::with_capacity(request.messages.len() + 1);
        if let Some(system) = &request.system {
            messages.push(ChatMessage {
                role: MessageRole::System.to_string(),
                content: Some(system.clone()),
                tool_calls: Vec::new(),
                tool_call_id: None,
            });
        }
        messages.extend(request.messages.iter().map(to_chat_message));

        let tools = request
            .tools
            .iter()
            .map(|tool| ChatTool {
                kind: "function",
                function: ChatFunction {
                    name: tool.name.clone(),
                    description: tool.description.clone(),
                    parameters: tool.parameters.clone(),
                },
            })
            .collect();

        let model = if request.model.is_empty() {
            self.model.clone()
        } else {
            request.model.clone()
        };

        ChatRequest {
            model,
            messages,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            tools,
        }
    }

    async fn send_once(&self, body: &ChatRequest) -> Result<CompletionResponse, LlmError> {
        let url = format!("{}/chat/completions", self.base_url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(self.api_key.expose_secret())
            .json(body)
            .send()
            .await
            .map_err(|e| LlmError::Provider {
                message: format!("HTTP request failed: {e}"),
            })?;

        let status = response.status();
        if !status.is_success() {
            let retry_after_ms = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u64>().ok())
                .map(|secs| secs.saturating_mul(1000));
            let error_body = response.text().await.unwrap_or_default();
            return Err(map_status(status, retry_after_ms, error_body));
        }

        let chat: ChatResponse = response.json().await.map_err(|e| {
            LlmError::Deserialization(format!("failed to parse response: {e}"))
        })?;
        from_chat_response(chat)
    }
}

fn to_chat_message(message: &Message) -> ChatMessage {
    let tool_calls: Vec<ChatToolCall> = message
        .tool_calls
        .iter()
        .map(|call| ChatToolCall {
            id: call.id.clone(),
            kind: "function".to_string(),
            function: ChatFunctionCall {
                name: call.name.clone(),
                arguments: call.arguments.clone(),
            },
        })
        .collect();

    let content = if message.content.is_empty() && !tool_calls.is_empty() {
        None
    } else {
        Some(message.content.clone())
    };

    ChatMessage {
        role: message.role.to_string(),
        content,
        tool_calls,
        tool_call_id: message.tool_call_id.clone(),
    }
}

fn map_status(status: StatusCode, retry_after_ms: Option<u64>, body: String) -> LlmError {
    match status.as_u16() {
        401 | 403 => LlmError::AuthenticationFailed,
        429 => LlmError::RateLimited { retry_after_ms },
        400 | 404 | 422 => LlmError::InvalidRequest(body),
        500..=599 => LlmError::Overloaded(format!("HTTP {status}: {body}")),
        _ => LlmError::Provider {
            message: format!("HTTP {status}: {body}"),
        },
    }
}

fn from_chat_response(chat: ChatResponse) -> Result<CompletionResponse, LlmError> {
    let choice = chat
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| LlmError::Deserialization("response had no choices".to_string()))?;

    let tool_calls: Vec<ToolCall> = choice
        .message
        .tool_calls
        .unwrap_or_default()
        .into_iter()
        .map(|call| ToolCall {
            id: call.id,
            name: call.function.name,
            arguments: call.function.arguments,
        })
        .collect();

    let stop_reason = match choice.finish_reason.as_deref() {
        Some("tool_calls") => StopReason::ToolUse,
        Some("length") => StopReason::MaxTokens,
        Some("content_filter") => StopReason::ContentFilter,
        _ if !tool_calls.is_empty() => StopReason::ToolUse,
        _ => StopReason::EndTurn,
    };

    let usage = chat.usage.unwrap_or_default();

    Ok(CompletionResponse {
        id: chat.id,
        content: choice.message.content.map(|c| c.into_text()).unwrap_or_default(),
        model: chat.model,
        stop_reason,
        usage: Usage {
            input_tokens: usage.prompt_tokens,
            output_tokens: usage.completion_tokens,
        },
        tool_calls,
    })
}

impl LlmProvider for OpenAiCompatibleProvider {
    fn name(&self) -> &str {
        &self.provider_name
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let body = self.to_chat_request(request);
        let mut attempt = 0;

        loop {
            match self.send_once(&body).await {
                Ok(response) => {
                    debug!(
                        provider = %self.provider_name,
                        model = %response.model,
                        input_tokens = response.usage.input_tokens,
                        output_tokens = response.usage.output_tokens,
                        "completion received"
                    );
                    return Ok(response);
                }
                Err(e) if e.is_transient() && attempt < self.max_retries => {
                    let delay = self.retry_delay(&e, attempt);
                    attempt += 1;
                    warn!(
                        provider = %self.provider_name,
                        error = %e,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        "transient provider error, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

impl OpenAiCompatibleProvider {
    /// Backoff before retry number `attempt + 1`: the server's `Retry-After`
    /// when given, else exponential. Never more than [`MAX_RETRY_DELAY`].
    fn retry_delay(&self, err: &LlmError, attempt: u32) -> Duration {
        let delay = match err {
            LlmError::RateLimited {
                retry_after_ms: Some(ms),
            } => Duration::from_millis(*ms),
            _ => self
                .retry_base_delay
                .saturating_mul(2u32.saturating_pow(attempt)),
        };
        delay.min(MAX_RETRY_DELAY)
    }
}

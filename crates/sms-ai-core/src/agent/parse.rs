use sms_ai_types::agent::AgentResponse;
use sms_ai_types::error::AgentError;

/// Parse the agent's final message into an [`AgentResponse`].
///
/// The model is told to emit bare JSON, but a surrounding markdown code
/// fence (```` ```json ... ``` ````) is accepted too.
pub fn parse_agent_response(raw: &str) -> Result<AgentResponse, AgentError> {
    let text = strip_code_fence(raw.trim());
    if text.is_empty() {
        return Err(AgentError::EmptyResponse);
    }

    serde_json::from_str(text).map_err(|e| AgentError::InvalidJson {
        message: e.to_string(),
        raw: raw.to_string(),
    })
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let rest = rest
        .strip_prefix("json")
        .or_else(|| rest.strip_prefix("JSON"))
        .unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

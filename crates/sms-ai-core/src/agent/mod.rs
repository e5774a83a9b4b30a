//! Single-call farming agent: language detection, translation, advice and
//! optional web search, returned as one structured JSON object.

mod engine;
mod parse;
mod prompt;

pub use engine::{AgentOptions, AgentOutcome, FarmAgent};
pub use parse::parse_agent_response;
pub use prompt::{AGENT_SYSTEM_PROMPT, FALLBACK_INSTRUCTION, SEARCH_TOOL_NAME, search_tool_definition};

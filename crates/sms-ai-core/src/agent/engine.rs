use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info, warn};

use sms_ai_types::agent::AgentResponse;
use sms_ai_types::error::{AgentError, SearchError};
use sms_ai_types::llm::{CompletionRequest, CompletionResponse, Message, ToolCall};

use super::parse::parse_agent_response;
use super::prompt::{
    AGENT_SYSTEM_PROMPT, FALLBACK_INSTRUCTION, SEARCH_TOOL_NAME, search_tool_definition,
};
use crate::llm::{BoxLlmProvider, ModelOptions};
use crate::search::BoxSearchTool;

/// Knobs for one agent instance.
#[derive(Debug, Clone)]
pub struct AgentOptions {
    pub model: ModelOptions,
    /// Rounds of tool calls allowed before the model is forced to answer.
    pub max_tool_loops: u32,
}

/// What a successful agent run produced.
#[derive(Debug, Clone)]
pub struct AgentOutcome {
    pub response: AgentResponse,
    /// Model that produced the final message.
    pub model: String,
    /// Number of web searches executed.
    pub searches: usize,
}

#[derive(Deserialize)]
struct SearchArgs {
    query: String,
}

/// Farming agent over a chat model, with optional web search.
pub struct FarmAgent {
    provider: BoxLlmProvider,
    search: Option<BoxSearchTool>,
    options: AgentOptions,
}

impl FarmAgent {
    pub fn new(provider: BoxLlmProvider, search: Option<BoxSearchTool>, options: AgentOptions) -> Self {
        Self {
            provider,
            search,
            options,
        }
    }

    pub fn model(&self) -> &str {
        &self.options.model.model
    }

    /// Answer one farmer message.
    ///
    /// With a search tool configured the model may call `tavily_search` for up
    /// to `max_tool_loops` rounds; without one it is called once, tool-free.
    pub async fn run(&self, user_text: &str) -> Result<AgentOutcome, AgentError> {
        let (final_message, searches) = match &self.search {
            Some(search) => self.run_with_tools(user_text, search).await?,
            None => {
                let request = self.request(vec![Message::user(user_text)], false);
                (self.provider.complete(&request).await?, 0)
            }
        };

        let response = parse_agent_response(&final_message.content)?;
        let model = if final_message.model.is_empty() {
            self.options.model.model.clone()
        } else {
            final_message.model
        };

        info!(
            language = %response.detected_language,
            intent = %response.intent,
            searches,
            needs_human_review = response.safety_flags.needs_human_review,
            "agent answered"
        );

        Ok(AgentOutcome {
            response,
            model,
            searches,
        })
    }

    async fn run_with_tools(
        &self,
        user_text: &str,
        search: &BoxSearchTool,
    ) -> Result<(CompletionResponse, usize), AgentError> {
        let mut history = vec![Message::user(user_text)];
        let mut searches = 0;

        for round in 0..self.options.max_tool_loops {
            let response = self.provider.complete(&self.request(history.clone(), true)).await?;
            if response.tool_calls.is_empty() {
                return Ok((response, searches));
            }

            debug!(round, calls = response.tool_calls.len(), "agent requested tools");
            history.push(Message::assistant_with_tools(
                response.content.clone(),
                response.tool_calls.clone(),
            ));

            for call in &response.tool_calls {
                if call.name == SEARCH_TOOL_NAME {
                    searches += 1;
                }
                let result = self.run_tool(search, call).await;
                history.push(Message::tool(&call.id, result));
            }
        }

        warn!(
            max_tool_loops = self.options.max_tool_loops,
            "tool loop limit reached, asking for a final answer"
        );
        history.push(Message::user(FALLBACK_INSTRUCTION));
        let response = self.provider.complete(&self.request(history, false)).await?;
        Ok((response, searches))
    }

    /// Execute one tool call, always producing a JSON string for the model.
    async fn run_tool(&self, search: &BoxSearchTool, call: &ToolCall) -> String {
        if call.name != SEARCH_TOOL_NAME {
            warn!(tool = %call.name, "model called an unknown tool");
            return json!({ "error": format!("unknown tool: {}", call.name) }).to_string();
        }

        let result = match parse_search_args(&call.arguments) {
            Ok(query) => {
                debug!(backend = search.name(), %query, "running web search");
                search.search(&query).await
            }
            Err(e) => Err(e),
        };

        match result {
            Ok(value) => value.to_string(),
            Err(e) => {
                warn!(error = %e, "web search failed");
                json!({ "error": e.to_string() }).to_string()
            }
        }
    }

    fn request(&self, messages: Vec<Message>, with_tools: bool) -> CompletionRequest {
        let tools = if with_tools {
            vec![search_tool_definition()]
        } else {
            Vec::new()
        };
        CompletionRequest {
            model: self.options.model.model.clone(),
            messages,
            system: Some(AGENT_SYSTEM_PROMPT.to_string()),
            max_tokens: self.options.model.max_tokens,
            temperature: Some(self.options.model.temperature),
            tools,
        }
    }
}

fn parse_search_args(arguments: &str) -> Result<String, SearchError> {
    let args: SearchArgs = serde_json::from_str(arguments)
        .map_err(|e| SearchError::InvalidArguments(e.to_string()))?;
    let query = args.query.trim();
    if query.is_empty() {
        return Err(SearchError::InvalidArguments("empty query".to_string()));
    }
    Ok(query.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeSearch, ScriptedProvider, text_response, tool_call_response};
    use sms_ai_types::agent::DetectedLanguage;
    use sms_ai_types::llm::{LlmError, MessageRole};

    const FINAL: &str = r#"{"detected_language":"tsn","source_text":"pula ga e ne","english_translation":"It is not raining","intent":"drought","answer_english":"Mulch your beds.","final_answer_user_language":"Khurumetsa mebila.","safety_flags":{"mentions_dosage":false,"needs_human_review":true},"reasoning_summary":"Dry spell advice."}"#;

    fn options() -> AgentOptions {
        AgentOptions {
            model: ModelOptions::new("gemini-3-pro-preview", 0.4, None),
            max_tool_loops: 3,
        }
    }

    fn search_call(id: &str, query: &str) -> CompletionResponse {
        let args = json!({ "query": query }).to_string();
        tool_call_response(&[(id, SEARCH_TOOL_NAME, args.as_str())])
    }

    #[tokio::test]
    async fn test_without_search_single_call_no_tools() {
        let provider = ScriptedProvider::with_texts([FINAL]);
        let requests = provider.requests();
        let agent = FarmAgent::new(BoxLlmProvider::new(provider), None, options());

        let outcome = agent.run("pula ga e ne").await.unwrap();
        assert_eq!(outcome.response.detected_language, DetectedLanguage::Tsn);
        assert!(outcome.response.safety_flags.needs_human_review);
        assert_eq!(outcome.model, "scripted-model");
        assert_eq!(outcome.searches, 0);

        let requests = requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].tools.is_empty());
        assert_eq!(requests[0].system.as_deref(), Some(AGENT_SYSTEM_PROMPT));
        assert_eq!(requests[0].temperature, Some(0.4));
        assert_eq!(requests[0].max_tokens, None);
    }

    #[tokio::test]
    async fn test_direct_answer_with_tools_bound() {
        let provider = ScriptedProvider::with_texts([FINAL]);
        let requests = provider.requests();
        let search = FakeSearch::ok(json!({"results": []}));
        let queries = search.queries();
        let agent = FarmAgent::new(
            BoxLlmProvider::new(provider),
            Some(BoxSearchTool::new(search)),
            options(),
        );

        agent.run("pula ga e ne").await.unwrap();

        let requests = requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].tools.len(), 1);
        assert_eq!(requests[0].tools[0].name, SEARCH_TOOL_NAME);
        assert!(queries.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_search_result_fed_back() {
        let provider = ScriptedProvider::new(vec![
            Ok(search_call("call_1", "pea planting time Gauteng")),
            Ok(text_response(FINAL)),
        ]);
        let requests = provider.requests();
        let search = FakeSearch::ok(json!({"answer": "Plant peas from March to May."}));
        let queries = search.queries();
        let agent = FarmAgent::new(
            BoxLlmProvider::new(provider),
            Some(BoxSearchTool::new(search)),
            options(),
        );

        let outcome = agent.run("nako ya go jwala di erekisi?").await.unwrap();
        assert_eq!(outcome.searches, 1);
        assert_eq!(*queries.lock().unwrap(), vec!["pea planting time Gauteng"]);

        let requests = requests.lock().unwrap();
        assert_eq!(requests.len(), 2);
        let history = &requests[1].messages;
        assert_eq!(history.len(), 3);
        assert_eq!(history[1].role, MessageRole::Assistant);
        assert_eq!(history[1].tool_calls[0].id, "call_1");
        assert_eq!(history[2].role, MessageRole::Tool);
        assert_eq!(history[2].tool_call_id.as_deref(), Some("call_1"));
        let fed_back: serde_json::Value = serde_json::from_str(&history[2].content).unwrap();
        assert_eq!(fed_back["answer"], "Plant peas from March to May.");
    }

    #[tokio::test]
    async fn test_loop_limit_forces_final_answer_without_tools() {
        let provider = ScriptedProvider::new(vec![
            Ok(search_call("c1", "a")),
            Ok(search_call("c2", "b")),
            Ok(search_call("c3", "c")),
            Ok(text_response(FINAL)),
        ]);
        let requests = provider.requests();
        let agent = FarmAgent::new(
            BoxLlmProvider::new(provider),
            Some(BoxSearchTool::new(FakeSearch::ok(json!({})))),
            options(),
        );

        let outcome = agent.run("pula").await.unwrap();
        assert_eq!(outcome.searches, 3);

        let requests = requests.lock().unwrap();
        assert_eq!(requests.len(), 4);
        let last = &requests[3];
        assert!(last.tools.is_empty());
        let final_prompt = last.messages.last().unwrap();
        assert_eq!(final_prompt.role, MessageRole::User);
        assert_eq!(final_prompt.content, FALLBACK_INSTRUCTION);
    }

    #[tokio::test]
    async fn test_unknown_tool_answered_with_error() {
        let provider = ScriptedProvider::new(vec![
            Ok(tool_call_response(&[("c1", "calculator", "{}")])),
            Ok(text_response(FINAL)),
        ]);
        let requests = provider.requests();
        let search = FakeSearch::ok(json!({}));
        let queries = search.queries();
        let agent = FarmAgent::new(
            BoxLlmProvider::new(provider),
            Some(BoxSearchTool::new(search)),
            options(),
        );

        let outcome = agent.run("pula").await.unwrap();
        assert_eq!(outcome.searches, 0);
        assert!(queries.lock().unwrap().is_empty());

        let requests = requests.lock().unwrap();
        let tool_msg = &requests[1].messages[2];
        assert!(tool_msg.content.contains("unknown tool: calculator"));
    }

    #[tokio::test]
    async fn test_search_failure_reported_to_model() {
        let provider = ScriptedProvider::new(vec![
            Ok(search_call("c1", "maize rust")),
            Ok(text_response(FINAL)),
        ]);
        let requests = provider.requests();
        let agent = FarmAgent::new(
            BoxLlmProvider::new(provider),
            Some(BoxSearchTool::new(FakeSearch::failing("timeout"))),
            options(),
        );

        agent.run("mmidi").await.unwrap();

        let requests = requests.lock().unwrap();
        let tool_msg = &requests[1].messages[2];
        assert!(tool_msg.content.contains("timeout"));
    }

    #[tokio::test]
    async fn test_bad_search_arguments_reported_to_model() {
        let provider = ScriptedProvider::new(vec![
            Ok(tool_call_response(&[("c1", SEARCH_TOOL_NAME, "{\"q\": 1}")])),
            Ok(text_response(FINAL)),
        ]);
        let requests = provider.requests();
        let search = FakeSearch::ok(json!({}));
        let queries = search.queries();
        let agent = FarmAgent::new(
            BoxLlmProvider::new(provider),
            Some(BoxSearchTool::new(search)),
            options(),
        );

        agent.run("pula").await.unwrap();
        assert!(queries.lock().unwrap().is_empty());
        let requests = requests.lock().unwrap();
        assert!(requests[1].messages[2].content.contains("invalid search arguments"));
    }

    #[tokio::test]
    async fn test_invalid_final_json_is_error() {
        let provider = ScriptedProvider::with_texts(["I think you should water more."]);
        let agent = FarmAgent::new(BoxLlmProvider::new(provider), None, options());
        let err = agent.run("metsi").await.unwrap_err();
        assert!(matches!(err, AgentError::InvalidJson { .. }));
    }

    #[tokio::test]
    async fn test_provider_error_propagates() {
        let provider = ScriptedProvider::new(vec![Err(LlmError::Overloaded("busy".into()))]);
        let agent = FarmAgent::new(BoxLlmProvider::new(provider), None, options());
        let err = agent.run("metsi").await.unwrap_err();
        assert!(matches!(err, AgentError::Llm(LlmError::Overloaded(_))));
    }
}

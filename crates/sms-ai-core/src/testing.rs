//! Test doubles shared by the unit tests in this crate.

use std::collections::VecDeque;
use std::future::Future;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use serde_json::Value;

use sms_ai_types::error::{RepositoryError, SearchError};
use sms_ai_types::llm::{
    CompletionRequest, CompletionResponse, LlmError, StopReason, ToolCall, Usage,
};
use sms_ai_types::sms::{NewMessage, StoredMessage};
use sms_ai_types::turn::{NewTurn, Turn};

use crate::llm::LlmProvider;
use crate::repository::{MessageRepository, TurnRepository};
use crate::search::SearchTool;

pub fn text_response(content: &str) -> CompletionResponse {
    CompletionResponse {
        id: "resp-1".to_string(),
        content: content.to_string(),
        model: "scripted-model".to_string(),
        stop_reason: StopReason::EndTurn,
        usage: Usage::default(),
        tool_calls: Vec::new(),
    }
}

pub fn tool_call_response(calls: &[(&str, &str, &str)]) -> CompletionResponse {
    CompletionResponse {
        stop_reason: StopReason::ToolUse,
        tool_calls: calls
            .iter()
            .map(|(id, name, args)| ToolCall {
                id: id.to_string(),
                name: name.to_string(),
                arguments: args.to_string(),
            })
            .collect(),
        ..text_response("")
    }
}

/// Returns queued responses in order and records every request it sees.
pub struct ScriptedProvider {
    responses: Mutex<VecDeque<Result<CompletionResponse, LlmError>>>,
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl ScriptedProvider {
    pub fn new(responses: Vec<Result<CompletionResponse, LlmError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_texts<'a>(texts: impl IntoIterator<Item = &'a str>) -> Self {
        Self::new(texts.into_iter().map(|t| Ok(text_response(t))).collect())
    }

    pub fn requests(&self) -> Arc<Mutex<Vec<CompletionRequest>>> {
        Arc::clone(&self.requests)
    }
}

impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl Future<Output = Result<CompletionResponse, LlmError>> + Send {
        self.requests.lock().unwrap().push(request.clone());
        let next = self.responses.lock().unwrap().pop_front();
        async move {
            next.unwrap_or_else(|| {
                Err(LlmError::Provider {
                    message: "script exhausted".to_string(),
                })
            })
        }
    }
}

impl LlmProvider for Arc<ScriptedProvider> {
    fn name(&self) -> &str {
        "scripted"
    }

    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl Future<Output = Result<CompletionResponse, LlmError>> + Send {
        LlmProvider::complete(self.as_ref(), request)
    }
}

/// Search double returning a fixed result (or error) for every query.
pub struct FakeSearch {
    result: Result<Value, String>,
    queries: Arc<Mutex<Vec<String>>>,
}

impl FakeSearch {
    pub fn ok(result: Value) -> Self {
        Self {
            result: Ok(result),
            queries: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            result: Err(message.to_string()),
            queries: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn queries(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.queries)
    }
}

impl SearchTool for FakeSearch {
    fn name(&self) -> &str {
        "fake"
    }

    fn search(&self, query: &str) -> impl Future<Output = Result<Value, SearchError>> + Send {
        self.queries.lock().unwrap().push(query.to_string());
        let result = self.result.clone().map_err(SearchError::Request);
        async move { result }
    }
}

#[derive(Default)]
pub struct InMemoryMessages {
    rows: Mutex<Vec<StoredMessage>>,
}

impl InMemoryMessages {
    pub fn all(&self) -> Vec<StoredMessage> {
        self.rows.lock().unwrap().clone()
    }
}

impl MessageRepository for InMemoryMessages {
    async fn save_message(&self, message: &NewMessage) -> Result<StoredMessage, RepositoryError> {
        let mut rows = self.rows.lock().unwrap();
        let stored = StoredMessage {
            id: rows.len() as i64 + 1,
            phone: message.phone.clone(),
            direction: message.direction,
            text: message.text.clone(),
            created_at: Utc::now(),
        };
        rows.push(stored.clone());
        Ok(stored)
    }

    async fn get_message(&self, id: i64) -> Result<Option<StoredMessage>, RepositoryError> {
        Ok(self.rows.lock().unwrap().iter().find(|m| m.id == id).cloned())
    }
}

#[derive(Default)]
pub struct InMemoryTurns {
    rows: Mutex<Vec<Turn>>,
}

impl InMemoryTurns {
    pub fn all(&self) -> Vec<Turn> {
        self.rows.lock().unwrap().clone()
    }
}

impl TurnRepository for InMemoryTurns {
    async fn save_turn(&self, turn: &NewTurn) -> Result<Turn, RepositoryError> {
        let mut rows = self.rows.lock().unwrap();
        let stored = Turn {
            id: rows.len() as i64 + 1,
            phone: turn.phone.clone(),
            created_at: Utc::now(),
            incoming_id: turn.incoming_id,
            outgoing_id: turn.outgoing_id,
            lang_detected: turn.lang_detected.clone(),
            question_tsn_raw: turn.question_tsn_raw.clone(),
            question_en: turn.question_en.clone(),
            answer_en: turn.answer_en.clone(),
            answer_tsn: turn.answer_tsn.clone(),
            llm_model: turn.llm_model.clone(),
            translation_backend: turn.translation_backend.clone(),
            reasoning_summary: turn.reasoning_summary.clone(),
            safety_flags_json: turn.safety_flags_json.clone(),
        };
        rows.push(stored.clone());
        Ok(stored)
    }

    async fn get_turn(&self, id: i64) -> Result<Option<Turn>, RepositoryError> {
        Ok(self.rows.lock().unwrap().iter().find(|t| t.id == id).cloned())
    }

    async fn recent_turns(&self, limit: u32) -> Result<Vec<Turn>, RepositoryError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows.iter().rev().take(limit as usize).cloned().collect())
    }
}

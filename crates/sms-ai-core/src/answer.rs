//! Short English farming advice from a chat model.

use tracing::debug;

use sms_ai_types::llm::{CompletionRequest, LlmError, Message};

use crate::llm::{BoxLlmProvider, ModelOptions};

pub const ANSWER_SYSTEM_PROMPT: &str = "You are an agricultural assistant helping smallholder \
farmers near Johannesburg, South Africa. Farmers send you brief questions by SMS about crops and \
livestock. Reply in simple English with short, clear, practical advice: ideally 2–4 short \
sentences at most. Focus on low-cost, low-risk actions the farmer can take. If you are not sure, \
or the problem sounds serious or life-threatening for people or animals, say that you are not \
sure and recommend talking to a local agricultural extension officer or an experienced farmer. \
Do NOT give exact chemical or medicine dosages, spray recipes, or injection instructions. Do NOT \
pretend to be completely certain when you are not.";

/// An English answer and the model that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Answer {
    pub text: String,
    pub model: String,
}

/// Answers English farming questions.
pub struct Answerer {
    provider: BoxLlmProvider,
    options: ModelOptions,
}

impl Answerer {
    pub fn new(provider: BoxLlmProvider, options: ModelOptions) -> Self {
        Self { provider, options }
    }

    pub async fn ask(&self, question_en: &str) -> Result<Answer, LlmError> {
        let request = CompletionRequest {
            model: self.options.model.clone(),
            messages: vec![Message::user(question_en)],
            system: Some(ANSWER_SYSTEM_PROMPT.to_string()),
            max_tokens: self.options.max_tokens,
            temperature: Some(self.options.temperature),
            tools: Vec::new(),
        };

        let response = self.provider.complete(&request).await?;
        debug!(
            model = %response.model,
            input_tokens = response.usage.input_tokens,
            output_tokens = response.usage.output_tokens,
            "answer complete"
        );

        // Some providers omit the model name.
        let model = if response.model.is_empty() {
            self.options.model.clone()
        } else {
            response.model
        };
        Ok(Answer {
            text: response.content.trim().to_string(),
            model,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ScriptedProvider, text_response};

    #[tokio::test]
    async fn test_ask_sends_prompt_and_trims() {
        let provider = ScriptedProvider::with_texts(["\n Water early in the morning. \n"]);
        let requests = provider.requests();
        let answerer = Answerer::new(
            BoxLlmProvider::new(provider),
            ModelOptions::new("gpt-4o-mini", 0.2, Some(256)),
        );

        let answer = answerer.ask("When should I water tomatoes?").await.unwrap();
        assert_eq!(answer.text, "Water early in the morning.");
        assert_eq!(answer.model, "scripted-model");

        let requests = requests.lock().unwrap();
        assert_eq!(requests[0].system.as_deref(), Some(ANSWER_SYSTEM_PROMPT));
        assert_eq!(requests[0].temperature, Some(0.2));
        assert_eq!(requests[0].messages[0].content, "When should I water tomatoes?");
    }

    #[tokio::test]
    async fn test_empty_model_name_falls_back_to_configured() {
        let mut response = text_response("ok");
        response.model = String::new();
        let answerer = Answerer::new(
            BoxLlmProvider::new(ScriptedProvider::new(vec![Ok(response)])),
            ModelOptions::new("gpt-4o-mini", 0.2, Some(256)),
        );
        assert_eq!(answerer.ask("q").await.unwrap().model, "gpt-4o-mini");
    }
}

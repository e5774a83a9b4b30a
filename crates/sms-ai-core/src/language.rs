//! English <-> Setswana translation through a chat model, primed with
//! glossary terms found in the source text.

use std::sync::Arc;

use tracing::debug;

use sms_ai_types::error::TranslationError;
use sms_ai_types::glossary::{GlossaryEntry, LangCode};
use sms_ai_types::llm::{CompletionRequest, Message};

use crate::glossary::{DEFAULT_MAX_TERMS, GlossaryIndex};
use crate::llm::{BoxLlmProvider, ModelOptions};

pub const TRANSLATION_SYSTEM_PROMPT: &str = "You are a professional translator specialising in \
agricultural communication between English and Setswana (South African Tswana). Translate the \
user's message accurately and faithfully, without adding, removing, or interpreting information. \
Maintain the user's tone and level of formality. Use natural, rural Setswana phrasing where \
appropriate. If a term is ambiguous, choose the most practical farming-related meaning based on \
context. If you are uncertain, provide your best direct translation without explanation.";

const TSN_TO_EN_INSTRUCTION: &str = "Translate from Setswana (South African Tswana) into English. \
Do not add explanations, just translate.";

const EN_TO_TSN_INSTRUCTION: &str = "Translate from English into Setswana (South African Tswana). \
Keep it natural and easy for rural farmers to understand. Do not add explanations, just translate.";

/// Translates between English and Setswana.
pub struct Translator {
    provider: BoxLlmProvider,
    glossary: Arc<GlossaryIndex>,
    options: ModelOptions,
}

impl Translator {
    pub fn new(provider: BoxLlmProvider, glossary: Arc<GlossaryIndex>, options: ModelOptions) -> Self {
        Self {
            provider,
            glossary,
            options,
        }
    }

    /// Model name, recorded on turns as the translation backend.
    pub fn model(&self) -> &str {
        &self.options.model
    }

    /// Translate `text` from `source` into `target`.
    ///
    /// Returns the text unchanged, without a model call, when both languages match.
    pub async fn translate(
        &self,
        text: &str,
        source: LangCode,
        target: LangCode,
    ) -> Result<String, TranslationError> {
        if source == target {
            return Ok(text.to_string());
        }

        let request = CompletionRequest {
            model: self.options.model.clone(),
            messages: vec![Message::user(text)],
            system: Some(self.system_prompt(text, source)),
            max_tokens: self.options.max_tokens,
            temperature: Some(self.options.temperature),
            tools: Vec::new(),
        };

        let response = self.provider.complete(&request).await?;
        debug!(%source, %target, model = %response.model, "translation complete");
        Ok(response.content.trim().to_string())
    }

    /// System prompt for translating `text` out of `source` (the target is
    /// the other language).
    pub fn system_prompt(&self, text: &str, source: LangCode) -> String {
        let instruction = match source {
            LangCode::Tsn => TSN_TO_EN_INSTRUCTION,
            LangCode::En => EN_TO_TSN_INSTRUCTION,
        };
        let mut prompt = format!("{TRANSLATION_SYSTEM_PROMPT} {instruction}");

        let terms = self.glossary.find_terms(text, source, DEFAULT_MAX_TERMS);
        if let Some(block) = glossary_block(&terms, source) {
            prompt.push_str("\n\n");
            prompt.push_str(&block);
        }
        prompt
    }
}

fn glossary_block(terms: &[&GlossaryEntry], source: LangCode) -> Option<String> {
    if terms.is_empty() {
        return None;
    }

    let mut lines = Vec::with_capacity(terms.len() + 1);
    match source {
        LangCode::Tsn => {
            lines.push("Setswana → English glossary (use these English terms):".to_string());
            for entry in terms {
                let forms: Vec<&str> = entry.all_setswana_forms().collect();
                lines.push(format!("- {} → {}", forms.join(" / "), entry.english_label));
            }
        }
        LangCode::En => {
            lines.push("English → Setswana glossary (prefer these Setswana terms):".to_string());
            for entry in terms {
                let mut line = format!("- {} → {}", entry.english_label, entry.setswana_preferred);
                if !entry.setswana_variants.is_empty() {
                    line.push_str(&format!(" (variants: {})", entry.setswana_variants.join(", ")));
                }
                lines.push(line);
            }
        }
    }
    Some(lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedProvider;
    use sms_ai_types::llm::LlmError;

    fn glossary() -> Arc<GlossaryIndex> {
        let entry = |en: &str, tsn: &str, variants: &[&str]| GlossaryEntry {
            english_label: en.to_string(),
            english_pos: None,
            setswana_preferred: tsn.to_string(),
            setswana_variants: variants.iter().map(|v| v.to_string()).collect(),
            setswana_pos: None,
        };
        Arc::new(GlossaryIndex::build(vec![
            entry("abdomen", "mpa", &[]),
            entry("absorb", "gapa", &["gabisa", "gapa godimo"]),
            entry("absorption", "monyelo", &[]),
        ]))
    }

    fn translator(provider: ScriptedProvider, glossary: Arc<GlossaryIndex>) -> Translator {
        Translator::new(
            BoxLlmProvider::new(provider),
            glossary,
            ModelOptions::new("gpt-4o-mini", 0.0, Some(256)),
        )
    }

    #[tokio::test]
    async fn test_tsn_to_en_includes_glossary() {
        let provider = ScriptedProvider::with_texts(["  dummy translation \n"]);
        let requests = provider.requests();
        let t = translator(provider, glossary());

        let out = t.translate("mpa", LangCode::Tsn, LangCode::En).await.unwrap();
        assert_eq!(out, "dummy translation");

        let requests = requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        let req = &requests[0];
        assert_eq!(req.model, "gpt-4o-mini");
        assert_eq!(req.temperature, Some(0.0));
        assert_eq!(req.max_tokens, Some(256));
        assert_eq!(req.messages.len(), 1);
        assert_eq!(req.messages[0].content, "mpa");

        let system = req.system.as_deref().unwrap();
        assert!(system.starts_with(TRANSLATION_SYSTEM_PROMPT));
        assert!(system.contains(TSN_TO_EN_INSTRUCTION));
        assert!(system.contains("Setswana → English glossary"));
        assert!(system.contains("- mpa → abdomen"));
    }

    #[tokio::test]
    async fn test_en_to_tsn_includes_glossary_with_variants() {
        let provider = ScriptedProvider::with_texts(["dummy translation"]);
        let requests = provider.requests();
        let t = translator(provider, glossary());

        t.translate("The abdomen will absorb it", LangCode::En, LangCode::Tsn)
            .await
            .unwrap();

        let requests = requests.lock().unwrap();
        let system = requests[0].system.as_deref().unwrap();
        assert!(system.contains(EN_TO_TSN_INSTRUCTION));
        assert!(system.contains("English → Setswana glossary"));
        assert!(system.contains("- abdomen → mpa"));
        assert!(system.contains("- absorb → gapa (variants: gabisa, gapa godimo)"));
    }

    #[tokio::test]
    async fn test_no_glossary_block_without_matches() {
        let provider = ScriptedProvider::with_texts(["dummy translation"]);
        let requests = provider.requests();
        let t = translator(provider, glossary());

        let out = t.translate("hello world", LangCode::En, LangCode::Tsn).await.unwrap();
        assert_eq!(out, "dummy translation");

        let requests = requests.lock().unwrap();
        let system = requests[0].system.as_deref().unwrap();
        assert!(!system.contains("English → Setswana glossary"));
        assert_eq!(system, format!("{TRANSLATION_SYSTEM_PROMPT} {EN_TO_TSN_INSTRUCTION}"));
    }

    #[tokio::test]
    async fn test_empty_glossary_still_translates() {
        let provider = ScriptedProvider::with_texts(["dummy translation"]);
        let t = translator(provider, Arc::new(GlossaryIndex::empty()));
        let out = t.translate("hello", LangCode::En, LangCode::Tsn).await.unwrap();
        assert_eq!(out, "dummy translation");
    }

    #[tokio::test]
    async fn test_same_language_skips_model() {
        let provider = ScriptedProvider::with_texts([]);
        let requests = provider.requests();
        let t = translator(provider, glossary());

        let out = t.translate("Dumela", LangCode::Tsn, LangCode::Tsn).await.unwrap();
        assert_eq!(out, "Dumela");
        assert!(requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_model_error_propagates() {
        let provider = ScriptedProvider::new(vec![Err(LlmError::AuthenticationFailed)]);
        let t = translator(provider, glossary());
        let err = t.translate("mpa", LangCode::Tsn, LangCode::En).await.unwrap_err();
        assert!(matches!(err, TranslationError::Llm(LlmError::AuthenticationFailed)));
    }
}

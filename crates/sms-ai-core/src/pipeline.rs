//! The message pipeline: store the inbound SMS, produce a reply with the
//! configured backend, record the outbound message and the turn.

use tracing::{info, instrument};

use sms_ai_types::config::Backend;
use sms_ai_types::error::PipelineError;
use sms_ai_types::glossary::LangCode;
use sms_ai_types::sms::NewMessage;
use sms_ai_types::turn::NewTurn;

use crate::agent::FarmAgent;
use crate::answer::Answerer;
use crate::language::Translator;
use crate::repository::{MessageRepository, TurnRepository};

/// How replies are produced.
pub enum Responder {
    /// `We got: {text}`. Nothing but the inbound message is stored.
    Echo,
    /// Setswana -> English, English answer, English -> Setswana.
    Translate {
        translator: Translator,
        answerer: Answerer,
    },
    /// One agent call that detects, translates and answers.
    Agent(FarmAgent),
}

impl Responder {
    pub fn backend(&self) -> Backend {
        match self {
            Responder::Echo => Backend::Echo,
            Responder::Translate { .. } => Backend::Translate,
            Responder::Agent(_) => Backend::Agent,
        }
    }
}

/// Outcome of handling one inbound message.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineResult {
    pub reply_text: String,
    /// Row id of the stored inbound message.
    pub message_id: i64,
    /// Row id of the recorded turn (none for echo replies).
    pub turn_id: Option<i64>,
}

pub struct MessagePipeline<M, T> {
    messages: M,
    turns: T,
    responder: Responder,
}

impl<M: MessageRepository, T: TurnRepository> MessagePipeline<M, T> {
    pub fn new(messages: M, turns: T, responder: Responder) -> Self {
        Self {
            messages,
            turns,
            responder,
        }
    }

    pub fn backend(&self) -> Backend {
        self.responder.backend()
    }

    pub fn turns(&self) -> &T {
        &self.turns
    }

    /// Handle one SMS from `phone`.
    ///
    /// The inbound message is stored before the backend runs, so it survives
    /// a backend failure.
    #[instrument(skip(self, text), fields(backend = %self.responder.backend()))]
    pub async fn handle_message(
        &self,
        phone: &str,
        text: &str,
    ) -> Result<PipelineResult, PipelineError> {
        let incoming = self.messages.save_message(&NewMessage::inbound(phone, text)).await?;
        info!(message_id = incoming.id, "stored inbound message");

        let (reply_text, mut turn) = match &self.responder {
            Responder::Echo => {
                return Ok(PipelineResult {
                    reply_text: format!("We got: {text}"),
                    message_id: incoming.id,
                    turn_id: None,
                });
            }
            Responder::Translate {
                translator,
                answerer,
            } => translate_answer(translator, answerer, phone, text).await?,
            Responder::Agent(agent) => run_agent(agent, phone, text).await?,
        };

        let outgoing = self
            .messages
            .save_message(&NewMessage::outbound(phone, &reply_text))
            .await?;
        turn.incoming_id = Some(incoming.id);
        turn.outgoing_id = Some(outgoing.id);
        let turn = self.turns.save_turn(&turn).await?;

        info!(
            message_id = incoming.id,
            turn_id = turn.id,
            reply_chars = reply_text.chars().count(),
            "reply ready"
        );

        Ok(PipelineResult {
            reply_text,
            message_id: incoming.id,
            turn_id: Some(turn.id),
        })
    }
}

async fn translate_answer(
    translator: &Translator,
    answerer: &Answerer,
    phone: &str,
    text: &str,
) -> Result<(String, NewTurn), PipelineError> {
    let question_en = translator.translate(text, LangCode::Tsn, LangCode::En).await?;
    let answer = answerer.ask(&question_en).await?;
    let answer_tsn = translator
        .translate(&answer.text, LangCode::En, LangCode::Tsn)
        .await?;

    let turn = NewTurn {
        phone: phone.to_string(),
        lang_detected: Some(LangCode::Tsn.to_string()),
        question_tsn_raw: Some(text.to_string()),
        question_en: Some(question_en),
        answer_en: Some(answer.text),
        answer_tsn: Some(answer_tsn.clone()),
        llm_model: Some(answer.model),
        translation_backend: Some(translator.model().to_string()),
        ..NewTurn::default()
    };
    Ok((answer_tsn, turn))
}

async fn run_agent(
    agent: &FarmAgent,
    phone: &str,
    text: &str,
) -> Result<(String, NewTurn), PipelineError> {
    let outcome = agent.run(text).await?;
    let response = outcome.response;

    let reply = match response.final_answer_user_language.trim() {
        "" => response.answer_english.trim().to_string(),
        reply => reply.to_string(),
    };

    let turn = NewTurn {
        phone: phone.to_string(),
        lang_detected: Some(response.detected_language.to_string()),
        question_tsn_raw: Some(text.to_string()),
        question_en: Some(response.english_translation),
        answer_en: Some(response.answer_english),
        answer_tsn: Some(response.final_answer_user_language),
        llm_model: Some(outcome.model),
        translation_backend: Some("agent".to_string()),
        reasoning_summary: Some(response.reasoning_summary),
        safety_flags_json: serde_json::to_string(&response.safety_flags).ok(),
        ..NewTurn::default()
    };
    Ok((reply, turn))
}

//! Application state wiring the pipeline to its concrete adapters.
//!
//! Everything here is built once at startup and shared (via `Arc`) by the
//! HTTP handlers and CLI commands.

use std::sync::Arc;

use anyhow::Context;
use tokio_util::task::TaskTracker;
use tracing::{info, warn};

use sms_ai_core::agent::{AgentOptions, FarmAgent};
use sms_ai_core::answer::Answerer;
use sms_ai_core::glossary::GlossaryIndex;
use sms_ai_core::language::Translator;
use sms_ai_core::llm::ModelOptions;
use sms_ai_core::pipeline::{MessagePipeline, Responder};
use sms_ai_core::search::BoxSearchTool;
use sms_ai_core::sms::BoxSmsSender;
use sms_ai_infra::glossary::load_glossary;
use sms_ai_infra::llm::build_provider;
use sms_ai_infra::search::TavilySearch;
use sms_ai_infra::sqlite::message::SqliteMessageRepository;
use sms_ai_infra::sqlite::pool::DatabasePool;
use sms_ai_infra::sqlite::turn::SqliteTurnRepository;
use sms_ai_infra::twilio::TwilioSender;
use sms_ai_types::config::{Backend, Settings};

/// The pipeline pinned to the SQLite repositories.
pub type ConcretePipeline = MessagePipeline<SqliteMessageRepository, SqliteTurnRepository>;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<ConcretePipeline>,
    /// Out-of-band reply sender. Present only when Twilio is configured.
    pub sms_sender: Option<Arc<BoxSmsSender>>,
    /// Acknowledge webhooks with empty TwiML and reply through `sms_sender`.
    pub async_reply: bool,
    /// Async replies still in flight; drained on shutdown.
    pub reply_tasks: TaskTracker,
}

impl AppState {
    /// Connect to the database, load the glossary and build the responder
    /// for `backend` (or the configured one).
    pub async fn init(settings: &Settings, backend: Option<Backend>) -> anyhow::Result<Self> {
        let db_pool = DatabasePool::new(&settings.database.url)
            .await
            .with_context(|| format!("failed to open database {}", settings.database.url))?;

        let glossary = Arc::new(load_glossary(settings.glossary.csv_path.as_deref()).await?);

        let backend = backend.unwrap_or(settings.pipeline.backend);
        let responder = build_responder(settings, backend, glossary)?;
        info!(%backend, "responder ready");

        let sms_sender = match TwilioSender::from_settings(settings) {
            Ok(sender) => Some(Arc::new(BoxSmsSender::new(sender))),
            Err(e) => {
                if settings.pipeline.async_reply {
                    warn!(error = %e, "async replies requested but Twilio is not configured; replying inline");
                }
                None
            }
        };
        let async_reply = settings.pipeline.async_reply && sms_sender.is_some();

        Ok(Self::from_parts(db_pool, responder, sms_sender, async_reply))
    }

    pub fn from_parts(
        db_pool: DatabasePool,
        responder: Responder,
        sms_sender: Option<Arc<BoxSmsSender>>,
        async_reply: bool,
    ) -> Self {
        let pipeline = MessagePipeline::new(
            SqliteMessageRepository::new(db_pool.clone()),
            SqliteTurnRepository::new(db_pool),
            responder,
        );
        Self {
            pipeline: Arc::new(pipeline),
            sms_sender,
            async_reply,
            reply_tasks: TaskTracker::new(),
        }
    }
}

/// Build the reply strategy for `backend`. Model-backed strategies need the
/// matching API key.
pub fn build_responder(
    settings: &Settings,
    backend: Backend,
    glossary: Arc<GlossaryIndex>,
) -> anyhow::Result<Responder> {
    match backend {
        Backend::Echo => Ok(Responder::Echo),
        Backend::Translate => {
            let t = &settings.translation;
            let provider = build_provider(settings, t.provider, &t.model, t.max_retries)
                .with_context(|| format!("translation model ({}) unavailable", t.provider))?;
            let translator = Translator::new(
                provider,
                glossary,
                ModelOptions::new(&t.model, t.temperature, t.max_tokens),
            );

            let a = &settings.answer;
            let provider = build_provider(settings, a.provider, &a.model, a.max_retries)
                .with_context(|| format!("answer model ({}) unavailable", a.provider))?;
            let answerer =
                Answerer::new(provider, ModelOptions::new(&a.model, a.temperature, a.max_tokens));

            Ok(Responder::Translate {
                translator,
                answerer,
            })
        }
        Backend::Agent => {
            let a = &settings.agent;
            let provider = build_provider(settings, a.provider, &a.model, a.max_retries)
                .with_context(|| format!("agent model ({}) unavailable", a.provider))?;

            let search = match (&settings.secrets.tavily_api_key, a.web_search) {
                (Some(key), true) => Some(BoxSearchTool::new(TavilySearch::new(
                    key.clone(),
                    settings.search.clone(),
                )?)),
                (None, true) => {
                    warn!("TAVILY_API_KEY not set; agent runs without web search");
                    None
                }
                (_, false) => None,
            };

            let options = AgentOptions {
                model: ModelOptions::new(&a.model, a.temperature, a.max_tokens),
                max_tool_loops: a.max_tool_loops,
            };
            Ok(Responder::Agent(FarmAgent::new(provider, search, options)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::SecretString;

    #[test]
    fn test_echo_needs_no_keys() {
        let settings = Settings::default();
        let responder = build_responder(&settings, Backend::Echo, Arc::new(GlossaryIndex::empty())).unwrap();
        assert_eq!(responder.backend(), Backend::Echo);
    }

    #[test]
    fn test_translate_without_key_fails() {
        let settings = Settings::default();
        let result = build_responder(&settings, Backend::Translate, Arc::new(GlossaryIndex::empty()));
        assert!(result.is_err());
    }

    #[test]
    fn test_agent_builds_without_search_key() {
        let mut settings = Settings::default();
        settings.secrets.gemini_api_key = Some(SecretString::from("test-key"));
        let responder = build_responder(&settings, Backend::Agent, Arc::new(GlossaryIndex::empty())).unwrap();
        assert_eq!(responder.backend(), Backend::Agent);
    }

    #[tokio::test]
    async fn test_init_in_memory_echo() {
        let mut settings = Settings::default();
        settings.database.url = "sqlite::memory:".to_string();
        settings.pipeline.async_reply = true;

        let state = AppState::init(&settings, None).await.unwrap();
        assert_eq!(state.pipeline.backend(), Backend::Echo);
        assert!(state.sms_sender.is_none());
        assert!(!state.async_reply);
    }
}

//! Infrastructure implementations for sms-ai.
//!
//! Adapters for the ports defined in `sms-ai-core`: SQLite repositories,
//! the OpenAI-compatible chat client, Tavily search and the Twilio REST
//! sender, plus settings and glossary file loading.

pub mod config;
pub mod glossary;
pub mod llm;
pub mod search;
pub mod sqlite;
pub mod twilio;

//! Shared domain types for sms-ai.
//!
//! Messages, turns, glossary entries, agent responses, LLM request/response
//! shapes, settings, and the error enums used across the workspace.
//!
//! No infrastructure dependencies -- only serde, chrono, thiserror, secrecy.

pub mod agent;
pub mod config;
pub mod error;
pub mod glossary;
pub mod llm;
pub mod sms;
pub mod turn;

//! Business logic and port traits for sms-ai.
//!
//! This crate defines the "ports" (repository, LLM, search and SMS traits)
//! that the infrastructure layer implements, plus the reply pipeline built
//! on top of them. It depends only on `sms-ai-types`, never on
//! `sms-ai-infra` or any database/IO crate.

pub mod agent;
pub mod answer;
pub mod glossary;
pub mod language;
pub mod llm;
pub mod pipeline;
pub mod repository;
pub mod search;
pub mod sms;

#[cfg(test)]
pub(crate) mod testing;

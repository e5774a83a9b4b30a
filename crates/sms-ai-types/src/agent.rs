//! Structured response returned by the farming agent.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Language the agent detected in the farmer's message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectedLanguage {
    Tsn,
    En,
    Mixed,
    Other,
}

impl fmt::Display for DetectedLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DetectedLanguage::Tsn => write!(f, "tsn"),
            DetectedLanguage::En => write!(f, "en"),
            DetectedLanguage::Mixed => write!(f, "mixed"),
            DetectedLanguage::Other => write!(f, "other"),
        }
    }
}

/// Safety markers the agent sets on its own answer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafetyFlags {
    #[serde(default)]
    pub mentions_dosage: bool,
    #[serde(default)]
    pub needs_human_review: bool,
}

/// The single JSON object the agent must return as its final answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentResponse {
    pub detected_language: DetectedLanguage,
    pub source_text: String,
    pub english_translation: String,
    pub intent: String,
    pub answer_english: String,
    pub final_answer_user_language: String,
    #[serde(default)]
    pub safety_flags: SafetyFlags,
    pub reasoning_summary: String,
}

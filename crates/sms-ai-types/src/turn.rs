//! Turn records: one question/answer exchange with every intermediate step.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A turn about to be persisted. Every field except `phone` is optional
/// because different reply backends fill in different subsets.
#[derive(Debug, Clone, Default)]
pub struct NewTurn {
    pub phone: String,
    pub incoming_id: Option<i64>,
    pub outgoing_id: Option<i64>,
    pub lang_detected: Option<String>,
    pub question_tsn_raw: Option<String>,
    pub question_en: Option<String>,
    pub answer_en: Option<String>,
    pub answer_tsn: Option<String>,
    pub llm_model: Option<String>,
    pub translation_backend: Option<String>,
    pub reasoning_summary: Option<String>,
    pub safety_flags_json: Option<String>,
}

/// A persisted turn row, serialized as-is by the admin endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    pub id: i64,
    pub phone: String,
    pub created_at: DateTime<Utc>,
    pub incoming_id: Option<i64>,
    pub outgoing_id: Option<i64>,
    pub lang_detected: Option<String>,
    pub question_tsn_raw: Option<String>,
    pub question_en: Option<String>,
    pub answer_en: Option<String>,
    pub answer_tsn: Option<String>,
    pub llm_model: Option<String>,
    pub translation_backend: Option<String>,
    pub reasoning_summary: Option<String>,
    pub safety_flags_json: Option<String>,
}

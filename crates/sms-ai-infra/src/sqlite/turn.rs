//! SQLite turn repository implementation.

use chrono::Utc;
use sqlx::Row;

use sms_ai_core::repository::TurnRepository;
use sms_ai_types::error::RepositoryError;
use sms_ai_types::turn::{NewTurn, Turn};

use super::pool::DatabasePool;
use super::{format_datetime, parse_datetime};

/// SQLite-backed implementation of `TurnRepository`.
#[derive(Clone)]
pub struct SqliteTurnRepository {
    pool: DatabasePool,
}

impl SqliteTurnRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

struct TurnRow {
    id: i64,
    phone: String,
    created_at: String,
    incoming_id: Option<i64>,
    outgoing_id: Option<i64>,
    lang_detected: Option<String>,
    question_tsn_raw: Option<String>,
    question_en: Option<String>,
    answer_en: Option<String>,
    answer_tsn: Option<String>,
    llm_model: Option<String>,
    translation_backend: Option<String>,
    reasoning_summary: Option<String>,
    safety_flags_json: Option<String>,
}

impl TurnRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            phone: row.try_get("phone")?,
            created_at: row.try_get("created_at")?,
            incoming_id: row.try_get("incoming_id")?,
            outgoing_id: row.try_get("outgoing_id")?,
            lang_detected: row.try_get("lang_detected")?,
            question_tsn_raw: row.try_get("question_tsn_raw")?,
            question_en: row.try_get("question_en")?,
            answer_en: row.try_get("answer_en")?,
            answer_tsn: row.try_get("answer_tsn")?,
            llm_model: row.try_get("llm_model")?,
            translation_backend: row.try_get("translation_backend")?,
            reasoning_summary: row.try_get("reasoning_summary")?,
            safety_flags_json: row.try_get("safety_flags_json")?,
        })
    }

    fn into_turn(self) -> Result<Turn, RepositoryError> {
        Ok(Turn {
            id: self.id,
            phone: self.phone,
            created_at: parse_datetime(&self.created_at)?,
            incoming_id: self.incoming_id,
            outgoing_id: self.outgoing_id,
            lang_detected: self.lang_detected,
            question_tsn_raw: self.question_tsn_raw,
            question_en: self.question_en,
            answer_en: self.answer_en,
            answer_tsn: self.answer_tsn,
            llm_model: self.llm_model,
            translation_backend: self.translation_backend,
            reasoning_summary: self.reasoning_summary,
            safety_flags_json: self.safety_flags_json,
        })
    }
}

impl TurnRepository for SqliteTurnRepository {
    async fn save_turn(&self, turn: &NewTurn) -> Result<Turn, RepositoryError> {
        let created_at = Utc::now();

        let result = sqlx::query(
            r#"INSERT INTO turns
               (phone, incoming_id, outgoing_id, lang_detected, question_tsn_raw, question_en,
                answer_en, answer_tsn, llm_model, translation_backend, reasoning_summary,
                safety_flags_json, created_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(&turn.phone)
        .bind(turn.incoming_id)
        .bind(turn.outgoing_id)
        .bind(&turn.lang_detected)
        .bind(&turn.question_tsn_raw)
        .bind(&turn.question_en)
        .bind(&turn.answer_en)
        .bind(&turn.answer_tsn)
        .bind(&turn.llm_model)
        .bind(&turn.translation_backend)
        .bind(&turn.reasoning_summary)
        .bind(&turn.safety_flags_json)
        .bind(format_datetime(&created_at))
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(Turn {
            id: result.last_insert_rowid(),
            phone: turn.phone.clone(),
            created_at,
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
        })
    }

    async fn get_turn(&self, id: i64) -> Result<Option<Turn>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM turns WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        match row {
            Some(row) => {
                let r = TurnRow::from_row(&row).map_err(|e| RepositoryError::Query(e.to_string()))?;
                Ok(Some(r.into_turn()?))
            }
            None => Ok(None),
        }
    }

    async fn recent_turns(&self, limit: u32) -> Result<Vec<Turn>, RepositoryError> {
        let rows = sqlx::query("SELECT * FROM turns ORDER BY created_at DESC, id DESC LIMIT ?")
            .bind(limit as i64)
            .fetch_all(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let mut turns = Vec::with_capacity(rows.len());
        for row in &rows {
            let r = TurnRow::from_row(row).map_err(|e| RepositoryError::Query(e.to_string()))?;
            turns.push(r.into_turn()?);
        }
        Ok(turns)
    }
}

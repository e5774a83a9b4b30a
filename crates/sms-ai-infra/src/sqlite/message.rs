//! SQLite message repository implementation.

use chrono::Utc;
use sqlx::Row;

use sms_ai_core::repository::MessageRepository;
use sms_ai_types::error::RepositoryError;
use sms_ai_types::sms::{Direction, NewMessage, StoredMessage};

use super::pool::DatabasePool;
use super::{format_datetime, parse_datetime};

/// SQLite-backed implementation of `MessageRepository`.
#[derive(Clone)]
pub struct SqliteMessageRepository {
    pool: DatabasePool,
}

impl SqliteMessageRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

struct MessageRow {
    id: i64,
    phone: String,
    direction: String,
    text: String,
    created_at: String,
}

impl MessageRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            phone: row.try_get("phone")?,
            direction: row.try_get("direction")?,
            text: row.try_get("text")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_message(self) -> Result<StoredMessage, RepositoryError> {
        let direction: Direction = self
            .direction
            .parse()
            .map_err(RepositoryError::Query)?;
        Ok(StoredMessage {
            id: self.id,
            phone: self.phone,
            direction,
            text: self.text,
            created_at: parse_datetime(&self.created_at)?,
        })
    }
}

impl MessageRepository for SqliteMessageRepository {
    async fn save_message(&self, message: &NewMessage) -> Result<StoredMessage, RepositoryError> {
        let created_at = Utc::now();

        let result = sqlx::query(
            "INSERT INTO messages (phone, direction, text, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&message.phone)
        .bind(message.direction.to_string())
        .bind(&message.text)
        .bind(format_datetime(&created_at))
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(StoredMessage {
            id: result.last_insert_rowid(),
            phone: message.phone.clone(),
            direction: message.direction,
            text: message.text.clone(),
            created_at,
        })
    }

    async fn get_message(&self, id: i64) -> Result<Option<StoredMessage>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM messages WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        match row {
            Some(row) => {
                let r = MessageRow::from_row(&row)
                    .map_err(|e| RepositoryError::Query(e.to_string()))?;
                Ok(Some(r.into_message()?))
            }
            None => Ok(None),
        }
    }
}

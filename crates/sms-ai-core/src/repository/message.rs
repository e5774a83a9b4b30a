//! Message log repository trait.

use sms_ai_types::error::RepositoryError;
use sms_ai_types::sms::{NewMessage, StoredMessage};

/// Append-only log of every SMS received or sent.
pub trait MessageRepository: Send + Sync {
    /// Persist a message, stamping it with the current time. Returns the stored row.
    fn save_message(
        &self,
        message: &NewMessage,
    ) -> impl std::future::Future<Output = Result<StoredMessage, RepositoryError>> + Send;

    /// Fetch a message by its row id.
    fn get_message(
        &self,
        id: i64,
    ) -> impl std::future::Future<Output = Result<Option<StoredMessage>, RepositoryError>> + Send;
}

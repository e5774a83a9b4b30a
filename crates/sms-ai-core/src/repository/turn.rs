//! Turn repository trait.

use sms_ai_types::error::RepositoryError;
use sms_ai_types::turn::{NewTurn, Turn};

/// Storage for question/answer turns.
pub trait TurnRepository: Send + Sync {
    /// Persist a turn, stamping it with the current time. Returns the stored row.
    fn save_turn(
        &self,
        turn: &NewTurn,
    ) -> impl std::future::Future<Output = Result<Turn, RepositoryError>> + Send;

    /// Fetch a turn by its row id.
    fn get_turn(
        &self,
        id: i64,
    ) -> impl std::future::Future<Output = Result<Option<Turn>, RepositoryError>> + Send;

    /// Most recent turns, newest first.
    fn recent_turns(
        &self,
        limit: u32,
    ) -> impl std::future::Future<Output = Result<Vec<Turn>, RepositoryError>> + Send;
}

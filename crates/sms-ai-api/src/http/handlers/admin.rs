//! Read-only admin views.

use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use sms_ai_core::repository::TurnRepository;
use sms_ai_types::turn::Turn;

use crate::http::error::AppError;
use crate::http::extract::AppQuery;
use crate::state::AppState;

const DEFAULT_LIMIT: i64 = 50;
const MAX_LIMIT: i64 = 200;

#[derive(Debug, Deserialize)]
pub struct TurnsQuery {
    pub limit: Option<i64>,
}

/// GET /admin/turns?limit=N - newest turns first, `limit` clamped to 1..=200.
pub async fn list_turns(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<TurnsQuery>,
) -> Result<Json<Vec<Turn>>, AppError> {
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let turns = state.pipeline.turns().recent_turns(limit as u32).await?;
    Ok(Json(turns))
}

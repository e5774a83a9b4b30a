//! JSON test endpoint that runs the pipeline without a carrier.

use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

use sms_ai_types::sms::InboundSms;

use crate::http::error::AppError;
use crate::http::extract::AppJson;
use crate::state::AppState;

/// POST /test/inbound - `{phone, text}` in, `{status, message_id, echo}` out.
pub async fn test_inbound(
    State(state): State<AppState>,
    AppJson(payload): AppJson<InboundSms>,
) -> Result<Json<Value>, AppError> {
    let result = state
        .pipeline
        .handle_message(&payload.phone, &payload.text)
        .await?;

    Ok(Json(json!({
        "status": "ok",
        "message_id": result.message_id,
        "echo": result.reply_text,
    })))
}

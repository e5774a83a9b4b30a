//! Twilio inbound-SMS webhook.
//!
//! Twilio posts `application/x-www-form-urlencoded` with (among others)
//! `From` and `Body`. In inline mode the reply is returned as TwiML. In
//! async mode the webhook is acknowledged with empty TwiML and the reply is
//! sent through the REST API once the pipeline finishes.

use axum::extract::State;
use serde::Deserialize;
use tracing::{error, info, warn};

use crate::http::error::{AppError, MISSING_WEBHOOK_FIELDS};
use crate::http::extract::AppForm;
use crate::http::twiml::TwiMl;
use crate::state::AppState;

/// Sent when the pipeline fails in inline mode. Still a 200, so Twilio
/// does not retry the webhook.
pub const APOLOGY_TEXT: &str =
    "Sorry, we could not answer your message right now. Please try again later.";

#[derive(Debug, Deserialize)]
pub struct TwilioWebhook {
    #[serde(rename = "From")]
    pub from: Option<String>,
    #[serde(rename = "Body")]
    pub body: Option<String>,
}

/// POST /sms/inbound
pub async fn sms_inbound(
    State(state): State<AppState>,
    AppForm(form): AppForm<TwilioWebhook>,
) -> Result<TwiMl, AppError> {
    let (Some(phone), Some(text)) = (
        form.from.filter(|s| !s.is_empty()),
        form.body.filter(|s| !s.is_empty()),
    ) else {
        return Err(AppError::Validation(MISSING_WEBHOOK_FIELDS.to_string()));
    };

    if let (true, Some(sender)) = (state.async_reply, state.sms_sender.clone()) {
        let pipeline = state.pipeline.clone();
        state.reply_tasks.spawn(async move {
            let reply = match pipeline.handle_message(&phone, &text).await {
                Ok(result) => result.reply_text,
                Err(e) => {
                    error!(error = %e, "pipeline failed for async reply");
                    APOLOGY_TEXT.to_string()
                }
            };
            match sender.send(&phone, &reply).await {
                Ok(sid) => info!(%sid, "async reply sent"),
                Err(e) => error!(error = %e, "failed to send async reply"),
            }
        });
        return Ok(TwiMl::empty());
    }

    match state.pipeline.handle_message(&phone, &text).await {
        Ok(result) => Ok(TwiMl::message(&result.reply_text)),
        Err(e) => {
            warn!(error = %e, "pipeline failed, replying with apology");
            Ok(TwiMl::message(APOLOGY_TEXT))
        }
    }
}

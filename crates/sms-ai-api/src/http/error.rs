//! Application error type mapping to HTTP status codes.
//!
//! Every error body has the shape `{"detail": "..."}`.

use axum::extract::rejection::{FormRejection, JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::error;

use sms_ai_types::error::{PipelineError, RepositoryError};

pub const MISSING_WEBHOOK_FIELDS: &str = "Missing 'From' or 'Body' in webhook payload";

#[derive(Debug)]
pub enum AppError {
    /// Bad or incomplete request payload.
    Validation(String),
    /// An extractor refused the request before the handler ran.
    Rejection { status: StatusCode, detail: String },
    Pipeline(PipelineError),
    Repository(RepositoryError),
}

impl From<PipelineError> for AppError {
    fn from(e: PipelineError) -> Self {
        AppError::Pipeline(e)
    }
}

impl From<RepositoryError> for AppError {
    fn from(e: RepositoryError) -> Self {
        AppError::Repository(e)
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Rejection {
            status: rejection.status(),
            detail: rejection.body_text(),
        }
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::Rejection {
            status: StatusCode::BAD_REQUEST,
            detail: rejection.body_text(),
        }
    }
}

// The only form is the Twilio webhook; an unreadable one lacks From/Body.
impl From<FormRejection> for AppError {
    fn from(_: FormRejection) -> Self {
        AppError::Validation(MISSING_WEBHOOK_FIELDS.to_string())
    }
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Rejection { status, .. } => *status,
            // Model, search and translation failures are upstream problems.
            AppError::Pipeline(PipelineError::Storage(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Pipeline(_) => StatusCode::BAD_GATEWAY,
            AppError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn detail(&self) -> String {
        match self {
            AppError::Validation(msg) => msg.clone(),
            AppError::Rejection { detail, .. } => detail.clone(),
            AppError::Pipeline(e) => e.to_string(),
            AppError::Repository(e) => e.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = self.detail();
        if status.is_server_error() {
            error!(%status, %detail, "request failed");
        }
        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

//! Axum router configuration with middleware.

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

/// Build the complete router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/test/inbound", post(handlers::inbound::test_inbound))
        .route("/sms/inbound", post(handlers::sms::sms_inbound))
        .route("/admin/turns", get(handlers::admin::list_turns))
        .route("/health", get(health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /health
async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;

    use sms_ai_core::pipeline::Responder;
    use sms_ai_core::repository::TurnRepository;
    use sms_ai_core::sms::{BoxSmsSender, SmsSender};
    use sms_ai_infra::sqlite::pool::DatabasePool;
    use sms_ai_infra::sqlite::turn::SqliteTurnRepository;
    use sms_ai_types::error::SmsError;
    use sms_ai_types::turn::NewTurn;

    use super::*;

    async fn echo_state() -> AppState {
        let pool = DatabasePool::new("sqlite::memory:").await.unwrap();
        AppState::from_parts(pool, Responder::Echo, None, false)
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn body_text(response: axum::response::Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn form_request(body: &'static str) -> Request<Body> {
        Request::post("/sms/inbound")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap()
    }

    #[derive(Clone, Default)]
    struct RecordingSender {
        sent: Arc<Mutex<Vec<(String, String)>>>,
    }

    impl SmsSender for RecordingSender {
        async fn send(&self, to: &str, body: &str) -> Result<String, SmsError> {
            self.sent.lock().unwrap().push((to.to_string(), body.to_string()));
            Ok("SM1".to_string())
        }
    }

    #[tokio::test]
    async fn test_health() {
        let app = build_router(echo_state().await);
        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_inbound_echo() {
        let app = build_router(echo_state().await);
        let response = app
            .oneshot(
                Request::post("/test/inbound")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"phone":"+27123456789","text":"Hello"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "ok");
        assert_eq!(json["echo"], "We got: Hello");
        assert!(json["message_id"].as_i64().unwrap() > 0);
    }

    #[tokio::test]
    async fn test_sms_webhook_returns_twiml() {
        let app = build_router(echo_state().await);
        let response = app
            .oneshot(form_request("From=%2B27123456789&Body=Dumela+rra"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/xml"
        );
        let body = body_text(response).await;
        assert!(body.starts_with("<?xml"));
        assert!(body.contains("<Message>We got: Dumela rra</Message>"));
    }

    #[tokio::test]
    async fn test_sms_webhook_missing_fields() {
        let app = build_router(echo_state().await);
        let response = app.oneshot(form_request("From=%2B27123456789")).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await["detail"],
            "Missing 'From' or 'Body' in webhook payload"
        );
    }

    #[tokio::test]
    async fn test_inbound_missing_field_is_detail_json() {
        let app = build_router(echo_state().await);
        let response = app
            .oneshot(
                Request::post("/test/inbound")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"phone":"+27123456789"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/json"
        );
        let json = body_json(response).await;
        assert!(json["detail"].as_str().unwrap().contains("text"));
    }

    #[tokio::test]
    async fn test_inbound_wrong_content_type_is_detail_json() {
        let app = build_router(echo_state().await);
        let response = app
            .oneshot(
                Request::post("/test/inbound")
                    .body(Body::from(r#"{"phone":"+27123456789","text":"Hi"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert!(body_json(response).await["detail"].is_string());
    }

    #[tokio::test]
    async fn test_sms_webhook_non_form_body() {
        let app = build_router(echo_state().await);
        let response = app
            .oneshot(
                Request::post("/sms/inbound")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"From":"+27123456789","Body":"Dumela"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await["detail"],
            "Missing 'From' or 'Body' in webhook payload"
        );
    }

    #[tokio::test]
    async fn test_admin_turns_bad_limit_is_detail_json() {
        let app = build_router(echo_state().await);
        let response = app
            .oneshot(Request::get("/admin/turns?limit=abc").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_json(response).await["detail"]
            .as_str()
            .unwrap()
            .starts_with("Failed to deserialize query string"));
    }

    #[tokio::test]
    async fn test_sms_webhook_async_reply() {
        let pool = DatabasePool::new("sqlite::memory:").await.unwrap();
        let sender = RecordingSender::default();
        let sent = sender.sent.clone();
        let state = AppState::from_parts(
            pool,
            Responder::Echo,
            Some(Arc::new(BoxSmsSender::new(sender))),
            true,
        );
        let reply_tasks = state.reply_tasks.clone();
        let app = build_router(state);

        let response = app
            .oneshot(form_request("From=%2B27123456789&Body=Dumela"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("<Response></Response>"));

        // Shutdown path: the tracked reply finishes before wait() returns.
        reply_tasks.close();
        reply_tasks.wait().await;
        let sent = sent.lock().unwrap();
        assert_eq!(
            sent.as_slice(),
            &[("+27123456789".to_string(), "We got: Dumela".to_string())]
        );
    }

    #[tokio::test]
    async fn test_admin_turns_newest_first_and_clamped() {
        let pool = DatabasePool::new("sqlite::memory:").await.unwrap();
        let turns = SqliteTurnRepository::new(pool.clone());
        for i in 0..3 {
            turns
                .save_turn(&NewTurn {
                    phone: format!("+2700000000{i}"),
                    question_tsn_raw: Some(format!("question {i}")),
                    reasoning_summary: Some("checked".to_string()),
                    ..Default::default()
                })
                .await
                .unwrap();
        }
        let app = build_router(AppState::from_parts(pool, Responder::Echo, None, false));

        let response = app
            .clone()
            .oneshot(Request::get("/admin/turns").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        let rows = json.as_array().unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0]["question_tsn_raw"], "question 2");
        assert_eq!(rows[2]["question_tsn_raw"], "question 0");
        assert_eq!(rows[0]["reasoning_summary"], "checked");
        assert!(rows[0]["safety_flags_json"].is_null());

        let response = app
            .oneshot(Request::get("/admin/turns?limit=0").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(body_json(response).await.as_array().unwrap().len(), 1);
    }
}

//! Axum request handlers for all service endpoints.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use common::{
    protocol::{ErrorResponse, HealthResponse, Message},
    ServiceError,
};

use super::state::AppState;

/// `POST /message` — handle one `encrypt` or `decrypt` request.
///
/// Success is `200` with the resulting text as a JSON string. Bodies that do
/// not parse as a [`Message`] get the extractor's status with an
/// `invalid_message` [`ErrorResponse`], like every other failure.
pub async fn message(
    State(state): State<AppState>,
    payload: Result<Json<Message>, JsonRejection>,
) -> Response {
    let msg = match payload {
        Ok(Json(msg)) => msg,
        Err(rejection) => {
            let err = ErrorResponse::new("invalid_message", rejection.body_text());
            return (rejection.status(), Json(err)).into_response();
        }
    };
    match state.service.handle(msg) {
        Ok(text) => (StatusCode::OK, Json(text)).into_response(),
        Err(e) => error_response(&e),
    }
}

/// `GET /health` — readiness check.
///
/// Returns `200 OK` when the session key is loaded, `503` otherwise.
pub async fn health(State(state): State<AppState>) -> Response {
    let key_ready = state.service.is_ready();

    let (status_code, status_str) = if key_ready {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };

    let body = HealthResponse {
        status: status_str.into(),
        key_ready,
    };
    (status_code, Json(body)).into_response()
}

/// Catch-all 404 handler.
pub async fn not_found() -> impl IntoResponse {
    let err = ErrorResponse::new("not_found", "the requested resource does not exist");
    (StatusCode::NOT_FOUND, Json(err))
}

fn error_response(err: &ServiceError) -> Response {
    let status =
        StatusCode::from_u16(err.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(ErrorResponse::from(err))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::Codec;
    use crate::key::{KeyStore, MemoryStorage};
    use crate::service::MessageService;
    use axum::routing::{get, post};
    use axum::{body::Body, http::Request, Router};
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn test_router(state: AppState) -> Router {
        Router::new()
            .route("/message", post(message))
            .route("/health", get(health))
            .with_state(state)
    }

    async fn ready_state() -> AppState {
        let keys = KeyStore::new(Arc::new(MemoryStorage::new()));
        keys.initialize().await.unwrap();
        AppState::new(MessageService::new(Codec::new(keys)))
    }

    async fn post_message(app: Router, body: Value) -> (StatusCode, Value) {
        let req = Request::builder()
            .method("POST")
            .uri("/message")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    #[tokio::test]
    async fn health_returns_503_when_not_ready() {
        let app = test_router(AppState::default());
        let req = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn health_returns_200_when_ready() {
        let app = test_router(ready_state().await);
        let req = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn encrypt_then_decrypt_over_http() {
        let state = ready_state().await;
        let plain = r#"["https://a.example","https://b.example"]"#;

        let (status, envelope) = post_message(
            test_router(state.clone()),
            json!({"command": "encrypt", "plainText": plain}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let envelope = envelope.as_str().unwrap().to_owned();
        assert!(!envelope.contains("https://"));

        let (status, body) = post_message(
            test_router(state),
            json!({"command": "decrypt", "cipherText": envelope}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, Value::String(plain.to_owned()));
    }

    #[tokio::test]
    async fn encrypt_before_ready_is_503() {
        let (status, body) = post_message(
            test_router(AppState::default()),
            json!({"command": "encrypt", "plainText": "[]"}),
        )
        .await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["code"], "key_unavailable");
    }

    #[tokio::test]
    async fn malformed_envelope_is_400() {
        let (status, body) = post_message(
            test_router(ready_state().await),
            json!({"command": "decrypt", "cipherText": "AAAA"}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "malformed_envelope");
    }

    #[tokio::test]
    async fn foreign_envelope_is_422() {
        let other = ready_state().await;
        let envelope = other
            .service
            .handle(Message::Encrypt {
                plain_text: "[]".into(),
            })
            .unwrap();

        let (status, body) = post_message(
            test_router(ready_state().await),
            json!({"command": "decrypt", "cipherText": envelope}),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["code"], "decryption_failure");
    }

    #[tokio::test]
    async fn unknown_command_is_rejected() {
        let (status, body) = post_message(
            test_router(ready_state().await),
            json!({"command": "rotate"}),
        )
        .await;
        assert!(status.is_client_error());
        assert_eq!(body["code"], "invalid_message");
        assert!(body["message"].as_str().is_some_and(|m| !m.is_empty()));
    }

    #[tokio::test]
    async fn non_json_body_gets_error_response() {
        let req = Request::builder()
            .method("POST")
            .uri("/message")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let resp = test_router(ready_state().await).oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: ErrorResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body.code, "invalid_message");
    }

    #[tokio::test]
    async fn missing_content_type_gets_error_response() {
        let req = Request::builder()
            .method("POST")
            .uri("/message")
            .body(Body::from(r#"{"command":"encrypt","plainText":"[]"}"#))
            .unwrap();
        let resp = test_router(ready_state().await).oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: ErrorResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body.code, "invalid_message");
    }
}

//! Axum request handlers for all service endpoints.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::Utc;
use common::protocol::{ErrorResponse, HealthResponse, KeyRequest, KeyResponse};
use common::ServiceError;
use tracing::warn;

use super::state::AppState;

/// Translate a [`ServiceError`] into its HTTP rejection response.
fn reject(err: ServiceError) -> Response {
    let status = StatusCode::from_u16(err.http_status())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(ErrorResponse::new(err.message()))).into_response()
}

/// `POST /api/encryption-key` — release the session key to verified requests.
///
/// The request must carry a `verification` value that base64-decodes to the
/// configured token, and a `timestamp` within the freshness window of server
/// time. Both checks answer 403; a missing server-side key answers 500. The
/// token is static and visible in client code, so this gate deters casual
/// replay only.
pub async fn issue_key(State(state): State<AppState>, Json(req): Json<KeyRequest>) -> Response {
    // Verification token: reversible encoding, not a credential.
    let decoded = STANDARD
        .decode(req.verification.as_bytes())
        .ok()
        .and_then(|bytes| String::from_utf8(bytes).ok());
    match decoded {
        Some(token) if token == *state.verification_token => {}
        _ => {
            warn!("key request rejected: bad verification token");
            return reject(ServiceError::Unauthorized("Invalid verification".into()));
        }
    }

    // Timestamp freshness: coarse replay mitigation. abs_diff keeps
    // attacker-supplied extremes (i64::MIN/MAX) from overflowing.
    let now_ms = Utc::now().timestamp_millis();
    let window_ms = state.freshness_window.as_millis() as u64;
    if now_ms.abs_diff(req.timestamp) > window_ms {
        warn!(timestamp = req.timestamp, "key request rejected: stale timestamp");
        return reject(ServiceError::Unauthorized("Invalid timestamp".into()));
    }

    // The key comes from server configuration; it is never invented here.
    let Some(key) = state.encryption_key.as_deref() else {
        warn!("ENCRYPTION_KEY not set; cannot issue key");
        return reject(ServiceError::Misconfigured(
            "Encryption key not configured".into(),
        ));
    };

    let body = KeyResponse {
        key: key.to_owned(),
        timestamp: now_ms,
    };
    (StatusCode::OK, Json(body)).into_response()
}

/// `GET /health` — liveness and readiness check.
///
/// Returns `200 OK` when the encryption key is configured and
/// `503 Service Unavailable` otherwise.
pub async fn health(State(state): State<AppState>) -> Response {
    let key_configured = state.encryption_key.is_some();
    let (status_code, status_str) = if key_configured {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };

    let body = HealthResponse {
        status: status_str.into(),
        key_configured,
    };
    (status_code, Json(body)).into_response()
}

/// Catch-all 404 handler.
pub async fn not_found() -> impl IntoResponse {
    let err = ErrorResponse::new("the requested resource does not exist");
    (StatusCode::NOT_FOUND, Json(err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    use crate::server::router;

    fn configured_state() -> AppState {
        AppState::new(
            Some("super-secret-session-key".into()),
            "yournextdate-app".into(),
            std::time::Duration::from_secs(300),
        )
    }

    fn key_request(timestamp: i64, verification: &str) -> Request<Body> {
        let body = serde_json::json!({
            "timestamp": timestamp,
            "verification": verification,
        });
        Request::builder()
            .method("POST")
            .uri("/api/encryption-key")
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap()
    }

    fn encode_token(token: &str) -> String {
        STANDARD.encode(token.as_bytes())
    }

    #[tokio::test]
    async fn fresh_verified_request_receives_key() {
        let app = router::build(configured_state());
        let now = Utc::now().timestamp_millis();
        let resp = app
            .oneshot(key_request(now, &encode_token("yournextdate-app")))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let body: KeyResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body.key, "super-secret-session-key");
    }

    #[tokio::test]
    async fn stale_timestamp_is_rejected() {
        let app = router::build(configured_state());
        let ten_minutes_ago = Utc::now().timestamp_millis() - 10 * 60 * 1000;
        let resp = app
            .oneshot(key_request(ten_minutes_ago, &encode_token("yournextdate-app")))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn future_timestamp_is_rejected() {
        let app = router::build(configured_state());
        let ten_minutes_ahead = Utc::now().timestamp_millis() + 10 * 60 * 1000;
        let resp = app
            .oneshot(key_request(ten_minutes_ahead, &encode_token("yournextdate-app")))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn extreme_timestamps_are_rejected_without_panicking() {
        for ts in [i64::MIN, i64::MAX, 0] {
            let app = router::build(configured_state());
            let resp = app
                .oneshot(key_request(ts, &encode_token("yournextdate-app")))
                .await
                .unwrap();
            assert_eq!(resp.status(), StatusCode::FORBIDDEN, "timestamp {ts}");
        }
    }

    #[tokio::test]
    async fn wrong_verification_is_rejected() {
        let app = router::build(configured_state());
        let now = Utc::now().timestamp_millis();
        let resp = app
            .oneshot(key_request(now, &encode_token("someone-else")))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn undecodable_verification_is_rejected() {
        let app = router::build(configured_state());
        let now = Utc::now().timestamp_millis();
        let resp = app.oneshot(key_request(now, "!!!not-base64!!!")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn get_method_is_rejected() {
        let app = router::build(configured_state());
        let req = Request::builder()
            .method("GET")
            .uri("/api/encryption-key")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn missing_key_answers_500() {
        let app = router::build(AppState::default());
        let now = Utc::now().timestamp_millis();
        let resp = app
            .oneshot(key_request(now, &encode_token("yournextdate-app")))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let body: ErrorResponse = serde_json::from_slice(&bytes).unwrap();
        assert!(body.error.contains("not configured"));
    }

    #[tokio::test]
    async fn health_reports_key_state() {
        let app = router::build(configured_state());
        let req = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let app = router::build(AppState::default());
        let req = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}

//! Integration tests for session token issuance.
//!
//! Runs the token client and the token server router against a wiremock
//! stand-in for the avatar-hosting service.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::util::ServiceExt;
use wiremock::matchers::{body_partial_json, header as header_matcher, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use avatar_voice_client::{
    AppState, ServerConfig, SessionTokenClient, SessionTokenRequest, TokenError, routes,
};

fn test_config(api_url: &str) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        avatar_api_url: api_url.to_string(),
        avatar_api_key: "test-key".to_string(),
        avatar_id: "avatar-1".to_string(),
        voice_id: Some("voice-1".to_string()),
        context_id: None,
        language: Some("en".to_string()),
        is_sandbox: true,
        cors_allowed_origins: None,
    }
}

fn token_request() -> SessionTokenRequest {
    SessionTokenRequest {
        avatar_id: "avatar-1".to_string(),
        voice_id: Some("voice-1".to_string()),
        context_id: None,
        language: Some("en".to_string()),
        push_to_talk: false,
        is_sandbox: true,
    }
}

async fn mock_token_success(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/v1/sessions/token"))
        .and(header_matcher("X-API-KEY", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "session_token": "session-token-1",
                "session_id": "session-id-1",
            }
        })))
        .mount(server)
        .await;
}

// =============================================================================
// Token client
// =============================================================================

#[tokio::test]
async fn issues_a_session_token() {
    let server = MockServer::start().await;
    mock_token_success(&server).await;

    let client = SessionTokenClient::new(server.uri(), "test-key");
    let token = client.issue_token(&token_request()).await.unwrap();

    assert_eq!(token.session_token, "session-token-1");
    assert_eq!(token.session_id, "session-id-1");
}

#[tokio::test]
async fn sends_push_to_talk_interactivity_type() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/sessions/token"))
        .and(body_partial_json(json!({
            "mode": "FULL",
            "interactivity_type": "PUSH_TO_TALK",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "session_token": "tok", "session_id": "sid" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = SessionTokenClient::new(server.uri(), "test-key");
    let mut request = token_request();
    request.push_to_talk = true;
    client.issue_token(&request).await.unwrap();
}

#[tokio::test]
async fn extracts_upstream_json_error_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/sessions/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "data": [{ "message": "avatar not found" }]
        })))
        .mount(&server)
        .await;

    let client = SessionTokenClient::new(server.uri(), "test-key");
    let err = client.issue_token(&token_request()).await.unwrap_err();

    match err {
        TokenError::Upstream { status, message } => {
            assert_eq!(status, 400);
            assert_eq!(message, "avatar not found");
        }
        other => panic!("expected upstream error, got {other:?}"),
    }
}

#[tokio::test]
async fn extracts_error_field_from_upstream_json() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/sessions/token"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "error": "invalid api key" })),
        )
        .mount(&server)
        .await;

    let client = SessionTokenClient::new(server.uri(), "test-key");
    let err = client.issue_token(&token_request()).await.unwrap_err();

    match err {
        TokenError::Upstream { status, message } => {
            assert_eq!(status, 401);
            assert_eq!(message, "invalid api key");
        }
        other => panic!("expected upstream error, got {other:?}"),
    }
}

#[tokio::test]
async fn falls_back_to_upstream_body_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/sessions/token"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .mount(&server)
        .await;

    let client = SessionTokenClient::new(server.uri(), "test-key");
    let err = client.issue_token(&token_request()).await.unwrap_err();

    match err {
        TokenError::Upstream { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "upstream exploded");
        }
        other => panic!("expected upstream error, got {other:?}"),
    }
}

#[tokio::test]
async fn rejects_empty_session_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/sessions/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "session_token": "", "session_id": "sid" }
        })))
        .mount(&server)
        .await;

    let client = SessionTokenClient::new(server.uri(), "test-key");
    let err = client.issue_token(&token_request()).await.unwrap_err();

    assert!(matches!(err, TokenError::EmptyToken));
}

// =============================================================================
// Token server router
// =============================================================================

async fn read_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn test_router(api_url: &str) -> axum::Router {
    let state = Arc::new(AppState::new(test_config(api_url)));
    routes::api::create_api_router().with_state(state)
}

#[tokio::test]
async fn health_check_returns_ok() {
    let app = test_router("http://localhost:1");

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn start_session_returns_token_pair() {
    let server = MockServer::start().await;
    mock_token_success(&server).await;
    let app = test_router(&server.uri());

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/v1/token")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"push_to_talk":false}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["session_token"], "session-token-1");
    assert_eq!(body["session_id"], "session-id-1");
}

#[tokio::test]
async fn start_session_accepts_missing_body() {
    let server = MockServer::start().await;
    mock_token_success(&server).await;
    let app = test_router(&server.uri());

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/v1/token")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn start_session_defaults_on_malformed_body() {
    let server = MockServer::start().await;
    mock_token_success(&server).await;
    let app = test_router(&server.uri());

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/v1/token")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["session_token"], "session-token-1");
}

#[tokio::test]
async fn start_session_forwards_push_to_talk() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/sessions/token"))
        .and(body_partial_json(json!({
            "interactivity_type": "PUSH_TO_TALK"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "session_token": "tok", "session_id": "sid" }
        })))
        .expect(1)
        .mount(&server)
        .await;
    let app = test_router(&server.uri());

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/v1/token")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"push_to_talk":true}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn start_session_passes_upstream_errors_through() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/sessions/token"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "error": "invalid api key" })),
        )
        .mount(&server)
        .await;
    let app = test_router(&server.uri());

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/v1/token")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = read_json(response).await;
    assert_eq!(body["error"], "invalid api key");
}

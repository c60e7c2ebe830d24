//! Session token issuance handler.
//!
//! Browser demos call this instead of the avatar service directly so the
//! long-lived API key never reaches the page.

use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::SessionTokenRequest;
use crate::errors::AppResult;
use crate::state::AppState;

/// Request body for `POST /v1/token`. The body is optional; an absent,
/// non-JSON, or malformed body all behave like the defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StartSessionRequest {
    /// Issue a push-to-talk session instead of a conversational one
    #[serde(default)]
    pub push_to_talk: bool,
}

/// Response body for `POST /v1/token`.
#[derive(Debug, Clone, Serialize)]
pub struct StartSessionResponse {
    pub session_token: String,
    pub session_id: String,
}

/// Exchange the configured API key for a short-lived session token.
pub async fn start_session(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> AppResult<Json<StartSessionResponse>> {
    // Unparseable bodies fall back to the defaults rather than rejecting.
    let request: StartSessionRequest = serde_json::from_slice(&body).unwrap_or_default();

    let token_request = SessionTokenRequest {
        avatar_id: state.config.avatar_id.clone(),
        voice_id: state.config.voice_id.clone(),
        context_id: state.config.context_id.clone(),
        language: state.config.language.clone(),
        push_to_talk: request.push_to_talk,
        is_sandbox: state.config.is_sandbox,
    };

    let token = state.token_client.issue_token(&token_request).await?;
    info!(session_id = %token.session_id, push_to_talk = request.push_to_talk, "session token issued");

    Ok(Json(StartSessionResponse {
        session_token: token.session_token,
        session_id: token.session_id,
    }))
}

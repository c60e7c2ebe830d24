//! HTTP-facing error type for the token server.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use crate::api::TokenError;

/// Application error for HTTP handlers.
#[derive(Debug, Error)]
pub enum AppError {
    /// Token issuance against the avatar service failed
    #[error(transparent)]
    Token(#[from] TokenError),

    /// Anything else
    #[error("{0}")]
    Internal(String),
}

/// Result type for HTTP handlers.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            // Pass the upstream status through so browser clients see the
            // same failure the avatar service reported.
            AppError::Token(TokenError::Upstream { status, message }) => (
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY),
                message.clone(),
            ),
            AppError::Token(err) => (StatusCode::BAD_GATEWAY, err.to_string()),
            AppError::Internal(message) => {
                (StatusCode::INTERNAL_SERVER_ERROR, message.clone())
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

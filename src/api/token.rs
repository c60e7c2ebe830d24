//! Session token issuance against the avatar-hosting service.
//!
//! A browser client never sees the long-lived API key: the server side of the
//! application exchanges it for a short-lived session token scoped to one
//! avatar session (`POST /v1/sessions/token` with an `X-API-KEY` header) and
//! hands only that token to the page.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::config::ServerConfig;

/// Default base URL of the avatar-hosting service.
pub const DEFAULT_API_URL: &str = "https://api.liveavatar.com";

/// Fallback error message when the upstream response carries no usable one.
const FALLBACK_ERROR: &str = "Failed to retrieve session token";

// =============================================================================
// Error Types
// =============================================================================

/// Errors from the token issuance endpoint.
#[derive(Debug, Error)]
pub enum TokenError {
    /// The HTTP request itself failed (network, TLS, decoding)
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The upstream service rejected the request
    #[error("{message}")]
    Upstream {
        /// Upstream HTTP status code
        status: u16,
        /// Best-effort error message extracted from the upstream body
        message: String,
    },

    /// The upstream response was successful but carried no session token
    #[error("Session token missing from upstream response")]
    EmptyToken,
}

// =============================================================================
// Request / Response Types
// =============================================================================

/// Parameters for issuing a session token.
#[derive(Debug, Clone, Default)]
pub struct SessionTokenRequest {
    /// Avatar to drive in the session
    pub avatar_id: String,
    /// Voice for the avatar persona
    pub voice_id: Option<String>,
    /// Conversation context for the avatar persona
    pub context_id: Option<String>,
    /// Spoken language for the avatar persona
    pub language: Option<String>,
    /// Request a push-to-talk session instead of a conversational one
    pub push_to_talk: bool,
    /// Run the session in sandbox mode (no billing, for integration work)
    pub is_sandbox: bool,
}

/// A short-lived session token pair returned by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionToken {
    pub session_token: String,
    pub session_id: String,
}

#[derive(Debug, Serialize)]
struct AvatarPersona<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    voice_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    context_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    language: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct TokenRequestBody<'a> {
    mode: &'static str,
    avatar_id: &'a str,
    avatar_persona: AvatarPersona<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    interactivity_type: Option<&'static str>,
    is_sandbox: bool,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    data: TokenResponseData,
}

#[derive(Debug, Deserialize)]
struct TokenResponseData {
    #[serde(default)]
    session_token: String,
    #[serde(default)]
    session_id: String,
}

// =============================================================================
// Client
// =============================================================================

/// HTTP client for the session token endpoint.
#[derive(Debug, Clone)]
pub struct SessionTokenClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl SessionTokenClient {
    /// Create a client against a base URL with the given API key.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    /// Create a client from server configuration.
    pub fn from_config(config: &ServerConfig) -> Self {
        Self::new(config.avatar_api_url.clone(), config.avatar_api_key.clone())
    }

    /// Exchange the API key for a short-lived session token.
    pub async fn issue_token(
        &self,
        request: &SessionTokenRequest,
    ) -> Result<SessionToken, TokenError> {
        let url = format!(
            "{}/v1/sessions/token",
            self.base_url.trim_end_matches('/')
        );
        let body = TokenRequestBody {
            mode: "FULL",
            avatar_id: &request.avatar_id,
            avatar_persona: AvatarPersona {
                voice_id: request.voice_id.as_deref(),
                context_id: request.context_id.as_deref(),
                language: request.language.as_deref(),
            },
            interactivity_type: request.push_to_talk.then_some("PUSH_TO_TALK"),
            is_sandbox: request.is_sandbox,
        };

        debug!(avatar_id = %request.avatar_id, push_to_talk = request.push_to_talk, "requesting session token");

        let response = self
            .http
            .post(&url)
            .header("X-API-KEY", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = extract_error_message(response).await;
            return Err(TokenError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: TokenResponse = response.json().await?;
        if parsed.data.session_token.is_empty() {
            return Err(TokenError::EmptyToken);
        }

        Ok(SessionToken {
            session_token: parsed.data.session_token,
            session_id: parsed.data.session_id,
        })
    }
}

/// Pull the most specific error message out of an upstream failure response.
///
/// JSON bodies are searched for `data[0].message`, `error`, then `message`;
/// anything else falls back to the raw body text.
async fn extract_error_message(response: reqwest::Response) -> String {
    let is_json = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.contains("application/json"))
        .unwrap_or(false);

    if is_json {
        match response.json::<serde_json::Value>().await {
            Ok(value) => {
                if let Some(message) = value
                    .get("data")
                    .and_then(|data| data.get(0))
                    .and_then(|entry| entry.get("message"))
                    .and_then(|message| message.as_str())
                {
                    return message.to_string();
                }
                if let Some(message) = value.get("error").and_then(|m| m.as_str()) {
                    return message.to_string();
                }
                if let Some(message) = value.get("message").and_then(|m| m.as_str()) {
                    return message.to_string();
                }
                FALLBACK_ERROR.to_string()
            }
            Err(_) => FALLBACK_ERROR.to_string(),
        }
    } else {
        match response.text().await {
            Ok(text) if !text.is_empty() => text,
            _ => FALLBACK_ERROR.to_string(),
        }
    }
}

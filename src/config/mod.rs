//! Configuration module for the avatar token server.
//!
//! Configuration comes from environment variables, with `.env` values loaded
//! by the binary before this module reads the environment. The API key stays
//! server-side; browser clients only ever receive short-lived session tokens.

use std::env;
use std::fmt;

use thiserror::Error;

use crate::api::DEFAULT_API_URL;

/// Errors from configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required environment variable is missing
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    /// An environment variable holds an unparseable value
    #[error("Invalid value for {var}: {message}")]
    InvalidVar {
        var: &'static str,
        message: String,
    },
}

/// Server configuration
///
/// Contains everything needed to run the token server and talk to the
/// avatar-hosting service:
/// - Bind address (host, port)
/// - Avatar service API base URL and API key
/// - Avatar persona defaults (avatar, voice, context, language)
/// - Sandbox flag for integration work
/// - CORS origins for browser demos
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,

    /// Base URL of the avatar-hosting service
    pub avatar_api_url: String,
    /// Long-lived API key exchanged for session tokens; never leaves the server
    pub avatar_api_key: String,

    /// Avatar to drive in issued sessions
    pub avatar_id: String,
    /// Default persona voice
    pub voice_id: Option<String>,
    /// Default persona conversation context
    pub context_id: Option<String>,
    /// Default persona language
    pub language: Option<String>,

    /// When true, sessions run in sandbox mode (no billing)
    pub is_sandbox: bool,

    /// Comma-separated CORS origins, or "*" for any
    pub cors_allowed_origins: Option<String>,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Self {
            host: env_or("HOST", "0.0.0.0"),
            port: parse_env("PORT", 8080)?,
            avatar_api_url: env_or("AVATAR_API_URL", DEFAULT_API_URL),
            avatar_api_key: env::var("AVATAR_API_KEY")
                .map_err(|_| ConfigError::MissingVar("AVATAR_API_KEY"))?,
            avatar_id: env::var("AVATAR_ID").map_err(|_| ConfigError::MissingVar("AVATAR_ID"))?,
            voice_id: env::var("AVATAR_VOICE_ID").ok().filter(|v| !v.is_empty()),
            context_id: env::var("AVATAR_CONTEXT_ID").ok().filter(|v| !v.is_empty()),
            language: Some(env_or("AVATAR_LANGUAGE", "en")),
            is_sandbox: parse_env("AVATAR_SANDBOX", false)?,
            cors_allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                .ok()
                .filter(|v| !v.is_empty()),
        };
        config.validate()?;
        Ok(config)
    }

    /// The socket address string the server binds to.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.avatar_api_key.trim().is_empty() {
            return Err(ConfigError::MissingVar("AVATAR_API_KEY"));
        }
        if self.avatar_id.trim().is_empty() {
            return Err(ConfigError::MissingVar("AVATAR_ID"));
        }
        if !self.avatar_api_url.starts_with("http://") && !self.avatar_api_url.starts_with("https://")
        {
            return Err(ConfigError::InvalidVar {
                var: "AVATAR_API_URL",
                message: format!("expected an http(s) URL, got '{}'", self.avatar_api_url),
            });
        }
        Ok(())
    }
}

fn env_or(var: &str, default: &str) -> String {
    env::var(var)
        .ok()
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn parse_env<T>(var: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: fmt::Display,
{
    match env::var(var) {
        Ok(value) if !value.is_empty() => value.parse().map_err(|err: T::Err| {
            ConfigError::InvalidVar {
                var,
                message: err.to_string(),
            }
        }),
        _ => Ok(default),
    }
}

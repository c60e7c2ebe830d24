//! Client for the avatar-hosting service HTTP API.

mod token;

// Re-export public types
pub use token::{
    DEFAULT_API_URL, SessionToken, SessionTokenClient, SessionTokenRequest, TokenError,
};

//! HTTP request handlers
//!
//! - `api` - Health check endpoint
//! - `token` - Session token issuance for browser demos

pub mod api;
pub mod token;

// Re-export commonly used handlers for convenient access
pub use token::start_session;

//! Health check handler.

use axum::Json;
use serde_json::{Value, json};

/// Liveness probe for the token server.
pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "avatar-token-server",
    }))
}

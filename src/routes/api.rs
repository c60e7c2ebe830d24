use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::handlers::{api, token};
use crate::state::AppState;
use std::sync::Arc;

/// Create the API router for the token server.
pub fn create_api_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(api::health_check))
        .route("/v1/token", post(token::start_session))
        .layer(TraceLayer::new_for_http())
}

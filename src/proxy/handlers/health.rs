use axum::{extract::State, response::IntoResponse, Json};

use crate::proxy::server::AppState;

/// Health check handler
pub async fn health_check_handler(State(state): State<AppState>) -> impl IntoResponse {
    let token_cached = state.proxy.token_manager().has_valid_token().await;
    Json(serde_json::json!({
        "status": "ok",
        "token_cached": token_cached
    }))
}

use crate::core::state::AppState;
use crate::utils::time::current_timestamp;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use std::sync::Arc;
use tracing::error;

#[derive(Debug, Serialize, serde::Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: i64,
    pub users: Option<usize>,
}

/// Liveness greeting
///
/// GET /
pub async fn greeting_handler() -> &'static str {
    "Hello World!"
}

/// Health check handler
///
/// GET /health
pub async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let timestamp = current_timestamp();

    match state.user_store.count() {
        Ok(users) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "ok".to_string(),
                timestamp,
                users: Some(users),
            }),
        ),
        Err(e) => {
            error!(error = %e, "Health check could not query the user store");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: "unavailable".to_string(),
                    timestamp,
                    users: None,
                }),
            )
        }
    }
}

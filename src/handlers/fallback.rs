use crate::models::response::ErrorResponse;
use axum::{
    http::{StatusCode, Uri},
    response::{IntoResponse, Json, Response},
};

pub async fn fallback_handler(uri: Uri) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            success: false,
            error: "Invalid endpoint".to_string(),
            detail: format!(
                "No route for {}. Valid endpoints: /, /health, /metrics, /user, /user/{{id}}",
                uri.path()
            ),
        }),
    )
        .into_response()
}

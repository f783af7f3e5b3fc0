// Centralized error handling for the user API

use crate::models::response::ErrorResponse;
use crate::stores::user_store::StoreError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use thiserror::Error;

/// The user operation a failure belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    Read,
    Delete,
    List,
}

impl Operation {
    /// Fixed, human-readable failure message for this operation
    pub fn failure_message(self) -> &'static str {
        match self {
            Operation::Create => "User could not be added",
            Operation::Read => "Requested user could not be found",
            Operation::Delete => "Requested user could not be deleted",
            Operation::List => "Users could not be listed",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Create => "create",
            Operation::Read => "read",
            Operation::Delete => "delete",
            Operation::List => "list",
        }
    }
}

/// Errors returned by the user handlers
#[derive(Error, Debug)]
pub enum ApiError {
    /// A required field or identifier is absent or malformed
    #[error("{}: {detail}", .operation.failure_message())]
    Validation { operation: Operation, detail: String },

    #[error("{}: no user with id {id}", Operation::Read.failure_message())]
    NotFound { id: i64 },

    #[error("{}: {source}", .operation.failure_message())]
    Persistence {
        operation: Operation,
        #[source]
        source: StoreError,
    },
}

impl ApiError {
    pub fn validation(operation: Operation, detail: impl Into<String>) -> Self {
        ApiError::Validation {
            operation,
            detail: detail.into(),
        }
    }

    pub fn persistence(operation: Operation) -> impl FnOnce(StoreError) -> Self {
        move |source| ApiError::Persistence { operation, source }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation { .. } => StatusCode::BAD_REQUEST,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Persistence { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message_and_detail(&self) -> (&'static str, String) {
        match self {
            ApiError::Validation { operation, detail } => {
                (operation.failure_message(), detail.clone())
            }
            ApiError::NotFound { id } => (
                Operation::Read.failure_message(),
                format!("no user with id {id}"),
            ),
            ApiError::Persistence { operation, source } => {
                (operation.failure_message(), source.to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (message, detail) = self.message_and_detail();

        (
            self.status(),
            Json(ErrorResponse {
                success: false,
                error: message.to_string(),
                detail,
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use http_body_util::BodyExt;

    async fn error_body(error: ApiError) -> (StatusCode, ErrorResponse) {
        let response = error.into_response();
        let (parts, body) = response.into_parts();
        let bytes = Body::new(body).collect().await.unwrap().to_bytes();
        (parts.status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_validation_is_bad_request() {
        let (status, body) =
            error_body(ApiError::validation(Operation::Create, "missing field `room`")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(!body.success);
        assert_eq!(body.error, "User could not be added");
        assert_eq!(body.detail, "missing field `room`");
    }

    #[tokio::test]
    async fn test_not_found_is_404() {
        let (status, body) = error_body(ApiError::NotFound { id: 9 }).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body.error, "Requested user could not be found");
        assert_eq!(body.detail, "no user with id 9");
    }

    #[tokio::test]
    async fn test_persistence_is_500() {
        let error = ApiError::persistence(Operation::List)(StoreError::LockPoisoned);
        let (status, body) = error_body(error).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.error, "Users could not be listed");
        assert_eq!(body.detail, "Store connection lock poisoned");
    }

    #[test]
    fn test_display_includes_message_and_detail() {
        let error = ApiError::validation(Operation::Delete, "invalid id");
        assert_eq!(error.to_string(), "Requested user could not be deleted: invalid id");
    }
}

use crate::core::error::{ApiError, Operation};
use crate::core::state::AppState;
use crate::models::response::DeleteResponse;
use crate::models::user::CreateUserRequest;
use crate::stores::user_store::{StoreError, StoreResult, UserStore};
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Create a user
///
/// PUT /user  body: {"name": <int>, "room": <int>}
pub async fn create_user_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let result = create_user(&state, payload).await;
    finish(&state, Operation::Create, result)
}

/// Fetch one user by the id in the path
///
/// GET /user/{id}
pub async fn get_user_handler(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Response, ApiError> {
    let result = get_user(&state, id).await;
    finish(&state, Operation::Read, result)
}

/// Delete one user by the id in the path
///
/// DELETE /user/{id}
pub async fn delete_user_handler(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Response, ApiError> {
    let result = delete_user(&state, id).await;
    finish(&state, Operation::Delete, result)
}

/// List every user
///
/// GET /user
pub async fn list_users_handler(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    let result = list_users(&state).await;
    finish(&state, Operation::List, result)
}

/// Run one store call on the blocking pool so disk I/O never stalls a worker
async fn with_store<T, F>(state: &AppState, operation: Operation, call: F) -> Result<T, ApiError>
where
    F: FnOnce(&UserStore) -> StoreResult<T> + Send + 'static,
    T: Send + 'static,
{
    let store = Arc::clone(&state.user_store);

    tokio::task::spawn_blocking(move || call(&store))
        .await
        .map_err(StoreError::from)
        .and_then(|result| result)
        .map_err(ApiError::persistence(operation))
}

async fn create_user(
    state: &AppState,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        ApiError::validation(Operation::Create, rejection.body_text())
    })?;

    let new_user = request.into_new_user().map_err(|field| {
        ApiError::validation(Operation::Create, format!("missing required field `{field}`"))
    })?;

    let user = with_store(state, Operation::Create, move |store| store.create(new_user)).await?;

    info!(user_id = user.id, name = user.name, room = user.room, "User added");

    Ok((StatusCode::CREATED, Json(user)).into_response())
}

async fn get_user(state: &AppState, id: Result<Path<i64>, PathRejection>) -> Result<Response, ApiError> {
    let Path(id) = id.map_err(|rejection| ApiError::validation(Operation::Read, rejection.body_text()))?;

    let user = with_store(state, Operation::Read, move |store| store.find_by_id(id))
        .await?
        .ok_or(ApiError::NotFound { id })?;

    Ok((StatusCode::OK, Json(user)).into_response())
}

async fn delete_user(state: &AppState, id: Result<Path<i64>, PathRejection>) -> Result<Response, ApiError> {
    let Path(id) = id.map_err(|rejection| ApiError::validation(Operation::Delete, rejection.body_text()))?;

    let deleted = with_store(state, Operation::Delete, move |store| store.delete_by_id(id)).await?;

    info!(user_id = id, deleted = deleted, "User delete processed");

    Ok((StatusCode::OK, Json(DeleteResponse { deleted })).into_response())
}

async fn list_users(state: &AppState) -> Result<Response, ApiError> {
    let users = with_store(state, Operation::List, |store| store.find_all()).await?;

    Ok((StatusCode::OK, Json(users)).into_response())
}

/// Log the outcome and count it. A lookup with no match is a normal outcome
/// and counts as a success.
fn finish(
    state: &AppState,
    operation: Operation,
    result: Result<Response, ApiError>,
) -> Result<Response, ApiError> {
    let succeeded = match &result {
        Ok(_) | Err(ApiError::NotFound { .. }) => true,
        Err(ApiError::Validation { .. }) | Err(ApiError::Persistence { .. }) => false,
    };

    match &result {
        Err(e @ ApiError::Persistence { .. }) => {
            error!(operation = operation.as_str(), error = %e, "User operation failed");
        }
        Err(e) => {
            warn!(operation = operation.as_str(), error = %e, "User request rejected");
        }
        Ok(_) => {}
    }

    state.metrics.record(operation, succeeded);
    result
}

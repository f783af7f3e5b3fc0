// Metrics endpoint

use crate::core::state::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use std::sync::Arc;
use tracing::warn;

/// Returns JSON with per-operation request counts, the number of stored
/// users and the process uptime.
///
/// GET /metrics
pub async fn metrics_handler(State(state): State<Arc<AppState>>) -> Response {
    let stored_users = match state.user_store.count() {
        Ok(count) => Some(count),
        Err(e) => {
            warn!(error = %e, "Failed to count users for metrics");
            None
        }
    };

    let snapshot = state.metrics.get_snapshot(stored_users);

    (StatusCode::OK, Json(snapshot)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::Operation;
    use crate::metrics::collector::MetricsSnapshot;
    use crate::models::user::NewUser;
    use crate::stores::user_store::UserStore;
    use axum::body::Body;
    use http_body_util::BodyExt;

    fn create_test_state() -> Arc<AppState> {
        Arc::new(AppState::new(UserStore::open_in_memory().unwrap()))
    }

    async fn snapshot_of(response: Response) -> MetricsSnapshot {
        let bytes = Body::new(response.into_body()).collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_metrics_reports_counts() {
        let state = create_test_state();
        state.user_store.create(NewUser { name: 1, room: 1 }).unwrap();
        state.metrics.record(Operation::Create, true);

        let response = metrics_handler(State(state)).await;
        assert_eq!(response.status(), StatusCode::OK);

        let snapshot = snapshot_of(response).await;
        assert_eq!(snapshot.create.total, 1);
        assert_eq!(snapshot.stored_users, Some(1));
    }

    #[tokio::test]
    async fn test_metrics_without_store() {
        let state = create_test_state();
        state.user_store.drop_schema();

        let response = metrics_handler(State(state)).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(snapshot_of(response).await.stored_users, None);
    }
}

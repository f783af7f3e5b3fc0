// HTTP routes configuration

use crate::core::state::AppState;
use axum::{routing::get, Router};
use std::sync::Arc;

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Liveness
        .route("/", get(crate::handlers::health::greeting_handler))
        .route("/health", get(crate::handlers::health::health_handler))
        .route("/metrics", get(crate::handlers::metrics::metrics_handler))

        // User resource
        .route(
            "/user",
            get(crate::handlers::users::list_users_handler)
                .put(crate::handlers::users::create_user_handler),
        )
        .route(
            "/user/{id}",
            get(crate::handlers::users::get_user_handler)
                .delete(crate::handlers::users::delete_user_handler),
        )

        // 404 fallback for all unmatched routes
        .fallback(crate::handlers::fallback::fallback_handler)

        .with_state(state)
}

pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;
use crate::versions::handlers;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route(
            "/api/v1/resumes",
            get(handlers::handle_list).post(handlers::handle_create),
        )
        .route(
            "/api/v1/resumes/:id",
            get(handlers::handle_get)
                .patch(handlers::handle_update)
                .delete(handlers::handle_delete),
        )
        .route("/api/v1/resumes/:id/versions", get(handlers::handle_family))
        .route(
            "/api/v1/resumes/:id/duplicate",
            post(handlers::handle_duplicate),
        )
        .route(
            "/api/v1/resumes/:id/master",
            post(handlers::handle_set_master),
        )
        .route(
            "/api/v1/resumes/:id/compare/:other_id",
            get(handlers::handle_compare),
        )
        .route("/api/v1/resumes/:id/merge", post(handlers::handle_merge))
        .with_state(state)
}

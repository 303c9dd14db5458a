use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post, delete},
    middleware,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn report_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/upload", post(handlers::upload_report))
        .route("/user/{user_id}", get(handlers::get_user_reports))
        .route("/{report_id}", delete(handlers::delete_report))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}

use std::sync::Arc;

use axum::{
    Router,
    routing::get,
    middleware,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn doctor_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route(
            "/{doctor_id}/availability",
            get(handlers::get_doctor_availability).put(handlers::update_availability_window),
        )
        .route(
            "/{doctor_id}/availability/check",
            get(handlers::check_doctor_availability),
        )
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}

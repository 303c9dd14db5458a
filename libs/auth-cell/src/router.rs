use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
    middleware,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn auth_routes(state: Arc<AppConfig>) -> Router {
    // Login is the only route reachable without a token
    let public_routes = Router::new()
        .route("/login", post(handlers::login));

    let protected_routes = Router::new()
        .route("/users", post(handlers::create_user).get(handlers::list_users))
        .route("/users/search", get(handlers::search_users))
        .route("/users/{user_id}", get(handlers::get_user_info))
        .route("/reset-password", post(handlers::reset_password))
        .route("/me", get(handlers::get_current_user))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}

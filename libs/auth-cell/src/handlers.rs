use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    Form, Json,
};
use axum_extra::TypedHeader;
use headers::{Authorization, authorization::Bearer};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::{Permission, User};
use shared_models::error::AppError;
use shared_utils::permissions::require_any;

use crate::models::{AccountError, CreateUserRequest, LoginRequest, ResetPasswordRequest};
use crate::services::account::AccountService;

#[derive(Debug, Deserialize)]
pub struct UserSearchQuery {
    pub name: String,
}

fn account_error(err: AccountError) -> AppError {
    match err {
        AccountError::InvalidCredentials => AppError::Auth(err.to_string()),
        AccountError::UserNotFound | AccountError::RoleNotFound => {
            AppError::NotFound(err.to_string())
        }
        AccountError::EmptyPassword => AppError::BadRequest(err.to_string()),
        AccountError::Token(msg) => AppError::Internal(msg),
        AccountError::Hash(msg) => AppError::Internal(msg),
        AccountError::Storage(e) => AppError::Database(e.to_string()),
    }
}

#[axum::debug_handler]
pub async fn login(
    State(state): State<Arc<AppConfig>>,
    Form(form): Form<LoginRequest>,
) -> Result<Json<Value>, AppError> {
    let account_service = AccountService::new(&state);

    let response = account_service.login(&form.username, &form.password).await
        .map_err(account_error)?;

    Ok(Json(json!(response)))
}

#[axum::debug_handler]
pub async fn create_user(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(request): Json<CreateUserRequest>,
) -> Result<Json<Value>, AppError> {
    require_any(&user, &[Permission::Admin])?;

    let token = auth.token();
    let account_service = AccountService::new(&state);

    account_service.create_user(request, token).await
        .map_err(account_error)?;

    Ok(Json(json!({ "message": "User created successfully" })))
}

#[axum::debug_handler]
pub async fn reset_password(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(request): Json<ResetPasswordRequest>,
) -> Result<Json<Value>, AppError> {
    // Any role may reset passwords; a principal without one may not
    require_any(&user, &[])?;

    let token = auth.token();
    let account_service = AccountService::new(&state);

    account_service.reset_password(request.user_id, &request.password, token).await
        .map_err(account_error)?;

    Ok(Json(json!({ "message": "Password reset successful" })))
}

#[axum::debug_handler]
pub async fn get_current_user(
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    Ok(Json(json!(user)))
}

#[axum::debug_handler]
pub async fn get_user_info(
    State(state): State<Arc<AppConfig>>,
    Path(user_id): Path<Uuid>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
) -> Result<Json<Value>, AppError> {
    let token = auth.token();
    let account_service = AccountService::new(&state);

    let record = account_service.get_user(user_id, token).await
        .map_err(account_error)?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(Json(json!(record)))
}

#[axum::debug_handler]
pub async fn list_users(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    require_any(&user, &[])?;

    let token = auth.token();
    let account_service = AccountService::new(&state);

    let users = account_service.list_users(token).await
        .map_err(account_error)?;

    Ok(Json(json!(users)))
}

#[axum::debug_handler]
pub async fn search_users(
    State(state): State<Arc<AppConfig>>,
    Query(query): Query<UserSearchQuery>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    require_any(&user, &[])?;

    let token = auth.token();
    let account_service = AccountService::new(&state);

    let users = account_service.search_users(&query.name, token).await
        .map_err(account_error)?;

    Ok(Json(json!(users)))
}

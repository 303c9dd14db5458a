use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleRecord {
    pub id: Uuid,
    pub role_name: String,
    pub permissions: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub full_name: Option<String>,
    #[serde(skip_serializing)]
    pub hashed_password: Option<String>,
    #[serde(default)]
    pub disabled: bool,
    pub role_id: Option<Uuid>,
    #[serde(default)]
    pub role: Option<RoleRecord>,
}

impl UserRecord {
    pub fn permissions(&self) -> Vec<String> {
        self.role
            .as_ref()
            .map(|role| role.permissions.clone())
            .unwrap_or_default()
    }
}

/// Login form body; `username` carries the email address.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct UserSummary {
    pub id: Uuid,
    pub username: String,
    pub full_name: Option<String>,
    pub role_permissions: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub user: UserSummary,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub username: String,
    pub full_name: Option<String>,
    pub role_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub user_id: Uuid,
    pub password: String,
}

#[derive(Debug, Error)]
pub enum AccountError {
    #[error("Incorrect email or password")]
    InvalidCredentials,

    #[error("User not found")]
    UserNotFound,

    #[error("Role not found")]
    RoleNotFound,

    #[error("Password cannot be empty")]
    EmptyPassword,

    #[error("Token error: {0}")]
    Token(String),

    #[error("Password hashing error: {0}")]
    Hash(String),

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

use chrono::Duration;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::postgrest::PostgrestClient;
use shared_utils::jwt::issue_token;
use doctor_cell::services::availability::AvailabilityService;

use crate::models::{
    AccountError, CreateUserRequest, LoginResponse, RoleRecord, UserRecord, UserSummary,
};
use crate::services::password::PasswordService;

pub struct AccountService {
    db: PostgrestClient,
    availability_service: AvailabilityService,
    jwt_secret: String,
    access_token_ttl: Duration,
    refresh_token_ttl: Duration,
}

impl AccountService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            db: PostgrestClient::new(config),
            availability_service: AvailabilityService::new(config),
            jwt_secret: config.jwt_secret.clone(),
            access_token_ttl: Duration::minutes(config.access_token_expire_minutes),
            refresh_token_ttl: Duration::days(config.refresh_token_expire_days),
        }
    }

    /// Verify credentials and issue an access/refresh token pair. The role's
    /// permission set is embedded in the claims so later requests never have
    /// to resolve it again.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, AccountError> {
        let user = self
            .authenticate(email, password)
            .await?
            .ok_or(AccountError::InvalidCredentials)?;

        let permissions = user.permissions();
        let user_id = user.id.to_string();

        let access_token = issue_token(
            &user_id,
            Some(&user.email),
            user.full_name.as_deref(),
            &permissions,
            &self.jwt_secret,
            self.access_token_ttl,
        ).map_err(AccountError::Token)?;

        let refresh_token = issue_token(
            &user_id,
            Some(&user.email),
            user.full_name.as_deref(),
            &permissions,
            &self.jwt_secret,
            self.refresh_token_ttl,
        ).map_err(AccountError::Token)?;

        debug!("Issued tokens for user: {}", user.id);

        Ok(LoginResponse {
            access_token,
            refresh_token,
            token_type: "bearer".to_string(),
            user: UserSummary {
                id: user.id,
                username: user.username,
                full_name: user.full_name,
                role_permissions: permissions,
            },
        })
    }

    /// Provision a user. When the assigned role carries the `doctor`
    /// permission, the default weekly availability is created in the same
    /// operation; availability records never come into existence lazily.
    pub async fn create_user(
        &self,
        request: CreateUserRequest,
        auth_token: &str,
    ) -> Result<UserRecord, AccountError> {
        let role = match request.role_id {
            Some(role_id) => Some(self.get_role(role_id, auth_token).await?),
            None => None,
        };

        let user_data = json!({
            "email": request.email,
            "username": request.username,
            "full_name": request.full_name,
            "role_id": request.role_id,
        });

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert("Prefer", reqwest::header::HeaderValue::from_static("return=representation"));

        let result: Vec<Value> = self.db.request_with_headers(
            Method::POST,
            "/rest/v1/users",
            Some(auth_token),
            Some(user_data),
            Some(headers),
        ).await?;

        let row = result
            .into_iter()
            .next()
            .ok_or_else(|| anyhow::anyhow!("Failed to create user"))?;
        let mut user: UserRecord = serde_json::from_value(row).map_err(anyhow::Error::new)?;

        if let Some(role) = role {
            let is_doctor = role.permissions.iter().any(|p| p == "doctor");
            user.role = Some(role);

            if is_doctor {
                self.availability_service
                    .create_default_availability(user.id, auth_token)
                    .await
                    .map_err(|e| AccountError::Storage(e.into()))?;
            }
        }

        Ok(user)
    }

    pub async fn reset_password(
        &self,
        user_id: Uuid,
        password: &str,
        auth_token: &str,
    ) -> Result<(), AccountError> {
        if password.trim().is_empty() {
            return Err(AccountError::EmptyPassword);
        }

        if self.get_user(user_id, auth_token).await?.is_none() {
            return Err(AccountError::UserNotFound);
        }

        let hashed = PasswordService::hash_password(password)
            .map_err(|e| AccountError::Hash(e.to_string()))?;

        let path = format!("/rest/v1/users?id=eq.{}", user_id);
        let _: Vec<Value> = self.db.request(
            Method::PATCH,
            &path,
            Some(auth_token),
            Some(json!({ "hashed_password": hashed })),
        ).await?;

        Ok(())
    }

    pub async fn get_user(
        &self,
        user_id: Uuid,
        auth_token: &str,
    ) -> Result<Option<UserRecord>, AccountError> {
        let path = format!("/rest/v1/users?id=eq.{}&select=*,role:roles(*)", user_id);
        self.fetch_one(&path, Some(auth_token)).await
    }

    pub async fn list_users(&self, auth_token: &str) -> Result<Vec<UserRecord>, AccountError> {
        let path = "/rest/v1/users?select=*,role:roles(*)&order=full_name.asc";
        self.fetch_many(path, Some(auth_token)).await
    }

    /// Case-insensitive substring search on full name.
    pub async fn search_users(
        &self,
        name: &str,
        auth_token: &str,
    ) -> Result<Vec<UserRecord>, AccountError> {
        let path = format!(
            "/rest/v1/users?full_name=ilike.*{}*&select=*,role:roles(*)",
            urlencoding::encode(name),
        );
        self.fetch_many(&path, Some(auth_token)).await
    }

    async fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<UserRecord>, AccountError> {
        let path = format!(
            "/rest/v1/users?email=eq.{}&select=*,role:roles(*)",
            urlencoding::encode(email),
        );
        let user = match self.fetch_one(&path, None).await? {
            Some(user) => user,
            None => return Ok(None),
        };

        let hash = match user.hashed_password.as_deref() {
            Some(hash) => hash,
            None => return Ok(None),
        };

        let verified = PasswordService::verify_password(password, hash)
            .map_err(|e| AccountError::Hash(e.to_string()))?;

        Ok(verified.then_some(user))
    }

    async fn get_role(&self, role_id: Uuid, auth_token: &str) -> Result<RoleRecord, AccountError> {
        let path = format!("/rest/v1/roles?id=eq.{}", role_id);
        let result: Vec<Value> = self.db.request(
            Method::GET,
            &path,
            Some(auth_token),
            None,
        ).await?;

        let row = result.into_iter().next().ok_or(AccountError::RoleNotFound)?;
        let role: RoleRecord = serde_json::from_value(row).map_err(anyhow::Error::new)?;
        Ok(role)
    }

    async fn fetch_one(
        &self,
        path: &str,
        auth_token: Option<&str>,
    ) -> Result<Option<UserRecord>, AccountError> {
        let result: Vec<Value> = self.db.request(
            Method::GET,
            path,
            auth_token,
            None,
        ).await?;

        match result.into_iter().next() {
            Some(row) => {
                let user: UserRecord = serde_json::from_value(row).map_err(anyhow::Error::new)?;
                Ok(Some(user))
            }
            None => Ok(None),
        }
    }

    async fn fetch_many(
        &self,
        path: &str,
        auth_token: Option<&str>,
    ) -> Result<Vec<UserRecord>, AccountError> {
        let result: Vec<Value> = self.db.request(
            Method::GET,
            path,
            auth_token,
            None,
        ).await?;

        let users: Vec<UserRecord> = result.into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<UserRecord>, _>>()
            .map_err(anyhow::Error::new)?;

        Ok(users)
    }
}

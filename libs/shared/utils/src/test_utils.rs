use std::sync::Arc;
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use base64::{Engine as _, engine::general_purpose};
use serde_json::json;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::User;

pub struct TestConfig {
    pub jwt_secret: String,
    pub database_url: String,
    pub database_service_key: String,
    pub reports_dir: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "test-secret-key-for-jwt-validation-must-be-long-enough".to_string(),
            database_url: "http://localhost:54321".to_string(),
            database_service_key: "test-service-key".to_string(),
            reports_dir: "./uploads/reports".to_string(),
        }
    }
}

impl TestConfig {
    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            database_url: self.database_url.clone(),
            database_service_key: self.database_service_key.clone(),
            jwt_secret: self.jwt_secret.clone(),
            access_token_expire_minutes: 30,
            refresh_token_expire_days: 7,
            reports_dir: self.reports_dir.clone(),
        }
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }
}

pub struct TestUser {
    pub id: String,
    pub email: String,
    pub permissions: Vec<String>,
}

impl Default for TestUser {
    fn default() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email: "test@example.com".to_string(),
            permissions: vec!["patient".to_string()],
        }
    }
}

impl TestUser {
    pub fn new(email: &str, permissions: &[&str]) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            permissions: permissions.iter().map(|p| p.to_string()).collect(),
        }
    }

    pub fn doctor(email: &str) -> Self {
        Self::new(email, &["doctor"])
    }

    pub fn patient(email: &str) -> Self {
        Self::new(email, &["patient"])
    }

    pub fn admin(email: &str) -> Self {
        Self::new(email, &["admin"])
    }

    pub fn to_user(&self) -> User {
        User {
            id: self.id.clone(),
            email: Some(self.email.clone()),
            full_name: None,
            permissions: self.permissions.clone(),
            created_at: Some(Utc::now()),
        }
    }
}

pub struct JwtTestUtils;

impl JwtTestUtils {
    pub fn create_test_token(user: &TestUser, secret: &str, exp_hours: Option<i64>) -> String {
        let now = Utc::now();
        let exp = now + Duration::hours(exp_hours.unwrap_or(24));

        let header = json!({
            "alg": "HS256",
            "typ": "JWT"
        });

        let payload = json!({
            "sub": user.id,
            "email": user.email,
            "permissions": user.permissions,
            "iat": now.timestamp(),
            "exp": exp.timestamp()
        });

        let header_encoded = general_purpose::URL_SAFE_NO_PAD.encode(header.to_string());
        let payload_encoded = general_purpose::URL_SAFE_NO_PAD.encode(payload.to_string());

        let signing_input = format!("{}.{}", header_encoded, payload_encoded);

        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(signing_input.as_bytes());
        let signature = mac.finalize().into_bytes();
        let signature_encoded = general_purpose::URL_SAFE_NO_PAD.encode(signature);

        format!("{}.{}", signing_input, signature_encoded)
    }

    pub fn create_expired_token(user: &TestUser, secret: &str) -> String {
        Self::create_test_token(user, secret, Some(-1))
    }

    pub fn create_invalid_signature_token(user: &TestUser) -> String {
        Self::create_test_token(user, "wrong-secret", Some(24))
    }

    pub fn create_malformed_token() -> String {
        "invalid.token.format".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jwt::{issue_token, validate_token};

    #[test]
    fn test_config_creation() {
        let config = TestConfig::default();
        let app_config = config.to_app_config();

        assert_eq!(app_config.database_url, "http://localhost:54321");
        assert_eq!(app_config.database_service_key, "test-service-key");
        assert!(!app_config.jwt_secret.is_empty());
    }

    #[test]
    fn test_jwt_round_trip() {
        let user = TestUser::admin("admin@example.com");
        let secret = "test-secret";
        let token = JwtTestUtils::create_test_token(&user, secret, Some(1));

        let validated = validate_token(&token, secret).expect("token should validate");
        assert_eq!(validated.id, user.id);
        assert_eq!(validated.email, Some(user.email.clone()));
        assert_eq!(validated.permissions, vec!["admin".to_string()]);
    }

    #[test]
    fn test_issued_token_round_trip() {
        let permissions = vec!["doctor".to_string()];
        let token = issue_token(
            "user-42",
            Some("doc@example.com"),
            Some("Dr. Example"),
            &permissions,
            "another-secret",
            Duration::minutes(30),
        ).expect("token should be issued");

        let validated = validate_token(&token, "another-secret").expect("token should validate");
        assert_eq!(validated.id, "user-42");
        assert_eq!(validated.full_name, Some("Dr. Example".to_string()));
        assert_eq!(validated.permissions, permissions);
    }

    #[test]
    fn test_expired_token_rejected() {
        let user = TestUser::default();
        let token = JwtTestUtils::create_expired_token(&user, "test-secret");
        assert!(validate_token(&token, "test-secret").is_err());
    }

    #[test]
    fn test_tampered_signature_rejected() {
        let user = TestUser::default();
        let token = JwtTestUtils::create_invalid_signature_token(&user);
        assert!(validate_token(&token, "test-secret").is_err());
    }
}

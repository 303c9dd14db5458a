use assert_matches::assert_matches;
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use auth_cell::models::{AccountError, CreateUserRequest};
use auth_cell::services::account::AccountService;
use auth_cell::services::password::PasswordService;
use shared_config::AppConfig;
use shared_utils::jwt::validate_token;

const JWT_SECRET: &str = "test-secret-key-for-jwt-validation-must-be-long-enough";

fn test_config(base_url: &str) -> AppConfig {
    AppConfig {
        database_url: base_url.to_string(),
        database_service_key: "test-service-key".to_string(),
        jwt_secret: JWT_SECRET.to_string(),
        access_token_expire_minutes: 30,
        refresh_token_expire_days: 7,
        reports_dir: "./uploads/reports".to_string(),
    }
}

fn user_row(user_id: Uuid, email: &str, password: &str, permissions: &[&str]) -> serde_json::Value {
    json!({
        "id": user_id,
        "username": "jdoe",
        "email": email,
        "full_name": "Jane Doe",
        "hashed_password": PasswordService::hash_password(password).unwrap(),
        "disabled": false,
        "role_id": Uuid::new_v4(),
        "role": {
            "id": Uuid::new_v4(),
            "role_name": "staff",
            "permissions": permissions,
        },
    })
}

#[test]
fn password_hash_round_trip() {
    let hash = PasswordService::hash_password("s3cret-enough").unwrap();
    assert!(PasswordService::verify_password("s3cret-enough", &hash).unwrap());
    assert!(!PasswordService::verify_password("wrong", &hash).unwrap());
}

#[tokio::test]
async fn login_issues_tokens_with_permission_claims() {
    let mock_server = MockServer::start().await;
    let user_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            user_row(user_id, "jdoe@example.com", "pass-1234", &["doctor"])
        ])))
        .mount(&mock_server)
        .await;

    let service = AccountService::new(&test_config(&mock_server.uri()));

    let response = service.login("jdoe@example.com", "pass-1234").await
        .expect("login should succeed");

    assert_eq!(response.token_type, "bearer");
    assert_eq!(response.user.id, user_id);
    assert_eq!(response.user.role_permissions, vec!["doctor".to_string()]);

    let principal = validate_token(&response.access_token, JWT_SECRET)
        .expect("issued token should validate");
    assert_eq!(principal.id, user_id.to_string());
    assert_eq!(principal.permissions, vec!["doctor".to_string()]);

    // The refresh token resolves to the same principal
    let refreshed = validate_token(&response.refresh_token, JWT_SECRET).unwrap();
    assert_eq!(refreshed.id, principal.id);
}

#[tokio::test]
async fn login_rejects_wrong_password() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            user_row(Uuid::new_v4(), "jdoe@example.com", "pass-1234", &["patient"])
        ])))
        .mount(&mock_server)
        .await;

    let service = AccountService::new(&test_config(&mock_server.uri()));

    let result = service.login("jdoe@example.com", "not-the-password").await;
    assert_matches!(result, Err(AccountError::InvalidCredentials));
}

#[tokio::test]
async fn login_rejects_unknown_email() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let service = AccountService::new(&test_config(&mock_server.uri()));

    let result = service.login("nobody@example.com", "whatever").await;
    assert_matches!(result, Err(AccountError::InvalidCredentials));
}

fn create_request(role_id: Uuid) -> CreateUserRequest {
    CreateUserRequest {
        email: "new@example.com".to_string(),
        username: "newuser".to_string(),
        full_name: Some("New User".to_string()),
        role_id: Some(role_id),
    }
}

async fn mount_provisioning(mock_server: &MockServer, role_id: Uuid, permissions: &[&str]) {
    Mock::given(method("GET"))
        .and(path("/rest/v1/roles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": role_id,
            "role_name": "role",
            "permissions": permissions,
        }])))
        .mount(mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/users"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([{
            "id": Uuid::new_v4(),
            "username": "newuser",
            "email": "new@example.com",
            "full_name": "New User",
            "hashed_password": null,
            "disabled": false,
            "role_id": role_id,
        }])))
        .mount(mock_server)
        .await;
}

#[tokio::test]
async fn provisioning_a_doctor_creates_the_default_week() {
    let mock_server = MockServer::start().await;
    let role_id = Uuid::new_v4();

    mount_provisioning(&mock_server, role_id, &["doctor"]).await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/doctor_availability"))
        .respond_with(move |req: &wiremock::Request| {
            let body: serde_json::Value = req.body_json().unwrap();
            ResponseTemplate::new(201).set_body_json(json!([{
                "id": Uuid::new_v4(),
                "doctor_id": body["doctor_id"],
                "availability": body["availability"],
            }]))
        })
        .expect(1)
        .mount(&mock_server)
        .await;

    let service = AccountService::new(&test_config(&mock_server.uri()));

    let user = service.create_user(create_request(role_id), "token").await
        .expect("provisioning should succeed");
    assert_eq!(user.email, "new@example.com");
}

#[tokio::test]
async fn provisioning_a_patient_creates_no_availability() {
    let mock_server = MockServer::start().await;
    let role_id = Uuid::new_v4();

    mount_provisioning(&mock_server, role_id, &["patient"]).await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/doctor_availability"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([])))
        .expect(0)
        .mount(&mock_server)
        .await;

    let service = AccountService::new(&test_config(&mock_server.uri()));

    service.create_user(create_request(role_id), "token").await
        .expect("provisioning should succeed");
}

#[tokio::test]
async fn reset_password_rejects_blank_passwords() {
    let mock_server = MockServer::start().await;
    let service = AccountService::new(&test_config(&mock_server.uri()));

    let result = service.reset_password(Uuid::new_v4(), "   ", "token").await;
    assert_matches!(result, Err(AccountError::EmptyPassword));
}

pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use models::{AccountError, LoginRequest, LoginResponse, RoleRecord, UserRecord};
pub use services::account::AccountService;
pub use services::password::PasswordService;

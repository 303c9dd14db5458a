use shared_models::auth::{Permission, User};
use shared_models::error::AppError;

/// Authorization check against a resolved principal and an explicit required
/// permission set. The caller passes the permissions an endpoint demands; the
/// principal passes when it holds at least one of them.
pub fn require_any(user: &User, required: &[Permission]) -> Result<(), AppError> {
    if user.permissions.is_empty() {
        return Err(AppError::Forbidden(
            "You do not have the required permissions.".to_string(),
        ));
    }

    if !required.is_empty() && !required.iter().any(|p| user.has_permission(*p)) {
        return Err(AppError::Forbidden(
            "You do not have the required permissions to access this resource.".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_with(permissions: &[&str]) -> User {
        User {
            id: "user-1".to_string(),
            email: Some("user@example.com".to_string()),
            full_name: None,
            permissions: permissions.iter().map(|p| p.to_string()).collect(),
            created_at: None,
        }
    }

    #[test]
    fn admin_passes_admin_check() {
        let user = user_with(&["admin"]);
        assert!(require_any(&user, &[Permission::Admin]).is_ok());
    }

    #[test]
    fn patient_fails_admin_check() {
        let user = user_with(&["patient"]);
        assert!(require_any(&user, &[Permission::Admin]).is_err());
    }

    #[test]
    fn any_of_several_required_permissions_suffices() {
        let user = user_with(&["doctor"]);
        assert!(require_any(&user, &[Permission::Admin, Permission::Doctor]).is_ok());
    }

    #[test]
    fn user_without_any_role_is_rejected_even_with_empty_requirement() {
        let user = user_with(&[]);
        assert!(require_any(&user, &[]).is_err());
    }

    #[test]
    fn empty_requirement_only_demands_some_role() {
        let user = user_with(&["patient"]);
        assert!(require_any(&user, &[]).is_ok());
    }
}

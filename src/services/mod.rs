pub mod application_service;
pub mod job_service;
pub mod notification_service;
pub mod opleiding_service;
pub mod user_service;
pub mod verification_service;

use crate::error::{Error, Result};
use crate::models::user::{Role, User};

/// The single posting-creation gate shared by jobs and opleidingen. Checked
/// against the freshly loaded user row, not the token claims: verification
/// may have been granted or revoked after the token was issued.
pub(crate) fn ensure_can_post(user: &User) -> Result<()> {
    match user.role {
        Role::Admin => Ok(()),
        Role::Ambassador if user.is_verified => Ok(()),
        Role::Ambassador => Err(Error::Forbidden(
            "ambassador account is not verified".to_string(),
        )),
        Role::Business if user.is_business_verified => Ok(()),
        Role::Business => Err(Error::Forbidden(
            "business account is not verified".to_string(),
        )),
        Role::Student | Role::Expert => Err(Error::Forbidden(
            "this role may not create postings".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn user(role: Role, is_verified: bool, is_business_verified: bool) -> User {
        User {
            id: Uuid::new_v4(),
            name: "Test".into(),
            email: "test@example.com".into(),
            password_hash: String::new(),
            role,
            is_verified,
            is_business_verified,
            verification_code: None,
            verification_code_expires: None,
            skills: None,
            cv_url: None,
            company_name: None,
            company_website: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn verification_gates_posting_creation() {
        assert!(ensure_can_post(&user(Role::Admin, false, false)).is_ok());
        assert!(ensure_can_post(&user(Role::Ambassador, true, false)).is_ok());
        assert!(ensure_can_post(&user(Role::Ambassador, false, false)).is_err());
        assert!(ensure_can_post(&user(Role::Business, false, true)).is_ok());
        assert!(ensure_can_post(&user(Role::Business, false, false)).is_err());
        assert!(ensure_can_post(&user(Role::Student, true, true)).is_err());
        assert!(ensure_can_post(&user(Role::Expert, true, true)).is_err());
    }
}

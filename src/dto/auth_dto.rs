use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::user::{Role, User};

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct SignupPayload {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8))]
    pub password: String,
    pub role: Role,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignupResponse {
    pub user_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct LoginPayload {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct VerifyOtpPayload {
    #[validate(email)]
    pub email: String,
    #[validate(length(equal = 6))]
    pub code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct UpdateProfilePayload {
    pub skills: Option<String>,
    #[validate(url)]
    pub cv_url: Option<String>,
    pub company_name: Option<String>,
    #[validate(url)]
    pub company_website: Option<String>,
}

/// User shape returned to clients. Password hash and pending verification
/// code never leave the service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub is_verified: bool,
    pub is_business_verified: bool,
    pub skills: Option<String>,
    pub cv_url: Option<String>,
    pub company_name: Option<String>,
    pub company_website: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserResponse,
}

impl From<User> for UserResponse {
    fn from(value: User) -> Self {
        Self {
            id: value.id,
            name: value.name,
            email: value.email,
            role: value.role,
            is_verified: value.is_verified,
            is_business_verified: value.is_business_verified,
            skills: value.skills,
            cv_url: value.cv_url,
            company_name: value.company_name,
            company_website: value.company_website,
            created_at: value.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signup_payload_rejects_bad_input() {
        let bad_email = SignupPayload {
            name: "A".into(),
            email: "not-an-email".into(),
            password: "longenough".into(),
            role: Role::Student,
        };
        assert!(bad_email.validate().is_err());

        let short_password = SignupPayload {
            name: "A".into(),
            email: "a@example.com".into(),
            password: "short".into(),
            role: Role::Student,
        };
        assert!(short_password.validate().is_err());

        let ok = SignupPayload {
            name: "A".into(),
            email: "a@example.com".into(),
            password: "longenough".into(),
            role: Role::Student,
        };
        assert!(ok.validate().is_ok());
    }
}

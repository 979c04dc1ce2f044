use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Student,
    Expert,
    Ambassador,
    Business,
    Admin,
}

impl Role {
    /// Roles a user may pick at signup. ADMIN and BUSINESS accounts are
    /// provisioned out of band.
    pub fn is_signup_role(self) -> bool {
        matches!(self, Role::Student | Role::Expert | Role::Ambassador)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Role::Student => "STUDENT",
            Role::Expert => "EXPERT",
            Role::Ambassador => "AMBASSADOR",
            Role::Business => "BUSINESS",
            Role::Admin => "ADMIN",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub is_verified: bool,
    pub is_business_verified: bool,
    pub verification_code: Option<String>,
    pub verification_code_expires: Option<DateTime<Utc>>,
    pub skills: Option<String>,
    pub cv_url: Option<String>,
    pub company_name: Option<String>,
    pub company_website: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

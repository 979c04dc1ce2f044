use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::auth_dto::{SignupPayload, UpdateProfilePayload};
use crate::error::{Error, Result};
use crate::models::user::{Role, User};
use crate::services::notification_service::{self, NotificationService};
use crate::utils::crypto;

#[derive(Clone)]
pub struct UserService {
    pool: PgPool,
    notifications: NotificationService,
}

impl UserService {
    pub fn new(pool: PgPool, notifications: NotificationService) -> Self {
        Self {
            pool,
            notifications,
        }
    }

    pub async fn register(&self, payload: SignupPayload) -> Result<User> {
        if !payload.role.is_signup_role() {
            return Err(Error::BadRequest(
                "role must be one of STUDENT, EXPERT, AMBASSADOR".to_string(),
            ));
        }

        // Fast path; the unique constraint on email is the real guard.
        let existing = sqlx::query_scalar::<_, Uuid>("SELECT id FROM users WHERE email = $1")
            .bind(&payload.email)
            .fetch_optional(&self.pool)
            .await?;
        if existing.is_some() {
            return Err(Error::BadRequest(
                "an account with this email already exists".to_string(),
            ));
        }

        let password_hash = crypto::hash_password(&payload.password)
            .map_err(|e| Error::Internal(format!("password hashing failed: {}", e)))?;

        let inserted = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, password_hash, role)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(&payload.name)
        .bind(&payload.email)
        .bind(&password_hash)
        .bind(payload.role)
        .fetch_one(&self.pool)
        .await;

        let user = match inserted {
            Ok(user) => user,
            Err(err) => {
                let err = Error::from(err);
                if err.is_unique_violation() {
                    return Err(Error::BadRequest(
                        "an account with this email already exists".to_string(),
                    ));
                }
                return Err(err);
            }
        };

        let (subject, body) = notification_service::welcome_email(&user.name);
        if let Err(e) = self.notifications.enqueue(&user.email, &subject, &body).await {
            tracing::error!(user_id = %user.id, error = %e, "failed to enqueue welcome email");
        }

        Ok(user)
    }

    pub async fn authenticate(&self, email: &str, password: &str) -> Result<User> {
        let user = self
            .get_by_email(email)
            .await?
            .ok_or_else(|| Error::Unauthorized("invalid credentials".to_string()))?;

        let ok = crypto::verify_password(password, &user.password_hash)
            .map_err(|e| Error::Internal(format!("password verification failed: {}", e)))?;
        if !ok {
            return Err(Error::Unauthorized("invalid credentials".to_string()));
        }
        Ok(user)
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn update_profile(&self, id: Uuid, payload: UpdateProfilePayload) -> Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET
                skills = COALESCE($2, skills),
                cv_url = COALESCE($3, cv_url),
                company_name = COALESCE($4, company_name),
                company_website = COALESCE($5, company_website),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(payload.skills)
        .bind(payload.cv_url)
        .bind(payload.company_name)
        .bind(payload.company_website)
        .fetch_one(&self.pool)
        .await?;
        Ok(user)
    }

    /// STUDENT → AMBASSADOR transition. The account starts unverified; an
    /// admin issues the OTP from the moderation dashboard.
    pub async fn apply_ambassador(&self, user_id: Uuid) -> Result<User> {
        let user = self
            .get_by_id(user_id)
            .await?
            .ok_or_else(|| Error::Unauthorized("account no longer exists".to_string()))?;
        if user.role != Role::Student {
            return Err(Error::BadRequest(
                "only students may apply to become an ambassador".to_string(),
            ));
        }

        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET role = 'AMBASSADOR', updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        let admin_email = &crate::config::get_config().admin_email;
        let (subject, body) =
            notification_service::ambassador_application_email(&user.name, &user.email);
        if let Err(e) = self.notifications.enqueue(admin_email, &subject, &body).await {
            tracing::error!(user_id = %user.id, error = %e, "failed to enqueue ambassador application notification");
        }

        Ok(user)
    }

    pub async fn list(&self, role: Option<Role>) -> Result<Vec<User>> {
        let users = match role {
            Some(role) => {
                sqlx::query_as::<_, User>(
                    "SELECT * FROM users WHERE role = $1 ORDER BY created_at DESC",
                )
                .bind(role)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY created_at DESC")
                    .fetch_all(&self.pool)
                    .await?
            }
        };
        Ok(users)
    }
}

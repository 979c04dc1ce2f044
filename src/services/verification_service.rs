use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;
use subtle::ConstantTimeEq;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::user::{Role, User};
use crate::services::notification_service::{self, NotificationService};
use crate::utils::otp;

const CODE_TTL_HOURS: i64 = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CodeCheck {
    NoPending,
    Mismatch,
    Expired,
}

/// Exact-match, single-use, time-limited code check. Comparison is
/// constant-time and unnormalized: whitespace or leading-zero differences are
/// a mismatch.
fn validate_code(
    stored: Option<&str>,
    expires: Option<DateTime<Utc>>,
    submitted: &str,
    now: DateTime<Utc>,
) -> std::result::Result<(), CodeCheck> {
    let (stored, expires) = match (stored, expires) {
        (Some(code), Some(expires)) => (code, expires),
        _ => return Err(CodeCheck::NoPending),
    };
    if !bool::from(stored.as_bytes().ct_eq(submitted.as_bytes())) {
        return Err(CodeCheck::Mismatch);
    }
    if now >= expires {
        return Err(CodeCheck::Expired);
    }
    Ok(())
}

/// Ambassador OTP workflow (UNVERIFIED → CODE_ISSUED → VERIFIED, or DECLINED)
/// and the business approval flag.
#[derive(Clone)]
pub struct VerificationService {
    pool: PgPool,
    notifications: NotificationService,
}

impl VerificationService {
    pub fn new(pool: PgPool, notifications: NotificationService) -> Self {
        Self {
            pool,
            notifications,
        }
    }

    async fn load_user(&self, id: Uuid) -> Result<User> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound("User not found".to_string()))
    }

    /// Admin "verify" action: issue (or re-issue, overwriting) a 6-digit code
    /// valid for 24 hours and email it to the ambassador.
    pub async fn issue_ambassador_code(&self, user_id: Uuid) -> Result<User> {
        let user = self.load_user(user_id).await?;
        if user.role != Role::Ambassador {
            return Err(Error::BadRequest("user is not an ambassador".to_string()));
        }

        let code = otp::generate_code();
        let expires = Utc::now() + Duration::hours(CODE_TTL_HOURS);

        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET verification_code = $2, verification_code_expires = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(&code)
        .bind(expires)
        .fetch_one(&self.pool)
        .await?;

        let (subject, body) = notification_service::ambassador_code_email(&user.name, &code);
        if let Err(e) = self.notifications.enqueue(&user.email, &subject, &body).await {
            tracing::error!(user_id = %user.id, error = %e, "failed to enqueue verification code email");
        }

        Ok(user)
    }

    /// Admin "decline" action: revert the ambassador to a student account.
    /// Declining an already-verified ambassador is rejected; the transition is
    /// only meaningful before verification completes.
    pub async fn decline_ambassador(&self, user_id: Uuid) -> Result<User> {
        let user = self.load_user(user_id).await?;
        if user.role != Role::Ambassador {
            return Err(Error::BadRequest("user is not an ambassador".to_string()));
        }
        if user.is_verified {
            return Err(Error::BadRequest(
                "ambassador is already verified".to_string(),
            ));
        }

        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET role = 'STUDENT', verification_code = NULL, verification_code_expires = NULL,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        let (subject, body) = notification_service::ambassador_declined_email(&user.name);
        if let Err(e) = self.notifications.enqueue(&user.email, &subject, &body).await {
            tracing::error!(user_id = %user.id, error = %e, "failed to enqueue decline email");
        }

        Ok(user)
    }

    /// User-submitted OTP confirmation. On success the code is cleared so it
    /// cannot be replayed; on failure nothing changes and the client may
    /// resubmit.
    pub async fn confirm_code(&self, email: &str, code: &str) -> Result<User> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound("User not found".to_string()))?;

        validate_code(
            user.verification_code.as_deref(),
            user.verification_code_expires,
            code,
            Utc::now(),
        )
        .map_err(|check| {
            Error::BadRequest(
                match check {
                    CodeCheck::NoPending => "no pending verification code",
                    CodeCheck::Mismatch => "incorrect verification code",
                    CodeCheck::Expired => "verification code expired",
                }
                .to_string(),
            )
        })?;

        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET is_verified = TRUE, verification_code = NULL, verification_code_expires = NULL,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(user.id)
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    /// Admin toggle for business approval. Approval sends an email; revoking
    /// does not, and only blocks future posting creation.
    pub async fn set_business_verified(&self, user_id: Uuid, verified: bool) -> Result<User> {
        let user = self.load_user(user_id).await?;
        if user.role != Role::Business {
            return Err(Error::BadRequest(
                "user is not a business account".to_string(),
            ));
        }

        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET is_business_verified = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(verified)
        .fetch_one(&self.pool)
        .await?;

        if verified {
            let (subject, body) = notification_service::business_approved_email(&user.name);
            if let Err(e) = self.notifications.enqueue(&user.email, &subject, &body).await {
                tracing::error!(user_id = %user.id, error = %e, "failed to enqueue approval email");
            }
        }

        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hour() -> Duration {
        Duration::hours(1)
    }

    #[test]
    fn code_without_pending_state_is_rejected() {
        let now = Utc::now();
        assert_eq!(
            validate_code(None, None, "123456", now),
            Err(CodeCheck::NoPending)
        );
    }

    #[test]
    fn wrong_code_is_rejected() {
        let now = Utc::now();
        assert_eq!(
            validate_code(Some("123456"), Some(now + hour()), "654321", now),
            Err(CodeCheck::Mismatch)
        );
        // exact string equality, no normalization
        assert_eq!(
            validate_code(Some("012345"), Some(now + hour()), "12345", now),
            Err(CodeCheck::Mismatch)
        );
    }

    #[test]
    fn expired_code_is_rejected() {
        let now = Utc::now();
        assert_eq!(
            validate_code(Some("123456"), Some(now - hour()), "123456", now),
            Err(CodeCheck::Expired)
        );
        // boundary: expiry instant itself is too late
        assert_eq!(
            validate_code(Some("123456"), Some(now), "123456", now),
            Err(CodeCheck::Expired)
        );
    }

    #[test]
    fn matching_unexpired_code_is_accepted() {
        let now = Utc::now();
        assert_eq!(
            validate_code(Some("123456"), Some(now + hour()), "123456", now),
            Ok(())
        );
    }
}

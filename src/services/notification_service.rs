use chrono::{Duration, Utc};
use reqwest::Client;
use serde_json::json;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::error::Result;
use crate::models::application::ApplicationStatus;
use crate::models::email_outbox::EmailOutbox;

/// Transactional email, decoupled from the mutations that cause it. Callers
/// enqueue a row in `email_outbox`; a background worker delivers pending rows
/// against the mail API and retries failures with capped backoff. Enqueue
/// failures are logged and swallowed at the call sites so they never mask the
/// success of the primary write.
#[derive(Clone)]
pub struct NotificationService {
    pool: PgPool,
    client: Client,
    api_url: String,
    api_key: String,
    from: String,
}

impl NotificationService {
    pub fn new(pool: PgPool, api_url: String, api_key: String, from: String) -> Self {
        Self {
            pool,
            client: Client::new(),
            api_url,
            api_key,
            from,
        }
    }

    pub async fn enqueue(&self, recipient: &str, subject: &str, body: &str) -> Result<EmailOutbox> {
        let mail = sqlx::query_as::<_, EmailOutbox>(
            r#"
            INSERT INTO email_outbox (recipient, subject, body, status)
            VALUES ($1, $2, $3, 'pending')
            RETURNING *
            "#,
        )
        .bind(recipient)
        .bind(subject)
        .bind(body)
        .fetch_one(&self.pool)
        .await?;
        Ok(mail)
    }

    async fn deliver(&self, mail: &EmailOutbox) -> std::result::Result<(), String> {
        let res = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&json!({
                "from": self.from,
                "to": [mail.recipient],
                "subject": mail.subject,
                "text": mail.body,
            }))
            .send()
            .await
            .map_err(|e| e.to_string())?;

        if res.status().is_success() {
            Ok(())
        } else {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            Err(format!("mail API returned {}: {}", status, body))
        }
    }

    /// Claim and deliver one pending email. Returns `Ok(false)` when the
    /// outbox is drained so the worker can sleep.
    pub async fn run_once(&self) -> Result<bool> {
        let row_opt = sqlx::query(
            r#"SELECT id FROM email_outbox
               WHERE status = 'pending' AND (next_retry_at IS NULL OR next_retry_at <= NOW())
               ORDER BY created_at ASC
               FOR UPDATE SKIP LOCKED
               LIMIT 1"#,
        )
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row_opt else { return Ok(false) };
        let id: Uuid = row.try_get("id")?;

        let mail = sqlx::query_as::<_, EmailOutbox>("SELECT * FROM email_outbox WHERE id = $1")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        match self.deliver(&mail).await {
            Ok(()) => {
                sqlx::query(
                    r#"UPDATE email_outbox
                       SET status = 'sent', attempts = attempts + 1, last_error = NULL, updated_at = NOW()
                       WHERE id = $1"#,
                )
                .bind(id)
                .execute(&self.pool)
                .await?;
            }
            Err(err) => {
                tracing::error!(mail_id = %id, error = %err, "email delivery failed");
                let attempts = mail.attempts + 1;
                if attempts >= mail.max_attempts {
                    sqlx::query(
                        r#"UPDATE email_outbox
                           SET status = 'failed', attempts = $1, last_error = $2, updated_at = NOW()
                           WHERE id = $3"#,
                    )
                    .bind(attempts)
                    .bind(&err)
                    .bind(id)
                    .execute(&self.pool)
                    .await?;
                } else {
                    let backoff_secs = (30 * 2i64.pow((attempts - 1).min(6) as u32)).min(3600);
                    let next_retry = Utc::now() + Duration::seconds(backoff_secs);
                    sqlx::query(
                        r#"UPDATE email_outbox
                           SET attempts = $1, last_error = $2, next_retry_at = $3, updated_at = NOW()
                           WHERE id = $4"#,
                    )
                    .bind(attempts)
                    .bind(&err)
                    .bind(next_retry)
                    .bind(id)
                    .execute(&self.pool)
                    .await?;
                }
            }
        }

        Ok(true)
    }
}

pub fn welcome_email(name: &str) -> (String, String) {
    (
        "Welcome to the marketplace".to_string(),
        format!(
            "Hi {name},\n\nYour account has been created. You can now browse jobs and opleidingen and start applying.\n"
        ),
    )
}

pub fn ambassador_code_email(name: &str, code: &str) -> (String, String) {
    (
        "Your ambassador verification code".to_string(),
        format!(
            "Hi {name},\n\nYour ambassador verification code is {code}. It expires in 24 hours.\n\nEnter it on the verification page to activate your ambassador account.\n"
        ),
    )
}

pub fn ambassador_application_email(name: &str, email: &str) -> (String, String) {
    (
        "New ambassador application".to_string(),
        format!(
            "{name} ({email}) applied to become an ambassador. Review the application in the admin dashboard to issue a verification code or decline.\n"
        ),
    )
}

pub fn ambassador_declined_email(name: &str) -> (String, String) {
    (
        "Ambassador application declined".to_string(),
        format!(
            "Hi {name},\n\nYour ambassador application has been declined. Your account remains active as a student account.\n"
        ),
    )
}

pub fn business_approved_email(name: &str) -> (String, String) {
    (
        "Business account approved".to_string(),
        format!(
            "Hi {name},\n\nYour business account has been approved. You can now publish job postings.\n"
        ),
    )
}

pub fn application_received_email(name: &str, posting_title: &str) -> (String, String) {
    (
        format!("Application received: {posting_title}"),
        format!(
            "Hi {name},\n\nWe received your application for \"{posting_title}\". The poster will review it and you will hear from us when its status changes.\n"
        ),
    )
}

pub fn admin_application_email(
    applicant_name: &str,
    applicant_email: &str,
    posting_title: &str,
) -> (String, String) {
    (
        format!("New application: {posting_title}"),
        format!(
            "{applicant_name} ({applicant_email}) applied for \"{posting_title}\".\n"
        ),
    )
}

/// Message template selected by the new status value. Same-value updates
/// re-send the matching template.
pub fn application_status_email(
    name: &str,
    posting_title: &str,
    status: ApplicationStatus,
) -> (String, String) {
    match status {
        ApplicationStatus::RequestInfo => (
            format!("Additional documents needed for {posting_title}"),
            format!(
                "Hi {name},\n\nThere are additional documents needed for your application to \"{posting_title}\". Please upload them through your dashboard.\n"
            ),
        ),
        ApplicationStatus::Interview => (
            format!("Interview invitation for {posting_title}"),
            format!(
                "Hi {name},\n\nGood news: you have an interview invitation for \"{posting_title}\". The poster will contact you to schedule it.\n"
            ),
        ),
        ApplicationStatus::Accepted => (
            format!("Your application to {posting_title} was accepted"),
            format!(
                "Hi {name},\n\nCongratulations! Your application to \"{posting_title}\" has been accepted.\n"
            ),
        ),
        ApplicationStatus::Rejected => (
            format!("Update on your application to {posting_title}"),
            format!(
                "Hi {name},\n\nThank you for applying to \"{posting_title}\". Unfortunately we are not proceeding with your application.\n"
            ),
        ),
        other => (
            format!("Update on your application to {posting_title}"),
            format!(
                "Hi {name},\n\nYour application to \"{posting_title}\" has been updated to status {other}.\n"
            ),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_templates_match_lifecycle() {
        let (_, body) =
            application_status_email("Ada", "Backend Engineer", ApplicationStatus::RequestInfo);
        assert!(body.contains("additional documents needed"));

        let (subject, _) =
            application_status_email("Ada", "Backend Engineer", ApplicationStatus::Interview);
        assert!(subject.contains("Interview invitation"));

        let (_, body) =
            application_status_email("Ada", "Backend Engineer", ApplicationStatus::Accepted);
        assert!(body.contains("Congratulations"));

        let (_, body) =
            application_status_email("Ada", "Backend Engineer", ApplicationStatus::Rejected);
        assert!(body.contains("not proceeding"));

        let (_, body) =
            application_status_email("Ada", "Backend Engineer", ApplicationStatus::Viewed);
        assert!(body.contains("updated to status VIEWED"));
    }
}

use sqlx::PgPool;
use uuid::Uuid;

use crate::config::get_config;
use crate::dto::application_dto::SubmitApplicationPayload;
use crate::error::{Error, Result};
use crate::middleware::auth::RequestContext;
use crate::models::application::{Application, ApplicationStatus, ApplicationWithApplicant};
use crate::models::user::{Role, User};
use crate::services::notification_service::{self, NotificationService};

/// The posting an application targets: exactly one of a job or an opleiding.
enum Target {
    Job(Uuid),
    Opleiding(Uuid),
}

#[derive(Clone)]
pub struct ApplicationService {
    pool: PgPool,
    notifications: NotificationService,
}

impl ApplicationService {
    pub fn new(pool: PgPool, notifications: NotificationService) -> Self {
        Self {
            pool,
            notifications,
        }
    }

    pub async fn submit(
        &self,
        ctx: &RequestContext,
        payload: SubmitApplicationPayload,
    ) -> Result<Application> {
        if ctx.user_id != payload.user_id {
            return Err(Error::Unauthorized(
                "cannot apply on behalf of another user".to_string(),
            ));
        }
        if !matches!(ctx.role, Role::Student | Role::Expert) {
            return Err(Error::Forbidden(
                "only students and experts may apply".to_string(),
            ));
        }

        let target = match (payload.job_id, payload.opleiding_id) {
            (Some(job_id), None) => Target::Job(job_id),
            (None, Some(opleiding_id)) => Target::Opleiding(opleiding_id),
            _ => {
                return Err(Error::BadRequest(
                    "exactly one of job_id or opleiding_id is required".to_string(),
                ))
            }
        };

        let posting_title = self.load_posting_title(&target).await?;

        // Fast-path duplicate check; the unique constraints on
        // (user_id, job_id) / (user_id, opleiding_id) settle the race.
        let duplicate = match target {
            Target::Job(job_id) => {
                sqlx::query_scalar::<_, Uuid>(
                    "SELECT id FROM applications WHERE user_id = $1 AND job_id = $2",
                )
                .bind(payload.user_id)
                .bind(job_id)
                .fetch_optional(&self.pool)
                .await?
            }
            Target::Opleiding(opleiding_id) => {
                sqlx::query_scalar::<_, Uuid>(
                    "SELECT id FROM applications WHERE user_id = $1 AND opleiding_id = $2",
                )
                .bind(payload.user_id)
                .bind(opleiding_id)
                .fetch_optional(&self.pool)
                .await?
            }
        };
        if duplicate.is_some() {
            return Err(Error::BadRequest(
                "already applied to this posting".to_string(),
            ));
        }

        let applicant = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(payload.user_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::Unauthorized("account no longer exists".to_string()))?;

        let cv_url = payload.cv_url.or_else(|| applicant.cv_url.clone());

        let inserted = sqlx::query_as::<_, Application>(
            r#"
            INSERT INTO applications (user_id, job_id, opleiding_id, cv_url, cover_letter, status)
            VALUES ($1, $2, $3, $4, $5, 'SUBMITTED')
            RETURNING *
            "#,
        )
        .bind(payload.user_id)
        .bind(payload.job_id)
        .bind(payload.opleiding_id)
        .bind(&cv_url)
        .bind(&payload.cover_letter)
        .fetch_one(&self.pool)
        .await;

        let application = match inserted {
            Ok(application) => application,
            Err(err) => {
                let err = Error::from(err);
                if err.is_unique_violation() {
                    return Err(Error::BadRequest(
                        "already applied to this posting".to_string(),
                    ));
                }
                return Err(err);
            }
        };

        let (subject, body) =
            notification_service::application_received_email(&applicant.name, &posting_title);
        if let Err(e) = self
            .notifications
            .enqueue(&applicant.email, &subject, &body)
            .await
        {
            tracing::error!(application_id = %application.id, error = %e, "failed to enqueue confirmation email");
        }

        let admin_email = &get_config().admin_email;
        let (subject, body) = notification_service::admin_application_email(
            &applicant.name,
            &applicant.email,
            &posting_title,
        );
        if let Err(e) = self.notifications.enqueue(admin_email, &subject, &body).await {
            tracing::error!(application_id = %application.id, error = %e, "failed to enqueue admin notification");
        }

        Ok(application)
    }

    /// Overwrites the status unconditionally (any value to any value;
    /// same-value updates re-fire the notification) and emails the applicant.
    pub async fn update_status(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        status: ApplicationStatus,
    ) -> Result<Application> {
        let application =
            sqlx::query_as::<_, Application>("SELECT * FROM applications WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?
                .ok_or_else(|| Error::NotFound("Application not found".to_string()))?;

        let target = application_target(&application)?;
        let creator = self.load_posting_creator(&target).await?;
        if !ctx.is_admin() && ctx.user_id != creator {
            return Err(Error::Forbidden(
                "only the posting creator or an admin may update application status".to_string(),
            ));
        }

        let application = sqlx::query_as::<_, Application>(
            r#"
            UPDATE applications
            SET status = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(status)
        .fetch_one(&self.pool)
        .await?;

        let applicant = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(application.user_id)
            .fetch_one(&self.pool)
            .await?;
        let posting_title = self.load_posting_title(&target).await?;

        let (subject, body) =
            notification_service::application_status_email(&applicant.name, &posting_title, status);
        if let Err(e) = self
            .notifications
            .enqueue(&applicant.email, &subject, &body)
            .await
        {
            tracing::error!(application_id = %application.id, error = %e, "failed to enqueue status email");
        }

        Ok(application)
    }

    pub async fn list_for_job(
        &self,
        ctx: &RequestContext,
        job_id: Uuid,
    ) -> Result<Vec<ApplicationWithApplicant>> {
        let creator = self.load_posting_creator(&Target::Job(job_id)).await?;
        if !ctx.is_admin() && ctx.user_id != creator {
            return Err(Error::Forbidden(
                "only the posting creator or an admin may list applications".to_string(),
            ));
        }

        let items = sqlx::query_as::<_, ApplicationWithApplicant>(
            r#"
            SELECT a.id, a.user_id, a.job_id, a.opleiding_id, a.cv_url, a.cover_letter,
                   a.status, a.created_at, u.name AS applicant_name, u.email AS applicant_email
            FROM applications a
            JOIN users u ON u.id = a.user_id
            WHERE a.job_id = $1
            ORDER BY a.created_at DESC
            "#,
        )
        .bind(job_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    pub async fn list_for_opleiding(
        &self,
        ctx: &RequestContext,
        opleiding_id: Uuid,
    ) -> Result<Vec<ApplicationWithApplicant>> {
        let creator = self
            .load_posting_creator(&Target::Opleiding(opleiding_id))
            .await?;
        if !ctx.is_admin() && ctx.user_id != creator {
            return Err(Error::Forbidden(
                "only the posting creator or an admin may list applications".to_string(),
            ));
        }

        let items = sqlx::query_as::<_, ApplicationWithApplicant>(
            r#"
            SELECT a.id, a.user_id, a.job_id, a.opleiding_id, a.cv_url, a.cover_letter,
                   a.status, a.created_at, u.name AS applicant_name, u.email AS applicant_email
            FROM applications a
            JOIN users u ON u.id = a.user_id
            WHERE a.opleiding_id = $1
            ORDER BY a.created_at DESC
            "#,
        )
        .bind(opleiding_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Application>> {
        let items = sqlx::query_as::<_, Application>(
            "SELECT * FROM applications WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    async fn load_posting_title(&self, target: &Target) -> Result<String> {
        let title = match target {
            Target::Job(id) => {
                sqlx::query_scalar::<_, String>("SELECT title FROM jobs WHERE id = $1")
                    .bind(id)
                    .fetch_optional(&self.pool)
                    .await?
                    .ok_or_else(|| Error::BadRequest("job not found".to_string()))?
            }
            Target::Opleiding(id) => {
                sqlx::query_scalar::<_, String>("SELECT title FROM opleidingen WHERE id = $1")
                    .bind(id)
                    .fetch_optional(&self.pool)
                    .await?
                    .ok_or_else(|| Error::BadRequest("opleiding not found".to_string()))?
            }
        };
        Ok(title)
    }

    async fn load_posting_creator(&self, target: &Target) -> Result<Uuid> {
        let creator = match target {
            Target::Job(id) => {
                sqlx::query_scalar::<_, Uuid>("SELECT created_by FROM jobs WHERE id = $1")
                    .bind(id)
                    .fetch_optional(&self.pool)
                    .await?
                    .ok_or_else(|| Error::NotFound("Job not found".to_string()))?
            }
            Target::Opleiding(id) => {
                sqlx::query_scalar::<_, Uuid>("SELECT created_by FROM opleidingen WHERE id = $1")
                    .bind(id)
                    .fetch_optional(&self.pool)
                    .await?
                    .ok_or_else(|| Error::NotFound("Opleiding not found".to_string()))?
            }
        };
        Ok(creator)
    }
}

fn application_target(application: &Application) -> Result<Target> {
    match (application.job_id, application.opleiding_id) {
        (Some(job_id), None) => Ok(Target::Job(job_id)),
        (None, Some(opleiding_id)) => Ok(Target::Opleiding(opleiding_id)),
        // unreachable under the table CHECK constraint
        _ => Err(Error::Internal(
            "application has no single target".to_string(),
        )),
    }
}

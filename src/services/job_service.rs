use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::job_dto::{CreateJobPayload, JobListQuery, UpdateJobPayload};
use crate::error::{Error, Result};
use crate::middleware::auth::RequestContext;
use crate::models::job::Job;
use crate::models::user::User;

#[derive(Clone)]
pub struct JobService {
    pool: PgPool,
}

pub struct JobList {
    pub items: Vec<Job>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub total_pages: i64,
}

impl JobService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, ctx: &RequestContext, payload: CreateJobPayload) -> Result<Job> {
        let creator = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(ctx.user_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::Unauthorized("account no longer exists".to_string()))?;
        super::ensure_can_post(&creator)?;

        let job = sqlx::query_as::<_, Job>(
            r#"
            INSERT INTO jobs (
                title, company, location, category, employment_type,
                salary_from, salary_to, description, requirements, is_visible, created_by
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *
            "#,
        )
        .bind(&payload.title)
        .bind(&payload.company)
        .bind(&payload.location)
        .bind(payload.category)
        .bind(&payload.employment_type)
        .bind(payload.salary_from)
        .bind(payload.salary_to)
        .bind(&payload.description)
        .bind(&payload.requirements)
        .bind(payload.is_visible.unwrap_or(true))
        .bind(creator.id)
        .fetch_one(&self.pool)
        .await?;

        Ok(job)
    }

    pub async fn update(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        payload: UpdateJobPayload,
    ) -> Result<Job> {
        let job = self.get_by_id(id).await?;
        if !ctx.is_admin() && job.created_by != ctx.user_id {
            return Err(Error::Forbidden(
                "only the creator or an admin may modify this posting".to_string(),
            ));
        }

        let job = sqlx::query_as::<_, Job>(
            r#"
            UPDATE jobs
            SET
                title = COALESCE($2, title),
                company = COALESCE($3, company),
                location = COALESCE($4, location),
                category = COALESCE($5, category),
                employment_type = COALESCE($6, employment_type),
                salary_from = COALESCE($7, salary_from),
                salary_to = COALESCE($8, salary_to),
                description = COALESCE($9, description),
                requirements = COALESCE($10, requirements),
                is_visible = COALESCE($11, is_visible),
                is_expired = COALESCE($12, is_expired),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(payload.title)
        .bind(payload.company)
        .bind(payload.location)
        .bind(payload.category)
        .bind(payload.employment_type)
        .bind(payload.salary_from)
        .bind(payload.salary_to)
        .bind(payload.description)
        .bind(payload.requirements)
        .bind(payload.is_visible)
        .bind(payload.is_expired)
        .fetch_one(&self.pool)
        .await?;

        Ok(job)
    }

    pub async fn delete(&self, ctx: &RequestContext, id: Uuid) -> Result<()> {
        let job = self.get_by_id(id).await?;
        if !ctx.is_admin() && job.created_by != ctx.user_id {
            return Err(Error::Forbidden(
                "only the creator or an admin may delete this posting".to_string(),
            ));
        }

        // dependent applications go with it (FK ON DELETE CASCADE)
        sqlx::query("DELETE FROM jobs WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Job> {
        let job = sqlx::query_as::<_, Job>("SELECT * FROM jobs WHERE id = $1")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(job)
    }

    /// Public listing: visible, unexpired postings, newest first.
    pub async fn list_public(&self, query: JobListQuery) -> Result<JobList> {
        let page = query.page.unwrap_or(1).max(1);
        let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
        let offset = (page - 1) * per_page;

        let mut filters = vec!["is_visible AND NOT is_expired".to_string()];
        let mut args: Vec<String> = Vec::new();

        if let Some(category) = query.category {
            filters.push(format!("category = (${})::job_category", args.len() + 1));
            args.push(category.as_str().to_string());
        }
        if let Some(search) = query.search {
            let first = args.len() + 1;
            let second = first + 1;
            filters.push(format!(
                "(title ILIKE ${} OR company ILIKE ${})",
                first, second
            ));
            args.push(format!("%{}%", search.clone()));
            args.push(format!("%{}%", search));
        }

        let where_clause = format!("WHERE {}", filters.join(" AND "));

        let items_query = format!(
            "SELECT * FROM jobs {} ORDER BY created_at DESC LIMIT ${} OFFSET ${}",
            where_clause,
            args.len() + 1,
            args.len() + 2
        );
        let total_query = format!("SELECT COUNT(*) FROM jobs {}", where_clause);

        let mut items_statement = sqlx::query_as::<_, Job>(&items_query);
        for value in &args {
            items_statement = items_statement.bind(value);
        }
        items_statement = items_statement.bind(per_page).bind(offset);
        let items = items_statement.fetch_all(&self.pool).await?;

        let mut total_statement = sqlx::query_scalar::<_, i64>(&total_query);
        for value in &args {
            total_statement = total_statement.bind(value);
        }
        let total = total_statement.fetch_one(&self.pool).await?;

        let total_pages = ((total as f64) / (per_page as f64)).ceil() as i64;

        Ok(JobList {
            items,
            total,
            page,
            per_page,
            total_pages,
        })
    }

    /// All postings by the current user, hidden and expired included.
    pub async fn list_mine(&self, ctx: &RequestContext) -> Result<Vec<Job>> {
        let items = sqlx::query_as::<_, Job>(
            "SELECT * FROM jobs WHERE created_by = $1 ORDER BY created_at DESC",
        )
        .bind(ctx.user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }
}

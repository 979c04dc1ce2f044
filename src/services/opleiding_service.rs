use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::opleiding_dto::{CreateOpleidingPayload, OpleidingListQuery, UpdateOpleidingPayload};
use crate::error::{Error, Result};
use crate::middleware::auth::RequestContext;
use crate::models::opleiding::Opleiding;
use crate::models::user::User;

#[derive(Clone)]
pub struct OpleidingService {
    pool: PgPool,
}

pub struct OpleidingList {
    pub items: Vec<Opleiding>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub total_pages: i64,
}

impl OpleidingService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        ctx: &RequestContext,
        payload: CreateOpleidingPayload,
    ) -> Result<Opleiding> {
        let creator = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(ctx.user_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::Unauthorized("account no longer exists".to_string()))?;
        super::ensure_can_post(&creator)?;

        let opleiding = sqlx::query_as::<_, Opleiding>(
            r#"
            INSERT INTO opleidingen (
                title, institution, location, opleiding_type, description,
                duration_months, start_date, cost, is_visible, created_by
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(&payload.title)
        .bind(&payload.institution)
        .bind(&payload.location)
        .bind(payload.opleiding_type)
        .bind(&payload.description)
        .bind(payload.duration_months)
        .bind(payload.start_date)
        .bind(payload.cost)
        .bind(payload.is_visible.unwrap_or(true))
        .bind(creator.id)
        .fetch_one(&self.pool)
        .await?;

        Ok(opleiding)
    }

    pub async fn update(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        payload: UpdateOpleidingPayload,
    ) -> Result<Opleiding> {
        let opleiding = self.get_by_id(id).await?;
        if !ctx.is_admin() && opleiding.created_by != ctx.user_id {
            return Err(Error::Forbidden(
                "only the creator or an admin may modify this posting".to_string(),
            ));
        }

        let opleiding = sqlx::query_as::<_, Opleiding>(
            r#"
            UPDATE opleidingen
            SET
                title = COALESCE($2, title),
                institution = COALESCE($3, institution),
                location = COALESCE($4, location),
                opleiding_type = COALESCE($5, opleiding_type),
                description = COALESCE($6, description),
                duration_months = COALESCE($7, duration_months),
                start_date = COALESCE($8, start_date),
                cost = COALESCE($9, cost),
                is_visible = COALESCE($10, is_visible),
                is_expired = COALESCE($11, is_expired),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(payload.title)
        .bind(payload.institution)
        .bind(payload.location)
        .bind(payload.opleiding_type)
        .bind(payload.description)
        .bind(payload.duration_months)
        .bind(payload.start_date)
        .bind(payload.cost)
        .bind(payload.is_visible)
        .bind(payload.is_expired)
        .fetch_one(&self.pool)
        .await?;

        Ok(opleiding)
    }

    pub async fn delete(&self, ctx: &RequestContext, id: Uuid) -> Result<()> {
        let opleiding = self.get_by_id(id).await?;
        if !ctx.is_admin() && opleiding.created_by != ctx.user_id {
            return Err(Error::Forbidden(
                "only the creator or an admin may delete this posting".to_string(),
            ));
        }

        sqlx::query("DELETE FROM opleidingen WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Opleiding> {
        let opleiding = sqlx::query_as::<_, Opleiding>("SELECT * FROM opleidingen WHERE id = $1")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(opleiding)
    }

    pub async fn list_public(&self, query: OpleidingListQuery) -> Result<OpleidingList> {
        let page = query.page.unwrap_or(1).max(1);
        let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
        let offset = (page - 1) * per_page;

        let mut filters = vec!["is_visible AND NOT is_expired".to_string()];
        let mut args: Vec<String> = Vec::new();

        if let Some(opleiding_type) = query.opleiding_type {
            filters.push(format!(
                "opleiding_type = (${})::opleiding_type",
                args.len() + 1
            ));
            args.push(opleiding_type.as_str().to_string());
        }
        if let Some(search) = query.search {
            let first = args.len() + 1;
            let second = first + 1;
            filters.push(format!(
                "(title ILIKE ${} OR institution ILIKE ${})",
                first, second
            ));
            args.push(format!("%{}%", search.clone()));
            args.push(format!("%{}%", search));
        }

        let where_clause = format!("WHERE {}", filters.join(" AND "));

        let items_query = format!(
            "SELECT * FROM opleidingen {} ORDER BY created_at DESC LIMIT ${} OFFSET ${}",
            where_clause,
            args.len() + 1,
            args.len() + 2
        );
        let total_query = format!("SELECT COUNT(*) FROM opleidingen {}", where_clause);

        let mut items_statement = sqlx::query_as::<_, Opleiding>(&items_query);
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

        Ok(OpleidingList {
            items,
            total,
            page,
            per_page,
            total_pages,
        })
    }

    pub async fn list_mine(&self, ctx: &RequestContext) -> Result<Vec<Opleiding>> {
        let items = sqlx::query_as::<_, Opleiding>(
            "SELECT * FROM opleidingen WHERE created_by = $1 ORDER BY created_at DESC",
        )
        .bind(ctx.user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }
}

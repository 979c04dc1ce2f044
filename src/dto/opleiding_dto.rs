use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::models::opleiding::{Opleiding, OpleidingType};
use crate::services::opleiding_service::OpleidingList;

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateOpleidingPayload {
    #[validate(length(min = 1))]
    pub title: String,
    pub institution: Option<String>,
    pub location: Option<String>,
    pub opleiding_type: OpleidingType,
    #[validate(length(min = 1))]
    pub description: String,
    pub duration_months: Option<i32>,
    pub start_date: Option<NaiveDate>,
    pub cost: Option<Decimal>,
    pub is_visible: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateOpleidingPayload {
    #[validate(length(min = 1))]
    pub title: Option<String>,
    pub institution: Option<String>,
    pub location: Option<String>,
    pub opleiding_type: Option<OpleidingType>,
    #[validate(length(min = 1))]
    pub description: Option<String>,
    pub duration_months: Option<i32>,
    pub start_date: Option<NaiveDate>,
    pub cost: Option<Decimal>,
    pub is_visible: Option<bool>,
    pub is_expired: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OpleidingResponse {
    pub id: uuid::Uuid,
    pub title: String,
    pub institution: Option<String>,
    pub location: Option<String>,
    pub opleiding_type: OpleidingType,
    pub description: String,
    pub duration_months: Option<i32>,
    pub start_date: Option<NaiveDate>,
    pub cost: Option<Decimal>,
    pub is_visible: bool,
    pub is_expired: bool,
    pub created_by: uuid::Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OpleidingListResponse {
    pub items: Vec<OpleidingResponse>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub total_pages: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct OpleidingListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub opleiding_type: Option<OpleidingType>,
    pub search: Option<String>,
}

impl From<Opleiding> for OpleidingResponse {
    fn from(value: Opleiding) -> Self {
        Self {
            id: value.id,
            title: value.title,
            institution: value.institution,
            location: value.location,
            opleiding_type: value.opleiding_type,
            description: value.description,
            duration_months: value.duration_months,
            start_date: value.start_date,
            cost: value.cost,
            is_visible: value.is_visible,
            is_expired: value.is_expired,
            created_by: value.created_by,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

impl From<OpleidingList> for OpleidingListResponse {
    fn from(value: OpleidingList) -> Self {
        Self {
            items: value.items.into_iter().map(Into::into).collect(),
            total: value.total,
            page: value.page,
            per_page: value.per_page,
            total_pages: value.total_pages,
        }
    }
}

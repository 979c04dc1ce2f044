use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "job_category", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum JobCategory {
    Techniek,
    Zorg,
    Onderwijs,
    Horeca,
    Logistiek,
    Retail,
    Overig,
}

impl JobCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            JobCategory::Techniek => "TECHNIEK",
            JobCategory::Zorg => "ZORG",
            JobCategory::Onderwijs => "ONDERWIJS",
            JobCategory::Horeca => "HORECA",
            JobCategory::Logistiek => "LOGISTIEK",
            JobCategory::Retail => "RETAIL",
            JobCategory::Overig => "OVERIG",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Job {
    pub id: Uuid,
    pub title: String,
    pub company: Option<String>,
    pub location: Option<String>,
    pub category: JobCategory,
    pub employment_type: Option<String>,
    pub salary_from: Option<Decimal>,
    pub salary_to: Option<Decimal>,
    pub description: String,
    pub requirements: Option<String>,
    pub is_visible: bool,
    pub is_expired: bool,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

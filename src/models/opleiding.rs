use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "opleiding_type", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum OpleidingType {
    Mbo,
    Hbo,
    Wo,
    Cursus,
    Studiereis,
}

impl OpleidingType {
    pub fn as_str(self) -> &'static str {
        match self {
            OpleidingType::Mbo => "MBO",
            OpleidingType::Hbo => "HBO",
            OpleidingType::Wo => "WO",
            OpleidingType::Cursus => "CURSUS",
            OpleidingType::Studiereis => "STUDIEREIS",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Opleiding {
    pub id: Uuid,
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
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::application::ApplicationStatus;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct SubmitApplicationPayload {
    pub user_id: Uuid,
    pub job_id: Option<Uuid>,
    pub opleiding_id: Option<Uuid>,
    #[validate(length(min = 1))]
    pub cover_letter: String,
    #[validate(url)]
    pub cv_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateApplicationStatusPayload {
    pub status: ApplicationStatus,
}

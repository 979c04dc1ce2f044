use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::application_dto::{SubmitApplicationPayload, UpdateApplicationStatusPayload},
    error::Result,
    middleware::auth::RequestContext,
    AppState,
};

#[axum::debug_handler]
pub async fn submit_application(
    State(state): State<AppState>,
    ctx: RequestContext,
    Json(payload): Json<SubmitApplicationPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let application = state.application_service.submit(&ctx, payload).await?;
    tracing::info!(application_id = %application.id, user_id = %ctx.user_id, "application submitted");
    Ok((StatusCode::CREATED, Json(application)))
}

#[axum::debug_handler]
pub async fn update_application_status(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateApplicationStatusPayload>,
) -> Result<impl IntoResponse> {
    let application = state
        .application_service
        .update_status(&ctx, id, payload.status)
        .await?;
    tracing::info!(application_id = %application.id, status = %application.status, "application status updated");
    Ok(Json(application))
}

#[axum::debug_handler]
pub async fn list_my_applications(
    State(state): State<AppState>,
    ctx: RequestContext,
) -> Result<impl IntoResponse> {
    let applications = state.application_service.list_for_user(ctx.user_id).await?;
    Ok(Json(applications))
}

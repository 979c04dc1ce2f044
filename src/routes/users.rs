use axum::{
    extract::State,
    response::{IntoResponse, Json},
};
use validator::Validate;

use crate::{
    dto::auth_dto::{UpdateProfilePayload, UserResponse},
    error::{Error, Result},
    middleware::auth::RequestContext,
    AppState,
};

#[axum::debug_handler]
pub async fn get_me(
    State(state): State<AppState>,
    ctx: RequestContext,
) -> Result<impl IntoResponse> {
    let user = state
        .user_service
        .get_by_id(ctx.user_id)
        .await?
        .ok_or_else(|| Error::NotFound("User not found".to_string()))?;
    Ok(Json(UserResponse::from(user)))
}

#[axum::debug_handler]
pub async fn apply_ambassador(
    State(state): State<AppState>,
    ctx: RequestContext,
) -> Result<impl IntoResponse> {
    let user = state.user_service.apply_ambassador(ctx.user_id).await?;
    tracing::info!(user_id = %user.id, "ambassador application received");
    Ok(Json(UserResponse::from(user)))
}

#[axum::debug_handler]
pub async fn update_me(
    State(state): State<AppState>,
    ctx: RequestContext,
    Json(payload): Json<UpdateProfilePayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let user = state
        .user_service
        .update_profile(ctx.user_id, payload)
        .await?;
    Ok(Json(UserResponse::from(user)))
}

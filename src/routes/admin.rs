use axum::{
    extract::{Query, State},
    response::{IntoResponse, Json},
};

use crate::{
    dto::admin_dto::{
        MessageResponse, UserListQuery, VerifyAction, VerifyAmbassadorPayload,
        VerifyBusinessPayload,
    },
    dto::auth_dto::UserResponse,
    error::{Error, Result},
    middleware::auth::RequestContext,
    AppState,
};

/// The `/api/admin` prefix is already guarded; the explicit check keeps these
/// handlers safe when mounted elsewhere.
fn require_admin(ctx: &RequestContext) -> Result<()> {
    if !ctx.is_admin() {
        return Err(Error::Unauthorized("admin only".to_string()));
    }
    Ok(())
}

#[axum::debug_handler]
pub async fn verify_ambassador(
    State(state): State<AppState>,
    ctx: RequestContext,
    Json(payload): Json<VerifyAmbassadorPayload>,
) -> Result<impl IntoResponse> {
    require_admin(&ctx)?;

    match payload.action.unwrap_or(VerifyAction::Verify) {
        VerifyAction::Verify => {
            let user = state
                .verification_service
                .issue_ambassador_code(payload.user_id)
                .await?;
            tracing::info!(user_id = %user.id, "ambassador verification code issued");
            Ok(Json(MessageResponse {
                message: "verification code sent".to_string(),
            }))
        }
        VerifyAction::Decline => {
            let user = state
                .verification_service
                .decline_ambassador(payload.user_id)
                .await?;
            tracing::info!(user_id = %user.id, "ambassador application declined");
            Ok(Json(MessageResponse {
                message: "ambassador application declined".to_string(),
            }))
        }
    }
}

#[axum::debug_handler]
pub async fn verify_business(
    State(state): State<AppState>,
    ctx: RequestContext,
    Json(payload): Json<VerifyBusinessPayload>,
) -> Result<impl IntoResponse> {
    require_admin(&ctx)?;

    let user = state
        .verification_service
        .set_business_verified(payload.user_id, payload.verified)
        .await?;
    tracing::info!(user_id = %user.id, verified = payload.verified, "business verification updated");
    Ok(Json(UserResponse::from(user)))
}

#[axum::debug_handler]
pub async fn list_users(
    State(state): State<AppState>,
    ctx: RequestContext,
    Query(query): Query<UserListQuery>,
) -> Result<impl IntoResponse> {
    require_admin(&ctx)?;

    let users = state.user_service.list(query.role).await?;
    let users: Vec<UserResponse> = users.into_iter().map(Into::into).collect();
    Ok(Json(users))
}

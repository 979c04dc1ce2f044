use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use validator::Validate;

use crate::{
    dto::admin_dto::MessageResponse,
    dto::auth_dto::{
        AuthResponse, LoginPayload, SignupPayload, SignupResponse, UserResponse, VerifyOtpPayload,
    },
    error::Result,
    middleware::auth::encode_token,
    AppState,
};

#[axum::debug_handler]
pub async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<SignupPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let user = state.user_service.register(payload).await?;
    tracing::info!(user_id = %user.id, role = %user.role, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(SignupResponse { user_id: user.id }),
    ))
}

#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let user = state
        .user_service
        .authenticate(&payload.email, &payload.password)
        .await?;
    let token = encode_token(&user)?;
    Ok(Json(AuthResponse {
        token,
        user: UserResponse::from(user),
    }))
}

#[axum::debug_handler]
pub async fn verify_otp(
    State(state): State<AppState>,
    Json(payload): Json<VerifyOtpPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let user = state
        .verification_service
        .confirm_code(&payload.email, &payload.code)
        .await?;
    tracing::info!(user_id = %user.id, "ambassador verified");
    Ok(Json(MessageResponse {
        message: "ambassador account verified".to_string(),
    }))
}

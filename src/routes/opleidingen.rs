use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::opleiding_dto::{
        CreateOpleidingPayload, OpleidingListQuery, OpleidingListResponse, OpleidingResponse,
        UpdateOpleidingPayload,
    },
    error::Result,
    middleware::auth::RequestContext,
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/opleidingen",
    request_body = CreateOpleidingPayload,
    responses(
        (status = 201, description = "Opleiding created successfully", body = OpleidingResponse),
        (status = 400, description = "Invalid payload"),
        (status = 403, description = "Creator is not verified for posting")
    )
)]
#[axum::debug_handler]
pub async fn create_opleiding(
    State(state): State<AppState>,
    ctx: RequestContext,
    Json(payload): Json<CreateOpleidingPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let opleiding = state.opleiding_service.create(&ctx, payload).await?;
    Ok((StatusCode::CREATED, Json(OpleidingResponse::from(opleiding))))
}

#[utoipa::path(
    patch,
    path = "/api/opleidingen/{id}",
    params(
        ("id" = Uuid, Path, description = "Opleiding ID")
    ),
    request_body = UpdateOpleidingPayload,
    responses(
        (status = 200, description = "Opleiding updated successfully", body = OpleidingResponse),
        (status = 403, description = "Not the creator or an admin"),
        (status = 404, description = "Opleiding not found")
    )
)]
#[axum::debug_handler]
pub async fn update_opleiding(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateOpleidingPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let opleiding = state.opleiding_service.update(&ctx, id, payload).await?;
    Ok(Json(OpleidingResponse::from(opleiding)))
}

#[utoipa::path(
    delete,
    path = "/api/opleidingen/{id}",
    params(
        ("id" = Uuid, Path, description = "Opleiding ID")
    ),
    responses(
        (status = 204, description = "Opleiding deleted successfully"),
        (status = 403, description = "Not the creator or an admin"),
        (status = 404, description = "Opleiding not found")
    )
)]
#[axum::debug_handler]
pub async fn delete_opleiding(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    state.opleiding_service.delete(&ctx, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/opleidingen",
    params(
        ("page" = Option<i64>, Query, description = "Page number"),
        ("per_page" = Option<i64>, Query, description = "Items per page"),
        ("opleiding_type" = Option<String>, Query, description = "Filter by type"),
        ("search" = Option<String>, Query, description = "Search query")
    ),
    responses(
        (status = 200, description = "List of visible opleidingen", body = OpleidingListResponse)
    )
)]
#[axum::debug_handler]
pub async fn list_opleidingen(
    State(state): State<AppState>,
    Query(query): Query<OpleidingListQuery>,
) -> Result<impl IntoResponse> {
    let result = state.opleiding_service.list_public(query).await?;
    Ok(Json(OpleidingListResponse::from(result)))
}

#[utoipa::path(
    get,
    path = "/api/opleidingen/{id}",
    params(
        ("id" = Uuid, Path, description = "Opleiding ID")
    ),
    responses(
        (status = 200, description = "Opleiding found", body = OpleidingResponse),
        (status = 404, description = "Opleiding not found")
    )
)]
#[axum::debug_handler]
pub async fn get_opleiding(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let opleiding = state.opleiding_service.get_by_id(id).await?;
    Ok(Json(OpleidingResponse::from(opleiding)))
}

#[axum::debug_handler]
pub async fn list_my_opleidingen(
    State(state): State<AppState>,
    ctx: RequestContext,
) -> Result<impl IntoResponse> {
    let opleidingen = state.opleiding_service.list_mine(&ctx).await?;
    let opleidingen: Vec<OpleidingResponse> = opleidingen.into_iter().map(Into::into).collect();
    Ok(Json(opleidingen))
}

#[axum::debug_handler]
pub async fn list_opleiding_applications(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let applications = state
        .application_service
        .list_for_opleiding(&ctx, id)
        .await?;
    Ok(Json(applications))
}

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::{
    api::{handlers::{paged, PageParams}, middleware::auth::CurrentUser, state::AppState},
    domain::{CreateAnnouncementRequest, UpdateAnnouncementRequest},
    error::Result,
};

/// Announcements addressed to the caller's role, important ones first.
pub async fn list(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<Value>> {
    let announcements = state
        .service_context
        .announcement_service
        .list_for_role(&current.user)
        .await?;
    Ok(Json(json!({ "announcements": announcements })))
}

pub async fn get(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>> {
    let announcement = state
        .service_context
        .announcement_service
        .get_for_role(&current.user, id)
        .await?;
    Ok(Json(json!({ "announcement": announcement })))
}

// Admin management

pub async fn list_all(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> Result<Json<Value>> {
    let page = state
        .service_context
        .announcement_service
        .list_all(params.request())
        .await?;
    Ok(paged("announcements", page))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(req): Json<CreateAnnouncementRequest>,
) -> Result<(StatusCode, Json<Value>)> {
    let announcement = state
        .service_context
        .announcement_service
        .create(&current.user, req)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Announcement created successfully",
            "announcement": announcement,
        })),
    ))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateAnnouncementRequest>,
) -> Result<Json<Value>> {
    let announcement = state
        .service_context
        .announcement_service
        .update(id, req)
        .await?;

    Ok(Json(json!({
        "message": "Announcement updated successfully",
        "announcement": announcement,
    })))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>> {
    state.service_context.announcement_service.delete(id).await?;
    Ok(Json(json!({ "message": "Announcement deleted successfully" })))
}

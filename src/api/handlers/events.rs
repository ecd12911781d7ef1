use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::{
    api::{handlers::{paged, PageParams}, middleware::auth::CurrentUser, state::AppState},
    domain::{CreateEventRequest, UpdateEventRequest},
    error::Result,
};

/// Active events, soonest first.
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> Result<Json<Value>> {
    let page = state
        .service_context
        .event_service
        .list(true, params.request())
        .await?;
    Ok(paged("events", page))
}

pub async fn get(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>> {
    let event = state.service_context.event_service.get(&current.user, id).await?;
    Ok(Json(json!({ "event": event })))
}

pub async fn register(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>> {
    let event = state
        .service_context
        .event_service
        .register(&current.user, id)
        .await?;

    Ok(Json(json!({
        "message": "Successfully registered for event",
        "event": event,
    })))
}

pub async fn unregister(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>> {
    let event = state
        .service_context
        .event_service
        .unregister(&current.user, id)
        .await?;

    Ok(Json(json!({
        "message": "Successfully unregistered from event",
        "event": event,
    })))
}

// Admin management

pub async fn list_all(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> Result<Json<Value>> {
    let page = state
        .service_context
        .event_service
        .list(false, params.request())
        .await?;
    Ok(paged("events", page))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(req): Json<CreateEventRequest>,
) -> Result<(StatusCode, Json<Value>)> {
    let event = state
        .service_context
        .event_service
        .create(&current.user, req)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Event created successfully",
            "event": event,
        })),
    ))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateEventRequest>,
) -> Result<Json<Value>> {
    let event = state.service_context.event_service.update(id, req).await?;

    Ok(Json(json!({
        "message": "Event updated successfully",
        "event": event,
    })))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>> {
    state.service_context.event_service.delete(id).await?;
    Ok(Json(json!({ "message": "Event deleted successfully" })))
}

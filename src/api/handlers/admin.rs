use axum::{
    body::Body,
    extract::{Extension, Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use futures_util::StreamExt;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio_util::io::ReaderStream;
use uuid::Uuid;

use crate::{
    api::{handlers::{non_empty, paged}, middleware::auth::CurrentUser, state::AppState},
    domain::{AdminAlumniFilter, AdminUpdateUserRequest, ApprovalRequest, PageRequest},
    error::{AppError, Result},
    service::{dashboard_service::Dashboard, export::ExportArtifact},
};

pub async fn dashboard(State(state): State<AppState>) -> Result<Json<Dashboard>> {
    let dashboard = state.service_context.dashboard_service.stats().await?;
    Ok(Json(dashboard))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlumniQuery {
    pub search: Option<String>,
    pub is_approved: Option<bool>,
    pub department: Option<String>,
    pub graduation_year: Option<i32>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

pub async fn list_alumni(
    State(state): State<AppState>,
    Query(query): Query<AlumniQuery>,
) -> Result<Json<Value>> {
    let page = PageRequest::new(query.page, query.limit);
    let filter = AdminAlumniFilter {
        search: non_empty(query.search),
        is_approved: query.is_approved,
        department: non_empty(query.department),
        graduation_year: query.graduation_year,
    };

    let alumni = state
        .service_context
        .account_service
        .list_alumni(filter, page)
        .await?;
    Ok(paged("alumni", alumni))
}

pub async fn approve_alumni(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<ApprovalRequest>,
) -> Result<Json<Value>> {
    let user = state
        .service_context
        .account_service
        .set_approval(id, req.is_approved)
        .await?;

    let verb = if req.is_approved { "approved" } else { "rejected" };
    Ok(Json(json!({
        "message": format!("Alumni {} successfully", verb),
        "user": user,
    })))
}

pub async fn update_alumni(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<AdminUpdateUserRequest>,
) -> Result<Json<Value>> {
    let user = state
        .service_context
        .account_service
        .admin_update_user(id, req)
        .await?;

    Ok(Json(json!({
        "message": "Alumni updated successfully",
        "user": user,
    })))
}

pub async fn delete_alumni(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>> {
    state
        .service_context
        .account_service
        .delete_user(id, &current.user)
        .await?;
    Ok(Json(json!({ "message": "Alumni deleted successfully" })))
}

pub async fn export_csv(State(state): State<AppState>) -> Result<Response> {
    let artifact = state.service_context.export_service.alumni_csv().await?;
    download(artifact).await
}

pub async fn export_pdf(State(state): State<AppState>) -> Result<Response> {
    let artifact = state.service_context.export_service.alumni_pdf().await?;
    download(artifact).await
}

/// Streams the artifact as an attachment. The temp file is removed once the
/// body is dropped, whether the download finished or the client went away.
async fn download(artifact: ExportArtifact) -> Result<Response> {
    let ExportArtifact { format, path } = artifact;

    let file = tokio::fs::File::open(&path)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to open export: {}", e)))?;

    let stream = ReaderStream::new(file).map(move |chunk| {
        let _keep_until_streamed = &path;
        chunk
    });

    Ok((
        [
            (header::CONTENT_TYPE, format.content_type().to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename={}", format.filename()),
            ),
        ],
        Body::from_stream(stream),
    )
        .into_response())
}

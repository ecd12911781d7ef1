use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::{
    api::{handlers::{non_empty, paged}, middleware::auth::CurrentUser, state::AppState},
    domain::{
        ApplicationStatusRequest, CreateJobRequest, EmploymentType, JobFilter, PageRequest,
        UpdateJobRequest,
    },
    error::Result,
};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobQuery {
    pub search: Option<String>,
    pub location: Option<String>,
    pub employment_type: Option<EmploymentType>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl JobQuery {
    fn into_parts(self, active_only: bool) -> (JobFilter, PageRequest) {
        let page = PageRequest::new(self.page, self.limit);
        let filter = JobFilter {
            search: non_empty(self.search),
            location: non_empty(self.location),
            employment_type: self.employment_type,
            active_only,
        };
        (filter, page)
    }
}

/// Active postings, newest first.
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<JobQuery>,
) -> Result<Json<Value>> {
    let (filter, page) = query.into_parts(true);
    let jobs = state.service_context.job_service.list(filter, page).await?;
    Ok(paged("jobs", jobs))
}

pub async fn get(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>> {
    let job = state.service_context.job_service.get(&current.user, id).await?;
    Ok(Json(json!({ "job": job })))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(req): Json<CreateJobRequest>,
) -> Result<(StatusCode, Json<Value>)> {
    let job = state
        .service_context
        .job_service
        .post(&current.user, req)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Job posted successfully",
            "job": job,
        })),
    ))
}

pub async fn apply(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>> {
    let job = state
        .service_context
        .job_service
        .apply(&current.user, id)
        .await?;

    Ok(Json(json!({
        "message": "Application submitted successfully",
        "job": job,
    })))
}

pub async fn applications(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>> {
    let applications = state
        .service_context
        .job_service
        .list_applications(&current.user, id)
        .await?;
    Ok(Json(json!({ "applications": applications })))
}

pub async fn set_application_status(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path((id, applicant_id)): Path<(Uuid, Uuid)>,
    Json(req): Json<ApplicationStatusRequest>,
) -> Result<Json<Value>> {
    let applications = state
        .service_context
        .job_service
        .set_application_status(&current.user, id, applicant_id, req.status)
        .await?;

    Ok(Json(json!({
        "message": "Application status updated",
        "applications": applications,
    })))
}

// Admin management

pub async fn list_all(
    State(state): State<AppState>,
    Query(query): Query<JobQuery>,
) -> Result<Json<Value>> {
    let (filter, page) = query.into_parts(false);
    let jobs = state.service_context.job_service.list(filter, page).await?;
    Ok(paged("jobs", jobs))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateJobRequest>,
) -> Result<Json<Value>> {
    let job = state
        .service_context
        .job_service
        .update(&current.user, id, req)
        .await?;

    Ok(Json(json!({
        "message": "Job posting updated successfully",
        "job": job,
    })))
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>> {
    state
        .service_context
        .job_service
        .delete(&current.user, id)
        .await?;
    Ok(Json(json!({ "message": "Job posting deleted successfully" })))
}

use axum::{
    extract::{Extension, Path, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::{
    api::{handlers::{non_empty, paged}, middleware::auth::CurrentUser, state::AppState},
    domain::{DirectoryFilter, PageRequest},
    error::Result,
};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlumniQuery {
    pub search: Option<String>,
    pub department: Option<String>,
    pub graduation_year: Option<i32>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

pub async fn list_alumni(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Query(query): Query<AlumniQuery>,
) -> Result<Json<Value>> {
    let page = PageRequest::new(query.page, query.limit);
    let filter = DirectoryFilter {
        query: non_empty(query.search),
        department: non_empty(query.department),
        graduation_year: query.graduation_year,
        company: None,
    };

    let profiles = state
        .service_context
        .profile_service
        .search_directory(&current.user, filter, page)
        .await?;
    Ok(paged("profiles", profiles))
}

/// `id` is the profile id as listed by `list_alumni`.
pub async fn get_alumni(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>> {
    let profile = state
        .service_context
        .profile_service
        .get_for_viewer(&current.user, id)
        .await?;
    Ok(Json(json!({ "profile": profile })))
}

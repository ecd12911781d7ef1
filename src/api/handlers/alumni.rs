use axum::{
    extract::{Extension, Multipart, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    api::{handlers::{non_empty, paged}, middleware::auth::CurrentUser, state::AppState},
    domain::{DirectoryFilter, PageRequest, UpsertProfileRequest},
    error::{AppError, Result},
    web::uploads,
};

/// Multipart field carrying the image.
const PHOTO_FIELD: &str = "photo";

pub async fn get_profile(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<Value>> {
    let profile = state
        .service_context
        .profile_service
        .get_own(&current.user)
        .await?;
    Ok(Json(json!({ "profile": profile })))
}

pub async fn update_profile(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(req): Json<UpsertProfileRequest>,
) -> Result<Json<Value>> {
    let profile = state
        .service_context
        .profile_service
        .upsert_own(&current.user, req)
        .await?;

    Ok(Json(json!({
        "message": "Profile updated successfully",
        "profile": profile,
    })))
}

pub async fn upload_photo(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    mut multipart: Multipart,
) -> Result<Json<Value>> {
    let mut upload = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid upload: {}", e)))?
    {
        if field.name() != Some(PHOTO_FIELD) {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().map(str::to_string);
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("Invalid upload: {}", e)))?;
        upload = Some((filename, content_type, data));
        break;
    }

    let (filename, content_type, data) =
        upload.ok_or_else(|| AppError::BadRequest("No file uploaded".to_string()))?;

    let stored = uploads::save_profile_photo(
        &state.settings.uploads,
        current.user.id,
        &filename,
        content_type.as_deref(),
        &data,
    )
    .await?;

    let profile_photo = state
        .service_context
        .profile_service
        .update_photo(&current.user, stored)
        .await?;

    Ok(Json(json!({
        "message": "Profile photo uploaded successfully",
        "profilePhoto": profile_photo,
    })))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    pub query: Option<String>,
    pub department: Option<String>,
    pub graduation_year: Option<i32>,
    pub company: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// Approved alumni directory, as seen by another alumni.
pub async fn search(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Value>> {
    let page = PageRequest::new(query.page, query.limit);
    let filter = DirectoryFilter {
        query: non_empty(query.query),
        department: non_empty(query.department),
        graduation_year: query.graduation_year,
        company: non_empty(query.company),
    };

    let profiles = state
        .service_context
        .profile_service
        .search_directory(&current.user, filter, page)
        .await?;
    Ok(paged("profiles", profiles))
}

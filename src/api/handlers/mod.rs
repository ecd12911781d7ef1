pub mod root;
pub mod auth;
pub mod admin;
pub mod alumni;
pub mod student;
pub mod events;
pub mod jobs;
pub mod announcements;

use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::domain::{Page, PageRequest};

#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl PageParams {
    pub fn request(&self) -> PageRequest {
        PageRequest::new(self.page, self.limit)
    }
}

/// `{<key>: [...], totalPages, currentPage, total}`
pub fn paged<T: Serialize>(key: &str, page: Page<T>) -> Json<Value> {
    let mut body = json!({
        "totalPages": page.total_pages,
        "currentPage": page.current_page,
        "total": page.total,
    });
    body[key] = json!(page.items);
    Json(body)
}

/// Blank query values are treated as absent.
pub fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

use axum::{http::StatusCode, Json, response::IntoResponse};
use serde_json::json;

pub async fn root() -> impl IntoResponse {
    Json(json!({
        "name": "Alumni Management API",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "operational",
        "endpoints": {
            "health": "/api/health",
            "auth": "/api/auth",
            "admin": "/api/admin",
            "alumni": "/api/alumni",
            "student": "/api/student",
            "events": "/api/events",
            "jobs": "/api/jobs",
            "announcements": "/api/announcements"
        }
    }))
}

pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({
        "status": "OK",
        "message": "Alumni Management API is running",
        "timestamp": chrono::Utc::now().to_rfc3339()
    })))
}

pub async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(json!({ "message": "Route not found" })))
}

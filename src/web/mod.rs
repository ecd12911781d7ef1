pub mod uploads;

use axum::Router;
use tower_http::services::ServeDir;

use crate::config::Settings;

/// Stored uploads, served read-only at `/uploads/<file>`.
pub fn create_web_routes(settings: &Settings) -> Router {
    Router::new().nest_service("/uploads", ServeDir::new(&settings.uploads.dir))
}

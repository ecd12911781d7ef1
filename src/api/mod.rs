pub mod handlers;
pub mod middleware;
pub mod state;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    routing::{get, post, put},
};
use tower_http::{
    compression::CompressionLayer,
    cors::CorsLayer,
    trace::TraceLayer,
};
use std::sync::Arc;

use crate::{
    auth::AccessPolicy,
    config::Settings,
    service::ServiceContext,
    web,
};
use state::AppState;

/// Room for multipart framing on top of the image itself.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

pub fn create_app(
    service_context: Arc<ServiceContext>,
    settings: Arc<Settings>,
) -> Router {
    let app_state = AppState::new(service_context, settings.clone());

    Router::new()
        .route("/", get(handlers::root::root))

        .nest("/api", api_routes(app_state.clone()))
        .fallback(handlers::root::not_found)

        .with_state(app_state)

        // Uploaded files
        .merge(web::create_web_routes(&settings))

        // Middleware
        .layer(CompressionLayer::new())
        .layer(cors_layer(&settings))
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(settings: &Settings) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true);

    match settings.server.frontend_origin.parse::<HeaderValue>() {
        Ok(origin) => layer.allow_origin(origin),
        Err(_) => {
            tracing::warn!(
                "Invalid frontend origin {:?}; cross-origin requests will be refused",
                settings.server.frontend_origin
            );
            layer
        }
    }
}

fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::root::health_check))
        .nest("/auth", auth_routes(state.clone()))
        .nest("/admin", admin_routes(state.clone()))
        .nest("/alumni", alumni_routes(state.clone()))
        .nest("/student", student_routes(state.clone()))
        .merge(shared_routes(state))
}

/// Identity guard, then the role and approval gates for `policy`.
fn guarded(router: Router<AppState>, state: AppState, policy: AccessPolicy) -> Router<AppState> {
    router
        .route_layer(axum::middleware::from_fn_with_state(
            policy,
            middleware::auth::require_access,
        ))
        .route_layer(axum::middleware::from_fn_with_state(
            state,
            middleware::auth::require_auth,
        ))
}

fn auth_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login))
        .merge(Router::new()
            .route("/me", get(handlers::auth::me))
            .route_layer(axum::middleware::from_fn_with_state(
                state,
                middleware::auth::require_auth,
            ))
        )
}

fn admin_routes(state: AppState) -> Router<AppState> {
    let router = Router::new()
        .route("/dashboard", get(handlers::admin::dashboard))
        .route("/alumni", get(handlers::admin::list_alumni))
        .route("/alumni/:id/approve", put(handlers::admin::approve_alumni))
        .route(
            "/alumni/:id",
            put(handlers::admin::update_alumni).delete(handlers::admin::delete_alumni),
        )
        .route(
            "/events",
            get(handlers::events::list_all).post(handlers::events::create),
        )
        .route(
            "/events/:id",
            put(handlers::events::update).delete(handlers::events::delete),
        )
        .route(
            "/announcements",
            get(handlers::announcements::list_all).post(handlers::announcements::create),
        )
        .route(
            "/announcements/:id",
            put(handlers::announcements::update).delete(handlers::announcements::delete),
        )
        .route("/jobs", get(handlers::jobs::list_all))
        .route(
            "/jobs/:id",
            put(handlers::jobs::update).delete(handlers::jobs::delete),
        )
        .route("/export/csv", get(handlers::admin::export_csv))
        .route("/export/pdf", get(handlers::admin::export_pdf));

    guarded(router, state, AccessPolicy::ADMIN)
}

fn alumni_routes(state: AppState) -> Router<AppState> {
    let photo_limit = state.settings.uploads.max_file_bytes + MULTIPART_OVERHEAD;

    let router = Router::new()
        .route(
            "/profile",
            get(handlers::alumni::get_profile).put(handlers::alumni::update_profile),
        )
        .route(
            "/profile/photo",
            post(handlers::alumni::upload_photo).layer(DefaultBodyLimit::max(photo_limit)),
        )
        .route("/search", get(handlers::alumni::search))
        .route("/events", get(handlers::events::list))
        .route("/events/:id/register", post(handlers::events::register))
        .route("/events/:id/unregister", post(handlers::events::unregister))
        .route(
            "/jobs",
            get(handlers::jobs::list).post(handlers::jobs::create),
        )
        .route("/announcements", get(handlers::announcements::list));

    guarded(router, state, AccessPolicy::ALUMNI)
}

fn student_routes(state: AppState) -> Router<AppState> {
    let router = Router::new()
        .route("/alumni", get(handlers::student::list_alumni))
        .route("/alumni/:id", get(handlers::student::get_alumni))
        .route("/events", get(handlers::events::list))
        .route("/events/:id/register", post(handlers::events::register))
        .route("/events/:id/unregister", post(handlers::events::unregister))
        .route("/jobs", get(handlers::jobs::list))
        .route("/announcements", get(handlers::announcements::list));

    guarded(router, state, AccessPolicy::STUDENT)
}

/// Read routes open to every role, plus job applications.
fn shared_routes(state: AppState) -> Router<AppState> {
    let router = Router::new()
        .route("/events", get(handlers::events::list))
        .route("/events/:id", get(handlers::events::get))
        .route("/jobs", get(handlers::jobs::list))
        .route("/jobs/:id", get(handlers::jobs::get))
        .route("/jobs/:id/apply", post(handlers::jobs::apply))
        .route("/jobs/:id/applications", get(handlers::jobs::applications))
        .route(
            "/jobs/:id/applications/:user_id",
            put(handlers::jobs::set_application_status),
        )
        .route("/announcements", get(handlers::announcements::list))
        .route("/announcements/:id", get(handlers::announcements::get));

    guarded(router, state, AccessPolicy::ANY_ROLE)
}

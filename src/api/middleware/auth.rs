use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

use crate::{
    api::state::AppState,
    auth::{gate, AccessPolicy},
    domain::User,
    error::AppError,
    repository::UserRepository,
};

#[derive(Clone)]
pub struct CurrentUser {
    pub user: User,
}

fn bearer_token(request: &Request) -> Option<&str> {
    request
        .headers()
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Resolves the bearer token to a live, active user.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(&request).ok_or_else(|| {
        AppError::Unauthenticated("No token provided. Access denied.".to_string())
    })?;

    let claims = state.service_context.auth_service.verify_token(token)?;

    // The account may have been deleted or deactivated since the token was issued.
    let user = state
        .service_context
        .user_repo
        .find_by_id(claims.user_id()?)
        .await?
        .ok_or(AppError::UserNotFound)?;

    if !user.is_active {
        return Err(AppError::AccountDisabled);
    }

    request.extensions_mut().insert(CurrentUser { user });

    Ok(next.run(request).await)
}

/// Role gate then approval gate. Must run inside `require_auth`.
pub async fn require_access(
    State(policy): State<AccessPolicy>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let current = request
        .extensions()
        .get::<CurrentUser>()
        .ok_or_else(|| AppError::Unauthenticated("No token provided. Access denied.".to_string()))?;

    gate::check_access(&current.user, policy)?;

    Ok(next.run(request).await)
}

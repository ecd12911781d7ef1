use axum::{
    extract::{Extension, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

use crate::{
    api::{middleware::auth::CurrentUser, state::AppState},
    domain::{LoginRequest, RegisterRequest},
    error::Result,
    service::account_service::WhoAmI,
};

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<Value>)> {
    let response = state.service_context.account_service.register(req).await?;
    let message = if response.user.is_approved {
        "User registered successfully"
    } else {
        "Registration successful. Your account is pending admin approval."
    };

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": message,
            "token": response.token,
            "user": response.user,
        })),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<Value>> {
    let response = state.service_context.account_service.login(req).await?;

    Ok(Json(json!({
        "message": "Login successful",
        "token": response.token,
        "user": response.user,
    })))
}

/// Identity only; pending alumni can still see their own status here.
pub async fn me(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<WhoAmI>> {
    let who = state.service_context.account_service.me(&current.user).await?;
    Ok(Json(who))
}

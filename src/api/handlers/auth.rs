use axum::{
    extract::{Extension, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::CookieJar;
use serde::{Deserialize, Serialize};

use crate::{
    api::{middleware::auth::CurrentUser, state::AppState},
    auth::{AuthService, SESSION_COOKIE},
    domain::{RegisterRequest, User},
    error::Result,
    service::user_service::ChangePasswordRequest,
};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: String,
    pub user: User,
}

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<User>)> {
    let user = state.service_context.user_service.register(req).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> Result<(CookieJar, Json<LoginResponse>)> {
    let user = state.service_context.user_service
        .authenticate(&req.email, &req.password)
        .await?;

    let (_session, token) = state.service_context.auth_service
        .create_session(user.id)
        .await?;

    let cookie = state.service_context.auth_service
        .create_session_cookie(&token, state.settings.server.secure_cookies);

    tracing::info!("User {} signed in", user.id);

    Ok((
        jar.add(cookie),
        Json(LoginResponse {
            message: "Login successful".to_string(),
            user,
        }),
    ))
}

pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, StatusCode)> {
    if let Some(session_cookie) = jar.get(SESSION_COOKIE) {
        if let Err(e) = state.service_context.auth_service
            .invalidate_session(session_cookie.value())
            .await
        {
            tracing::warn!("Failed to invalidate session on logout: {}", e);
        }
    }

    let jar = jar.add(AuthService::create_logout_cookie());

    Ok((jar, StatusCode::NO_CONTENT))
}

pub async fn me(Extension(current): Extension<CurrentUser>) -> Json<User> {
    Json(current.user)
}

/// Changing the password signs out every other session of the user.
pub async fn change_password(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(req): Json<ChangePasswordRequest>,
) -> Result<StatusCode> {
    state.service_context.user_service
        .change_password(current.user.id, req)
        .await?;

    state.service_context.auth_service
        .invalidate_other_sessions(current.user.id, &current.session_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::CookieJar;

use crate::{
    api::state::AppState,
    auth::SESSION_COOKIE,
    domain::User,
    error::{AppError, Result},
    repository::UserRepository,
};

/// The signed-in user, inserted into request extensions by the auth layers.
#[derive(Clone)]
pub struct CurrentUser {
    pub user: User,
    pub session_id: String,
}

async fn resolve_user(state: &AppState, jar: &CookieJar) -> Result<CurrentUser> {
    let session_cookie = jar
        .get(SESSION_COOKIE)
        .ok_or(AppError::Unauthorized)?;

    let session = state.service_context.auth_service
        .validate_session(session_cookie.value())
        .await?
        .ok_or(AppError::Unauthorized)?;

    let user = state.service_context.user_repo
        .find_by_id(session.user_id)
        .await?
        .ok_or(AppError::Unauthorized)?;

    // Deactivated accounts lose access immediately
    if !user.is_active {
        return Err(AppError::Unauthorized);
    }

    Ok(CurrentUser {
        user,
        session_id: session.id,
    })
}

pub async fn require_auth(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response> {
    let current = resolve_user(&state, &jar).await?;
    request.extensions_mut().insert(current);

    Ok(next.run(request).await)
}

pub async fn require_admin(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response> {
    let current = resolve_user(&state, &jar).await?;

    if !current.user.is_admin() {
        tracing::warn!("User {} attempted to reach an admin route", current.user.id);
        return Err(AppError::Forbidden);
    }

    request.extensions_mut().insert(current);

    Ok(next.run(request).await)
}

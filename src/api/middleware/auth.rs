use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

use crate::{
    api::state::AppState,
    auth,
    domain::User,
    error::AppError,
};

#[derive(Clone)]
pub struct CurrentUser {
    pub user: User,
}

fn token_from_request(request: &Request) -> Option<String> {
    request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(auth::bearer_token)
        .map(str::to_string)
}

pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = token_from_request(&request).ok_or(AppError::Unauthorized)?;

    let auth_service = &state.service_context.auth_service;

    let session = auth_service
        .validate_session(&token)
        .await?
        .ok_or(AppError::Unauthorized)?;

    let user = state.service_context.user_repo
        .find_by_id(session.user_id)
        .await?
        .ok_or(AppError::Unauthorized)?;

    // Insert current user into request extensions
    request.extensions_mut().insert(CurrentUser { user });

    Ok(next.run(request).await)
}

pub async fn require_admin(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = token_from_request(&request).ok_or(AppError::Unauthorized)?;

    let auth_service = &state.service_context.auth_service;

    let session = auth_service
        .validate_session(&token)
        .await?
        .ok_or(AppError::Unauthorized)?;

    let user = state.service_context.user_repo
        .find_by_id(session.user_id)
        .await?
        .ok_or(AppError::Unauthorized)?;

    if !state.service_context.role_policy.is_admin(user.id).await? {
        return Err(AppError::Forbidden);
    }

    request.extensions_mut().insert(CurrentUser { user });

    Ok(next.run(request).await)
}

/// Attaches the current user when a valid bearer token is present, and
/// lets the request through either way. Used by guest-friendly routes
/// like checkout and course detail.
pub async fn optional_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    if let Some(token) = token_from_request(&request) {
        let auth_service = &state.service_context.auth_service;

        if let Ok(Some(session)) = auth_service.validate_session(&token).await {
            if let Ok(Some(user)) = state.service_context.user_repo.find_by_id(session.user_id).await {
                request.extensions_mut().insert(CurrentUser { user });
            }
        }
    }

    next.run(request).await
}

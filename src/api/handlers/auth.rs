use axum::{
    extract::{Extension, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    Json,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    api::{middleware::auth::CurrentUser, state::AppState},
    auth,
    domain::{CreateUserRequest, User},
    error::{AppError, Result},
};

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    #[validate(length(min = 1, message = "Full name is required"))]
    pub full_name: String,
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>)> {
    req.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    if state.service_context.user_repo.find_by_email(&req.email).await?.is_some() {
        return Err(AppError::Conflict("Email already registered".to_string()));
    }

    let password_hash = auth::AuthService::hash_password(&req.password).await?;

    let user = state.service_context.user_repo
        .create(CreateUserRequest {
            email: req.email,
            phone: req.phone,
            full_name: req.full_name,
            password_hash,
        })
        .await?;

    let (_session, token) = state.service_context.auth_service
        .create_session(user.id, state.settings.auth.session_duration_hours)
        .await?;

    Ok((StatusCode::CREATED, Json(AuthResponse { token, user })))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>> {
    // Get password hash from database
    let password_hash = auth::get_password_hash(&state.service_context.db_pool, &req.email)
        .await?
        .ok_or(AppError::Unauthorized)?;

    // Verify password
    if !auth::AuthService::verify_password(&req.password, &password_hash).await? {
        return Err(AppError::Unauthorized);
    }

    let user = auth::get_user_by_email(&state.service_context.db_pool, &req.email)
        .await?
        .ok_or(AppError::Unauthorized)?;

    let (_session, token) = state.service_context.auth_service
        .create_session(user.id, state.settings.auth.session_duration_hours)
        .await?;

    Ok(Json(AuthResponse { token, user }))
}

pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<StatusCode> {
    if let Some(token) = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(auth::bearer_token)
    {
        let _ = state.service_context.auth_service
            .invalidate_session(token)
            .await;
    }

    Ok(StatusCode::NO_CONTENT)
}

pub async fn me(
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<User>> {
    Ok(Json(current.user))
}

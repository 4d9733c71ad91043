use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::{
    api::state::AppState,
    error::{AppError, Result},
    integrations::{normalize_local_phone, to_international},
};

#[derive(Debug, Deserialize)]
pub struct SendSmsRequest {
    pub phone: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct SendSmsResponse {
    pub success: bool,
    pub message: String,
}

/// Generic admin SMS send: announcements, support follow-ups. Gateway
/// failure is propagated, same policy as OTP dispatch.
pub async fn send(
    State(state): State<AppState>,
    Json(req): Json<SendSmsRequest>,
) -> Result<Json<SendSmsResponse>> {
    if req.message.trim().is_empty() {
        return Err(AppError::Validation("message is required".to_string()));
    }

    let local = normalize_local_phone(&req.phone)?;

    state.service_context.sms_gateway
        .send(&to_international(&local), &req.message)
        .await?;

    Ok(Json(SendSmsResponse {
        success: true,
        message: "SMS sent".to_string(),
    }))
}

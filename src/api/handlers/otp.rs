use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    api::state::AppState,
    error::{AppError, Result},
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct SendOtpRequest {
    pub phone: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct VerifyOtpRequest {
    pub phone: String,
    pub code: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OtpResponse {
    pub success: bool,
    pub message: String,
}

/// Issue a 6-digit code to the phone, replacing any previous one. The
/// response only claims success when the SMS actually went out.
#[utoipa::path(
    post,
    path = "/api/otp/send",
    request_body = SendOtpRequest,
    responses(
        (status = 200, body = OtpResponse),
        (status = 400, description = "Malformed phone number"),
        (status = 502, description = "SMS gateway failure")
    )
)]
pub async fn send(
    State(state): State<AppState>,
    Json(req): Json<SendOtpRequest>,
) -> Result<Json<OtpResponse>> {
    if req.phone.trim().is_empty() {
        return Err(AppError::Validation("phone is required".to_string()));
    }

    state.service_context.otp_service.send_otp(&req.phone).await?;

    Ok(Json(OtpResponse {
        success: true,
        message: "Verification code sent".to_string(),
    }))
}

/// Check a submitted code; a correct one is consumed.
#[utoipa::path(
    post,
    path = "/api/otp/verify",
    request_body = VerifyOtpRequest,
    responses(
        (status = 200, body = OtpResponse),
        (status = 400, description = "Missing, expired, or incorrect code")
    )
)]
pub async fn verify(
    State(state): State<AppState>,
    Json(req): Json<VerifyOtpRequest>,
) -> Result<Json<OtpResponse>> {
    if req.code.trim().is_empty() {
        return Err(AppError::Validation("code is required".to_string()));
    }

    state.service_context.otp_service
        .verify_otp(&req.phone, &req.code)
        .await?;

    Ok(Json(OtpResponse {
        success: true,
        message: "Phone number verified".to_string(),
    }))
}

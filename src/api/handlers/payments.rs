use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    api::{middleware::auth::CurrentUser, state::AppState},
    domain::{
        BillingInfo, Payment, PaymentMethod, PaymentStatus, SubmitPaymentRequest, VerifyAction,
    },
    error::{AppError, Result},
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SubmitPaymentDto {
    pub course_id: Uuid,
    pub amount: i64,
    pub payment_method: PaymentMethod,
    #[validate(length(min = 4, message = "transaction_id is required"))]
    pub transaction_id: String,
    #[validate(length(min = 10, message = "phone_number is required"))]
    pub phone_number: String,
    pub billing_info: Option<BillingInfo>,
    pub coupon_code: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SubmitPaymentResponse {
    pub success: bool,
    pub message: String,
    pub payment_id: Uuid,
}

/// Mobile-money checkout. The buyer has already sent money to one of the
/// published wallet numbers; this records their claim for admin review.
/// Works with or without a bearer token (guest checkout).
#[utoipa::path(
    post,
    path = "/api/payments",
    request_body = SubmitPaymentDto,
    responses(
        (status = 200, body = SubmitPaymentResponse),
        (status = 400, description = "Missing fields, guest without billing details, or already enrolled"),
        (status = 404, description = "Unknown course")
    )
)]
pub async fn submit(
    State(state): State<AppState>,
    current: Option<Extension<CurrentUser>>,
    Json(dto): Json<SubmitPaymentDto>,
) -> Result<Json<SubmitPaymentResponse>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let user_id = current.as_ref().map(|Extension(c)| c.user.id);

    let payment = state.service_context.payment_service
        .submit(SubmitPaymentRequest {
            course_id: dto.course_id,
            user_id,
            amount: dto.amount,
            payment_method: dto.payment_method,
            transaction_id: dto.transaction_id,
            phone_number: dto.phone_number,
            billing_info: dto.billing_info,
            coupon_code: dto.coupon_code,
        })
        .await?;

    Ok(Json(SubmitPaymentResponse {
        success: true,
        message: "Payment submitted. You will be enrolled once it is verified.".to_string(),
        payment_id: payment.id,
    }))
}

/// Wallet numbers to show on the checkout page.
#[utoipa::path(get, path = "/api/payments/methods", responses((status = 200)))]
pub async fn methods(State(state): State<AppState>) -> Json<serde_json::Value> {
    let payments = &state.settings.payments;

    Json(json!({
        "bkash": payments.bkash_number,
        "nagad": payments.nagad_number,
        "rocket": payments.rocket_number,
        "moynapay": payments.moynapay_number,
    }))
}

pub async fn my_payments(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<Vec<Payment>>> {
    let payments = state.service_context.payment_repo
        .list_by_user(current.user.id)
        .await?;

    Ok(Json(payments))
}

#[derive(Debug, Deserialize)]
pub struct AdminListParams {
    #[serde(default = "default_status")]
    pub status: PaymentStatus,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_status() -> PaymentStatus {
    PaymentStatus::Pending
}

fn default_limit() -> i64 {
    50
}

pub async fn admin_list(
    State(state): State<AppState>,
    Query(params): Query<AdminListParams>,
) -> Result<Json<Vec<Payment>>> {
    let payments = state.service_context.payment_repo
        .list_by_status(params.status, params.limit, params.offset)
        .await?;

    Ok(Json(payments))
}

#[derive(Debug, Deserialize)]
pub struct VerifyPaymentDto {
    pub payment_id: Uuid,
    pub action: VerifyAction,
    pub admin_notes: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct VerifyPaymentResponse {
    pub success: bool,
    pub message: String,
}

/// Approve or reject a pending payment. One-way: a resolved payment
/// cannot be resolved again.
pub async fn verify(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(dto): Json<VerifyPaymentDto>,
) -> Result<Json<VerifyPaymentResponse>> {
    let payment = state.service_context.payment_service
        .verify(dto.payment_id, dto.action, dto.admin_notes, current.user.id)
        .await?;

    let message = match payment.status {
        PaymentStatus::Completed => "Payment approved and student enrolled".to_string(),
        PaymentStatus::Failed => "Payment rejected".to_string(),
        PaymentStatus::Pending => "Payment is still pending".to_string(),
    };

    Ok(Json(VerifyPaymentResponse {
        success: true,
        message,
    }))
}

pub async fn admin_get(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<(StatusCode, Json<Payment>)> {
    let payment = state.service_context.payment_repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Payment not found".to_string()))?;

    Ok((StatusCode::OK, Json(payment)))
}

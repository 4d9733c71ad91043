use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    api::state::AppState,
    domain::{CouponCode, CouponDiscount, CreateCouponRequest, DiscountType, UpdateCouponRequest},
    error::{AppError, Result},
};

use super::courses::ListParams;

#[derive(Debug, Deserialize, ToSchema)]
pub struct ValidateCouponRequest {
    pub code: String,
    pub course_id: Uuid,
    pub amount: i64,
}

/// Check a coupon against a course and purchase amount. Read-only; the
/// use counter only moves when a payment carrying the coupon is
/// approved.
#[utoipa::path(
    post,
    path = "/api/coupons/validate",
    request_body = ValidateCouponRequest,
    responses(
        (status = 200, body = CouponDiscount),
        (status = 400, description = "Unknown, exhausted, expired, or inapplicable code")
    )
)]
pub async fn validate(
    State(state): State<AppState>,
    Json(req): Json<ValidateCouponRequest>,
) -> Result<Json<CouponDiscount>> {
    if req.code.trim().is_empty() {
        return Err(AppError::Validation("code is required".to_string()));
    }

    let discount = state.service_context.coupon_service
        .validate(&req.code, req.course_id, req.amount)
        .await?;

    Ok(Json(discount))
}

pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<CouponCode>>> {
    let coupons = state.service_context.coupon_repo
        .list(params.limit, params.offset)
        .await?;

    Ok(Json(coupons))
}

pub async fn create(
    State(state): State<AppState>,
    Json(req): Json<CreateCouponRequest>,
) -> Result<(StatusCode, Json<CouponCode>)> {
    if req.code.trim().is_empty() {
        return Err(AppError::Validation("code is required".to_string()));
    }
    match req.discount_type {
        DiscountType::Percentage if !(1..=100).contains(&req.discount_value) => {
            return Err(AppError::Validation(
                "Percentage discount must be between 1 and 100".to_string(),
            ));
        }
        DiscountType::Fixed if req.discount_value <= 0 => {
            return Err(AppError::Validation("Fixed discount must be positive".to_string()));
        }
        _ => {}
    }

    // Codes are unique even across deactivated coupons.
    if state.service_context.coupon_repo
        .find_by_code(&req.code)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict("A coupon with this code already exists".to_string()));
    }

    let coupon = state.service_context.coupon_repo.create(req).await?;

    Ok((StatusCode::CREATED, Json(coupon)))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateCouponRequest>,
) -> Result<Json<CouponCode>> {
    state.service_context.coupon_repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Coupon not found".to_string()))?;

    let coupon = state.service_context.coupon_repo.update(id, req).await?;

    Ok(Json(coupon))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    state.service_context.coupon_repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Coupon not found".to_string()))?;

    state.service_context.coupon_repo.delete(id).await?;

    Ok(StatusCode::NO_CONTENT)
}

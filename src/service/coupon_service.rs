use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::{
    domain::{CouponDiscount, DiscountType},
    error::{AppError, Result},
    repository::CouponRepository,
};

pub struct CouponService {
    repo: Arc<dyn CouponRepository>,
}

impl CouponService {
    pub fn new(repo: Arc<dyn CouponRepository>) -> Self {
        Self { repo }
    }

    /// Decide whether `code` applies to a purchase of `amount` BDT for
    /// `course_id`, and compute the discount. Read-only: redemption
    /// accounting happens when the payment is approved, not here.
    pub async fn validate(&self, code: &str, course_id: Uuid, amount: i64) -> Result<CouponDiscount> {
        let coupon = self
            .repo
            .find_active_by_code(code)
            .await?
            .ok_or_else(|| AppError::BadRequest("Invalid coupon code".to_string()))?;

        if let Some(scoped_course) = coupon.course_id {
            if scoped_course != course_id {
                return Err(AppError::BadRequest(
                    "This coupon is not valid for this course".to_string(),
                ));
            }
        }

        if let Some(max_uses) = coupon.max_uses {
            if coupon.used_count >= max_uses {
                return Err(AppError::BadRequest(
                    "This coupon has reached its usage limit".to_string(),
                ));
            }
        }

        let now = Utc::now();
        if now < coupon.valid_from {
            return Err(AppError::BadRequest("This coupon is not active yet".to_string()));
        }
        if let Some(valid_until) = coupon.valid_until {
            if now > valid_until {
                return Err(AppError::BadRequest("This coupon has expired".to_string()));
            }
        }

        if amount < coupon.min_purchase_amount {
            return Err(AppError::BadRequest(format!(
                "This coupon requires a minimum purchase of {} BDT",
                coupon.min_purchase_amount
            )));
        }

        let discount_amount = match coupon.discount_type {
            DiscountType::Percentage => amount * coupon.discount_value / 100,
            DiscountType::Fixed => coupon.discount_value,
        }
        // A discount can never exceed what is being paid.
        .min(amount)
        .max(0);

        Ok(CouponDiscount {
            coupon,
            discount_amount,
        })
    }
}

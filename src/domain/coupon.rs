use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CouponCode {
    pub id: Uuid,
    /// Stored uppercase; lookups are case-insensitive.
    pub code: String,
    pub discount_type: DiscountType,
    /// Percent (0-100) for `Percentage`, whole BDT for `Fixed`.
    pub discount_value: i64,
    pub max_uses: Option<i64>,
    pub used_count: i64,
    pub min_purchase_amount: i64,
    pub valid_from: DateTime<Utc>,
    pub valid_until: Option<DateTime<Utc>>,
    pub is_active: bool,
    /// When set, the coupon only applies to this course.
    pub course_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DiscountType {
    Percentage,
    Fixed,
}

/// Outcome of a successful validation: the coupon plus the discount it
/// grants on the submitted amount. Never exceeds the amount itself.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CouponDiscount {
    pub coupon: CouponCode,
    pub discount_amount: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateCouponRequest {
    pub code: String,
    pub discount_type: DiscountType,
    pub discount_value: i64,
    pub max_uses: Option<i64>,
    #[serde(default)]
    pub min_purchase_amount: i64,
    pub valid_from: Option<DateTime<Utc>>,
    pub valid_until: Option<DateTime<Utc>>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    pub course_id: Option<Uuid>,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct UpdateCouponRequest {
    pub discount_type: Option<DiscountType>,
    pub discount_value: Option<i64>,
    pub max_uses: Option<i64>,
    pub min_purchase_amount: Option<i64>,
    pub valid_from: Option<DateTime<Utc>>,
    pub valid_until: Option<DateTime<Utc>>,
    pub is_active: Option<bool>,
    pub course_id: Option<Uuid>,
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    pub id: Uuid,
    pub course_id: Uuid,
    /// None for guest checkout.
    pub user_id: Option<Uuid>,
    /// Whole BDT, as claimed by the buyer and verified by a human admin.
    pub amount: i64,
    pub payment_method: PaymentMethod,
    /// Wallet transaction reference the buyer pasted in. Trusted at face
    /// value until an admin reviews it.
    pub transaction_id: String,
    pub status: PaymentStatus,
    pub coupon_code: Option<String>,
    pub billing_info: Option<BillingInfo>,
    /// Free-form audit log: submitter phone, guest flag, and after
    /// resolution the verifier id/time, action, and admin notes.
    pub gateway_response: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Bkash,
    Nagad,
    Rocket,
    Moynapay,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BillingInfo {
    pub full_name: String,
    pub email: String,
    pub address: Option<String>,
    pub city: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum VerifyAction {
    Approve,
    Reject,
}

#[derive(Debug, Clone)]
pub struct SubmitPaymentRequest {
    pub course_id: Uuid,
    pub user_id: Option<Uuid>,
    pub amount: i64,
    pub payment_method: PaymentMethod,
    pub transaction_id: String,
    pub phone_number: String,
    pub billing_info: Option<BillingInfo>,
    pub coupon_code: Option<String>,
}

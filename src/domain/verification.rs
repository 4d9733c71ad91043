use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A live one-time code for a phone number. At most one row per phone;
/// issuing a new code replaces the old one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhoneVerification {
    pub id: Uuid,
    /// Normalized local form (01XXXXXXXXX).
    pub phone: String,
    pub otp_code: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

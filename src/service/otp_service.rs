use std::sync::Arc;

use chrono::{Duration, Utc};
use rand::Rng;

use crate::{
    error::{AppError, Result},
    integrations::{sms::normalize_local_phone, sms::to_international, SmsGateway},
    repository::VerificationRepository,
};

/// Codes live this long before a fresh send is required.
const OTP_TTL_MINUTES: i64 = 5;

pub struct OtpService {
    verification_repo: Arc<dyn VerificationRepository>,
    sms: Arc<dyn SmsGateway>,
}

impl OtpService {
    pub fn new(verification_repo: Arc<dyn VerificationRepository>, sms: Arc<dyn SmsGateway>) -> Self {
        Self {
            verification_repo,
            sms,
        }
    }

    /// Issue and dispatch a fresh code for the phone, replacing any prior
    /// one. Gateway failure is an error: the caller is never told a code
    /// was sent when it was not.
    pub async fn send_otp(&self, phone: &str) -> Result<()> {
        let local = normalize_local_phone(phone)?;

        let code = generate_code();
        let expires_at = Utc::now() + Duration::minutes(OTP_TTL_MINUTES);

        self.verification_repo.upsert(&local, &code, expires_at).await?;

        let message = format!(
            "Your Pathshala verification code is {}. It expires in {} minutes.",
            code, OTP_TTL_MINUTES
        );
        self.sms.send(&to_international(&local), &message).await?;

        tracing::info!(phone = %local, "OTP dispatched");

        Ok(())
    }

    /// Check a submitted code. A correct code is consumed; wrong or
    /// expired codes leave the row alone so the user can retry until the
    /// TTL runs out.
    pub async fn verify_otp(&self, phone: &str, code: &str) -> Result<()> {
        let local = normalize_local_phone(phone)?;

        let verification = self
            .verification_repo
            .find_by_phone(&local)
            .await?
            .ok_or_else(|| AppError::BadRequest("No verification code found".to_string()))?;

        if Utc::now() > verification.expires_at {
            self.verification_repo.delete_by_phone(&local).await?;
            return Err(AppError::BadRequest("Verification code has expired".to_string()));
        }

        if verification.otp_code != code.trim() {
            return Err(AppError::BadRequest("Incorrect verification code".to_string()));
        }

        self.verification_repo.delete_by_phone(&local).await?;

        Ok(())
    }
}

/// Uniformly random six digits, leading zeros included.
fn generate_code() -> String {
    let n: u32 = rand::thread_rng().gen_range(0..1_000_000);
    format!("{:06}", n)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_six_digits() {
        for _ in 0..100 {
            let code = generate_code();
            assert_eq!(code.len(), 6);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }
}

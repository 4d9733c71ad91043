use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::{
    domain::PhoneVerification,
    error::{AppError, Result},
    repository::VerificationRepository,
};

#[derive(FromRow)]
struct VerificationRow {
    id: String,
    phone: String,
    otp_code: String,
    expires_at: NaiveDateTime,
    created_at: NaiveDateTime,
}

pub struct SqliteVerificationRepository {
    pool: SqlitePool,
}

impl SqliteVerificationRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_verification(row: VerificationRow) -> Result<PhoneVerification> {
        Ok(PhoneVerification {
            id: Uuid::parse_str(&row.id).map_err(|e| AppError::Database(e.to_string()))?,
            phone: row.phone,
            otp_code: row.otp_code,
            expires_at: DateTime::from_naive_utc_and_offset(row.expires_at, Utc),
            created_at: DateTime::from_naive_utc_and_offset(row.created_at, Utc),
        })
    }
}

#[async_trait]
impl VerificationRepository for SqliteVerificationRepository {
    async fn upsert(&self, phone: &str, otp_code: &str, expires_at: DateTime<Utc>) -> Result<PhoneVerification> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().naive_utc();
        let expires_at_naive = expires_at.naive_utc();

        // UNIQUE(phone) + upsert replaces the delete-then-insert pair,
        // so concurrent sends can never leave two live codes.
        sqlx::query(
            r#"
            INSERT INTO phone_verifications (id, phone, otp_code, expires_at, created_at)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(phone) DO UPDATE SET
                otp_code = excluded.otp_code,
                expires_at = excluded.expires_at,
                created_at = excluded.created_at
            "#
        )
        .bind(&id)
        .bind(phone)
        .bind(otp_code)
        .bind(expires_at_naive)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        self.find_by_phone(phone).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve stored verification".to_string())
        })
    }

    async fn find_by_phone(&self, phone: &str) -> Result<Option<PhoneVerification>> {
        let row = sqlx::query_as::<_, VerificationRow>(
            "SELECT id, phone, otp_code, expires_at, created_at \
             FROM phone_verifications WHERE phone = ?"
        )
        .bind(phone)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        match row {
            Some(r) => Ok(Some(Self::row_to_verification(r)?)),
            None => Ok(None),
        }
    }

    async fn delete_by_phone(&self, phone: &str) -> Result<()> {
        sqlx::query("DELETE FROM phone_verifications WHERE phone = ?")
            .bind(phone)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }

    async fn delete_expired(&self) -> Result<u64> {
        let now = Utc::now().naive_utc();
        let result = sqlx::query("DELETE FROM phone_verifications WHERE expires_at <= ?")
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected())
    }
}

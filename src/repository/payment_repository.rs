use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::{
    domain::{BillingInfo, Payment, PaymentMethod, PaymentStatus},
    error::{AppError, Result},
    repository::PaymentRepository,
};

#[derive(FromRow)]
struct PaymentRow {
    id: String,
    course_id: String,
    user_id: Option<String>,
    amount: i64,
    payment_method: String,
    transaction_id: String,
    status: String,
    coupon_code: Option<String>,
    billing_info: Option<String>,
    gateway_response: String,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

pub struct SqlitePaymentRepository {
    pool: SqlitePool,
}

const PAYMENT_COLUMNS: &str = "id, course_id, user_id, amount, payment_method, transaction_id, \
     status, coupon_code, billing_info, gateway_response, created_at, updated_at";

impl SqlitePaymentRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_payment(row: PaymentRow) -> Result<Payment> {
        let billing_info: Option<BillingInfo> = row
            .billing_info
            .as_deref()
            .map(serde_json::from_str)
            .transpose()
            .map_err(|e| AppError::Database(e.to_string()))?;

        let gateway_response: serde_json::Value = serde_json::from_str(&row.gateway_response)
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(Payment {
            id: Uuid::parse_str(&row.id).map_err(|e| AppError::Database(e.to_string()))?,
            course_id: Uuid::parse_str(&row.course_id).map_err(|e| AppError::Database(e.to_string()))?,
            user_id: row
                .user_id
                .as_deref()
                .map(Uuid::parse_str)
                .transpose()
                .map_err(|e| AppError::Database(e.to_string()))?,
            amount: row.amount,
            payment_method: parse_payment_method(&row.payment_method)?,
            transaction_id: row.transaction_id,
            status: parse_payment_status(&row.status)?,
            coupon_code: row.coupon_code,
            billing_info,
            gateway_response,
            created_at: DateTime::from_naive_utc_and_offset(row.created_at, Utc),
            updated_at: DateTime::from_naive_utc_and_offset(row.updated_at, Utc),
        })
    }
}

pub(crate) fn parse_payment_status(s: &str) -> Result<PaymentStatus> {
    match s {
        "Pending" => Ok(PaymentStatus::Pending),
        "Completed" => Ok(PaymentStatus::Completed),
        "Failed" => Ok(PaymentStatus::Failed),
        _ => Err(AppError::Database(format!("Invalid payment status: {}", s))),
    }
}

pub(crate) fn payment_status_to_str(status: &PaymentStatus) -> &'static str {
    match status {
        PaymentStatus::Pending => "Pending",
        PaymentStatus::Completed => "Completed",
        PaymentStatus::Failed => "Failed",
    }
}

pub(crate) fn parse_payment_method(s: &str) -> Result<PaymentMethod> {
    match s {
        "Bkash" => Ok(PaymentMethod::Bkash),
        "Nagad" => Ok(PaymentMethod::Nagad),
        "Rocket" => Ok(PaymentMethod::Rocket),
        "Moynapay" => Ok(PaymentMethod::Moynapay),
        _ => Err(AppError::Database(format!("Invalid payment method: {}", s))),
    }
}

pub(crate) fn payment_method_to_str(method: &PaymentMethod) -> &'static str {
    match method {
        PaymentMethod::Bkash => "Bkash",
        PaymentMethod::Nagad => "Nagad",
        PaymentMethod::Rocket => "Rocket",
        PaymentMethod::Moynapay => "Moynapay",
    }
}

#[async_trait]
impl PaymentRepository for SqlitePaymentRepository {
    async fn create(&self, payment: Payment) -> Result<Payment> {
        let id_str = payment.id.to_string();
        let course_id_str = payment.course_id.to_string();
        let user_id_str = payment.user_id.map(|u| u.to_string());
        let method_str = payment_method_to_str(&payment.payment_method);
        let status_str = payment_status_to_str(&payment.status);
        let billing_info_json = payment
            .billing_info
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| AppError::Internal(e.to_string()))?;
        let gateway_response_json = serde_json::to_string(&payment.gateway_response)
            .map_err(|e| AppError::Internal(e.to_string()))?;
        let now = Utc::now().naive_utc();

        sqlx::query(
            r#"
            INSERT INTO payments (
                id, course_id, user_id, amount, payment_method, transaction_id,
                status, coupon_code, billing_info, gateway_response,
                created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#
        )
        .bind(&id_str)
        .bind(&course_id_str)
        .bind(&user_id_str)
        .bind(payment.amount)
        .bind(method_str)
        .bind(&payment.transaction_id)
        .bind(status_str)
        .bind(&payment.coupon_code)
        .bind(&billing_info_json)
        .bind(&gateway_response_json)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        self.find_by_id(payment.id).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve created payment".to_string())
        })
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Payment>> {
        let id_str = id.to_string();
        let row = sqlx::query_as::<_, PaymentRow>(
            &format!("SELECT {PAYMENT_COLUMNS} FROM payments WHERE id = ?")
        )
        .bind(id_str)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        match row {
            Some(r) => Ok(Some(Self::row_to_payment(r)?)),
            None => Ok(None),
        }
    }

    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Payment>> {
        let user_id_str = user_id.to_string();
        let rows = sqlx::query_as::<_, PaymentRow>(
            &format!(
                "SELECT {PAYMENT_COLUMNS} FROM payments \
                 WHERE user_id = ? ORDER BY created_at DESC"
            )
        )
        .bind(user_id_str)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter().map(Self::row_to_payment).collect()
    }

    async fn list_by_status(&self, status: PaymentStatus, limit: i64, offset: i64) -> Result<Vec<Payment>> {
        let status_str = payment_status_to_str(&status);
        let rows = sqlx::query_as::<_, PaymentRow>(
            &format!(
                "SELECT {PAYMENT_COLUMNS} FROM payments \
                 WHERE status = ? ORDER BY created_at DESC LIMIT ? OFFSET ?"
            )
        )
        .bind(status_str)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter().map(Self::row_to_payment).collect()
    }

    async fn count_by_status(&self, status: PaymentStatus) -> Result<i64> {
        let status_str = payment_status_to_str(&status);
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM payments WHERE status = ?"
        )
        .bind(status_str)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(count)
    }

    async fn completed_revenue(&self) -> Result<i64> {
        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COALESCE(SUM(amount), 0) FROM payments WHERE status = 'Completed'"
        )
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(total)
    }
}

use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::{
    domain::{Payment, PaymentStatus, SubmitPaymentRequest, VerifyAction},
    error::{AppError, Result},
    integrations::sms::normalize_local_phone,
    repository::{
        payment_repository::payment_status_to_str, CourseRepository, EnrollmentRepository,
        NotificationRepository, PaymentRepository,
    },
    service::coupon_service::CouponService,
};

pub struct PaymentService {
    pool: SqlitePool,
    course_repo: Arc<dyn CourseRepository>,
    enrollment_repo: Arc<dyn EnrollmentRepository>,
    payment_repo: Arc<dyn PaymentRepository>,
    notification_repo: Arc<dyn NotificationRepository>,
    coupon_service: Arc<CouponService>,
}

impl PaymentService {
    pub fn new(
        pool: SqlitePool,
        course_repo: Arc<dyn CourseRepository>,
        enrollment_repo: Arc<dyn EnrollmentRepository>,
        payment_repo: Arc<dyn PaymentRepository>,
        notification_repo: Arc<dyn NotificationRepository>,
        coupon_service: Arc<CouponService>,
    ) -> Self {
        Self {
            pool,
            course_repo,
            enrollment_repo,
            payment_repo,
            notification_repo,
            coupon_service,
        }
    }

    /// Record a buyer's claim of a mobile-money transfer. The transaction
    /// reference is taken at face value; an admin resolves it later.
    pub async fn submit(&self, request: SubmitPaymentRequest) -> Result<Payment> {
        if request.transaction_id.trim().is_empty() {
            return Err(AppError::Validation("transaction_id is required".to_string()));
        }
        if request.amount <= 0 {
            return Err(AppError::Validation("amount must be positive".to_string()));
        }

        let phone = normalize_local_phone(&request.phone_number)?;

        // Guest checkout still needs someone to attach the purchase to.
        if request.user_id.is_none() {
            let billing_ok = request
                .billing_info
                .as_ref()
                .map(|b| !b.full_name.trim().is_empty() && !b.email.trim().is_empty())
                .unwrap_or(false);
            if !billing_ok {
                return Err(AppError::Validation(
                    "Guest checkout requires billing name and email".to_string(),
                ));
            }
        }

        let course = self
            .course_repo
            .find_by_id(request.course_id)
            .await?
            .filter(|c| c.is_published)
            .ok_or_else(|| AppError::NotFound("Course not found".to_string()))?;

        if let Some(user_id) = request.user_id {
            if self.enrollment_repo.exists(user_id, course.id).await? {
                return Err(AppError::BadRequest(
                    "You are already enrolled in this course".to_string(),
                ));
            }
        }

        // Validated now so dead codes are rejected up front; the coupon is
        // redeemed (used_count) only if the payment is approved.
        let coupon_code = match &request.coupon_code {
            Some(code) => {
                let validated = self.coupon_service.validate(code, course.id, course.price).await?;
                Some(validated.coupon.code)
            }
            None => None,
        };

        let payment = Payment {
            id: Uuid::new_v4(),
            course_id: course.id,
            user_id: request.user_id,
            amount: request.amount,
            payment_method: request.payment_method,
            transaction_id: request.transaction_id.trim().to_string(),
            status: PaymentStatus::Pending,
            coupon_code,
            billing_info: request.billing_info,
            gateway_response: json!({
                "phone": phone,
                "guest": request.user_id.is_none(),
            }),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let payment = self.payment_repo.create(payment).await?;

        if let Some(user_id) = request.user_id {
            self.notification_repo
                .create(crate::domain::CreateNotificationRequest {
                    user_id,
                    title: "Payment received".to_string(),
                    message: format!(
                        "We received your payment for \"{}\". It will be verified shortly.",
                        course.title
                    ),
                    kind: crate::domain::NotificationKind::Payment,
                })
                .await?;
        }

        tracing::info!(payment_id = %payment.id, course_id = %course.id, "payment submitted");

        Ok(payment)
    }

    /// Resolve a pending payment. The status transition and every side
    /// effect (enrollment, student counter, coupon redemption,
    /// notification) commit or roll back together, so an approved payment
    /// can never be left without its enrollment.
    pub async fn verify(
        &self,
        payment_id: Uuid,
        action: VerifyAction,
        admin_notes: Option<String>,
        verified_by: Uuid,
    ) -> Result<Payment> {
        let payment = self
            .payment_repo
            .find_by_id(payment_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Payment not found".to_string()))?;

        if payment.status != PaymentStatus::Pending {
            return Err(AppError::BadRequest(
                "Payment has already been processed".to_string(),
            ));
        }

        let course = self
            .course_repo
            .find_by_id(payment.course_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Course not found".to_string()))?;

        let new_status = match action {
            VerifyAction::Approve => PaymentStatus::Completed,
            VerifyAction::Reject => PaymentStatus::Failed,
        };

        let now = Utc::now();
        let mut gateway_response = payment.gateway_response.clone();
        if let Some(log) = gateway_response.as_object_mut() {
            log.insert("action".to_string(), json!(action));
            log.insert("admin_notes".to_string(), json!(admin_notes));
            log.insert("verified_by".to_string(), json!(verified_by));
            log.insert("verified_at".to_string(), json!(now.to_rfc3339()));
        }
        let gateway_response_json = serde_json::to_string(&gateway_response)
            .map_err(|e| AppError::Internal(e.to_string()))?;

        let payment_id_str = payment.id.to_string();
        let now_naive = now.naive_utc();

        let mut tx = self.pool.begin().await?;

        // Conditional update doubles as the guard against a concurrent
        // admin resolving the same payment.
        let updated = sqlx::query(
            "UPDATE payments SET status = ?, gateway_response = ?, updated_at = ? \
             WHERE id = ? AND status = 'Pending'"
        )
        .bind(payment_status_to_str(&new_status))
        .bind(&gateway_response_json)
        .bind(now_naive)
        .bind(&payment_id_str)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            return Err(AppError::BadRequest(
                "Payment has already been processed".to_string(),
            ));
        }

        match (action, payment.user_id) {
            (VerifyAction::Approve, Some(user_id)) => {
                let enrollment_id = Uuid::new_v4().to_string();
                let user_id_str = user_id.to_string();
                let course_id_str = course.id.to_string();

                let inserted = sqlx::query(
                    r#"
                    INSERT INTO enrollments (id, user_id, course_id, progress_percentage, enrolled_at)
                    VALUES (?, ?, ?, 0, ?)
                    ON CONFLICT(user_id, course_id) DO NOTHING
                    "#
                )
                .bind(&enrollment_id)
                .bind(&user_id_str)
                .bind(&course_id_str)
                .bind(now_naive)
                .execute(&mut *tx)
                .await?;

                if inserted.rows_affected() > 0 {
                    sqlx::query(
                        "UPDATE courses SET total_students = total_students + 1 WHERE id = ?"
                    )
                    .bind(&course_id_str)
                    .execute(&mut *tx)
                    .await?;
                }

                if let Some(code) = &payment.coupon_code {
                    sqlx::query(
                        "UPDATE coupon_codes SET used_count = used_count + 1, updated_at = ? \
                         WHERE code = ?"
                    )
                    .bind(now_naive)
                    .bind(code)
                    .execute(&mut *tx)
                    .await?;
                }

                insert_notification(
                    &mut tx,
                    user_id,
                    "Enrollment confirmed",
                    &format!("Your payment was verified. You are now enrolled in \"{}\".", course.title),
                )
                .await?;
            }
            (VerifyAction::Reject, Some(user_id)) => {
                insert_notification(
                    &mut tx,
                    user_id,
                    "Payment rejected",
                    &format!(
                        "Your payment for \"{}\" could not be verified. Please contact support.",
                        course.title
                    ),
                )
                .await?;
            }
            // Guest payments carry no account; enrollment happens later
            // through manual admin enrollment.
            (_, None) => {}
        }

        tx.commit().await?;

        tracing::info!(
            payment_id = %payment.id,
            ?action,
            verified_by = %verified_by,
            "payment resolved"
        );

        self.payment_repo.find_by_id(payment.id).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve resolved payment".to_string())
        })
    }
}

async fn insert_notification(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    user_id: Uuid,
    title: &str,
    message: &str,
) -> Result<()> {
    let id = Uuid::new_v4().to_string();
    let user_id_str = user_id.to_string();
    let now = Utc::now().naive_utc();

    sqlx::query(
        r#"
        INSERT INTO notifications (id, user_id, title, message, kind, is_read, created_at)
        VALUES (?, ?, ?, ?, 'Payment', 0, ?)
        "#
    )
    .bind(&id)
    .bind(&user_id_str)
    .bind(title)
    .bind(message)
    .bind(now)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

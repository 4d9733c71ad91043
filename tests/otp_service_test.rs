use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use pathshala::{
    auth::{AuthService, StaticRolePolicy},
    error::{AppError, Result},
    integrations::{NoopSmsGateway, SmsGateway},
    repository::{SqliteVerificationRepository, VerificationRepository},
    service::{OtpService, ServiceContext},
};
use sqlx::SqlitePool;

async fn setup() -> anyhow::Result<Arc<ServiceContext>> {
    let pool = SqlitePool::connect(":memory:").await?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await?;

    let auth_service = Arc::new(AuthService::new(pool.clone()));
    let role_policy = Arc::new(StaticRolePolicy::default());

    Ok(Arc::new(ServiceContext::new(
        auth_service,
        role_policy,
        Arc::new(NoopSmsGateway),
        pool,
    )))
}

/// Gateway that always refuses, for the fail-closed path.
struct DownSmsGateway;

#[async_trait]
impl SmsGateway for DownSmsGateway {
    fn name(&self) -> &str {
        "Down"
    }

    fn is_enabled(&self) -> bool {
        true
    }

    async fn health_check(&self) -> Result<()> {
        Err(AppError::External("gateway down".to_string()))
    }

    async fn send(&self, _phone: &str, _message: &str) -> Result<()> {
        Err(AppError::External("gateway down".to_string()))
    }
}

#[tokio::test]
async fn test_send_stores_six_digit_code_with_expiry() -> anyhow::Result<()> {
    let ctx = setup().await?;

    ctx.otp_service.send_otp("+8801712345678").await?;

    let stored = ctx.verification_repo
        .find_by_phone("01712345678")
        .await?
        .expect("verification row should exist");

    assert_eq!(stored.otp_code.len(), 6);
    assert!(stored.otp_code.chars().all(|c| c.is_ascii_digit()));

    let ttl = stored.expires_at - Utc::now();
    assert!(ttl > Duration::minutes(4) && ttl <= Duration::minutes(5));

    Ok(())
}

#[tokio::test]
async fn test_resend_replaces_previous_code() -> anyhow::Result<()> {
    let ctx = setup().await?;

    ctx.otp_service.send_otp("01712345678").await?;
    let first = ctx.verification_repo.find_by_phone("01712345678").await?.unwrap();

    ctx.otp_service.send_otp("8801712345678").await?;
    let second = ctx.verification_repo.find_by_phone("01712345678").await?.unwrap();

    // One live row per phone, refreshed in place
    assert_eq!(first.id, second.id);

    let count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM phone_verifications WHERE phone = ?"
    )
    .bind("01712345678")
    .fetch_one(&ctx.db_pool)
    .await?;
    assert_eq!(count, 1);

    Ok(())
}

#[tokio::test]
async fn test_correct_code_verifies_and_is_consumed() -> anyhow::Result<()> {
    let ctx = setup().await?;

    ctx.otp_service.send_otp("01712345678").await?;
    let stored = ctx.verification_repo.find_by_phone("01712345678").await?.unwrap();

    ctx.otp_service.verify_otp("01712345678", &stored.otp_code).await?;

    // Consumed: a second attempt has nothing to match
    let err = ctx.otp_service
        .verify_otp("01712345678", &stored.otp_code)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    Ok(())
}

#[tokio::test]
async fn test_wrong_code_is_rejected_but_not_consumed() -> anyhow::Result<()> {
    let ctx = setup().await?;

    ctx.otp_service.send_otp("01712345678").await?;

    let err = ctx.otp_service
        .verify_otp("01712345678", "000000")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    // The right code still works afterwards
    let stored = ctx.verification_repo.find_by_phone("01712345678").await?.unwrap();
    ctx.otp_service.verify_otp("01712345678", &stored.otp_code).await?;

    Ok(())
}

#[tokio::test]
async fn test_expired_code_is_rejected() -> anyhow::Result<()> {
    let ctx = setup().await?;

    ctx.verification_repo
        .upsert("01712345678", "123456", Utc::now() - Duration::minutes(1))
        .await?;

    let err = ctx.otp_service
        .verify_otp("01712345678", "123456")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    Ok(())
}

#[tokio::test]
async fn test_malformed_phone_is_rejected() -> anyhow::Result<()> {
    let ctx = setup().await?;

    let err = ctx.otp_service.send_otp("12345").await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    Ok(())
}

#[tokio::test]
async fn test_gateway_failure_is_surfaced() -> anyhow::Result<()> {
    let pool = SqlitePool::connect(":memory:").await?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await?;

    let verification_repo: Arc<dyn VerificationRepository> =
        Arc::new(SqliteVerificationRepository::new(pool.clone()));
    let otp_service = OtpService::new(verification_repo.clone(), Arc::new(DownSmsGateway));

    // Fail-closed: the caller is told the send failed
    let err = otp_service.send_otp("01712345678").await.unwrap_err();
    assert!(matches!(err, AppError::External(_)));

    Ok(())
}

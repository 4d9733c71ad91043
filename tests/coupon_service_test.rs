use std::sync::Arc;

use chrono::{Duration, Utc};
use pathshala::{
    auth::{AuthService, StaticRolePolicy},
    domain::{CreateCouponRequest, CreateCourseRequest, DiscountType},
    error::AppError,
    integrations::NoopSmsGateway,
    service::ServiceContext,
};
use sqlx::SqlitePool;
use uuid::Uuid;

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

fn coupon_request(code: &str) -> CreateCouponRequest {
    CreateCouponRequest {
        code: code.to_string(),
        discount_type: DiscountType::Percentage,
        discount_value: 20,
        max_uses: None,
        min_purchase_amount: 0,
        valid_from: None,
        valid_until: None,
        is_active: true,
        course_id: None,
    }
}

#[tokio::test]
async fn test_unknown_code_is_rejected() -> anyhow::Result<()> {
    let ctx = setup().await?;

    let err = ctx.coupon_service
        .validate("NOPE", Uuid::new_v4(), 1000)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    Ok(())
}

#[tokio::test]
async fn test_code_lookup_is_case_insensitive() -> anyhow::Result<()> {
    let ctx = setup().await?;

    ctx.coupon_repo.create(coupon_request("SAVE20")).await?;

    let result = ctx.coupon_service
        .validate("save20", Uuid::new_v4(), 1000)
        .await?;
    assert_eq!(result.coupon.code, "SAVE20");
    assert_eq!(result.discount_amount, 200);

    Ok(())
}

#[tokio::test]
async fn test_percentage_discount_is_clamped_to_amount() -> anyhow::Result<()> {
    let ctx = setup().await?;

    let mut request = coupon_request("BIG");
    request.discount_value = 100;
    ctx.coupon_repo.create(request).await?;

    let result = ctx.coupon_service.validate("BIG", Uuid::new_v4(), 750).await?;
    assert_eq!(result.discount_amount, 750);

    Ok(())
}

#[tokio::test]
async fn test_fixed_discount_never_exceeds_amount() -> anyhow::Result<()> {
    let ctx = setup().await?;

    let mut request = coupon_request("FLAT500");
    request.discount_type = DiscountType::Fixed;
    request.discount_value = 500;
    ctx.coupon_repo.create(request).await?;

    let small = ctx.coupon_service.validate("FLAT500", Uuid::new_v4(), 300).await?;
    assert_eq!(small.discount_amount, 300);

    let large = ctx.coupon_service.validate("FLAT500", Uuid::new_v4(), 2000).await?;
    assert_eq!(large.discount_amount, 500);

    Ok(())
}

#[tokio::test]
async fn test_course_scoped_coupon_rejects_other_courses() -> anyhow::Result<()> {
    let ctx = setup().await?;

    let course = ctx.course_repo.create(CreateCourseRequest {
        title: "Scoped".to_string(),
        slug: "scoped".to_string(),
        description: String::new(),
        category_id: None,
        teacher_id: None,
        price: 1000,
        thumbnail_url: None,
        intro_video_id: None,
        is_published: true,
    }).await?;

    let mut request = coupon_request("SCOPED");
    request.course_id = Some(course.id);
    ctx.coupon_repo.create(request).await?;

    let ok = ctx.coupon_service.validate("SCOPED", course.id, 1000).await?;
    assert_eq!(ok.discount_amount, 200);

    let err = ctx.coupon_service
        .validate("SCOPED", Uuid::new_v4(), 1000)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    Ok(())
}

#[tokio::test]
async fn test_exhausted_coupon_is_rejected() -> anyhow::Result<()> {
    let ctx = setup().await?;

    let mut request = coupon_request("LIMITED");
    request.max_uses = Some(2);
    let coupon = ctx.coupon_repo.create(request).await?;

    sqlx::query("UPDATE coupon_codes SET used_count = 2 WHERE id = ?")
        .bind(coupon.id.to_string())
        .execute(&ctx.db_pool)
        .await?;

    let err = ctx.coupon_service
        .validate("LIMITED", Uuid::new_v4(), 1000)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    Ok(())
}

#[tokio::test]
async fn test_validity_window_is_enforced() -> anyhow::Result<()> {
    let ctx = setup().await?;

    let mut not_yet = coupon_request("FUTURE");
    not_yet.valid_from = Some(Utc::now() + Duration::days(1));
    ctx.coupon_repo.create(not_yet).await?;

    let err = ctx.coupon_service
        .validate("FUTURE", Uuid::new_v4(), 1000)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    let mut expired = coupon_request("EXPIRED");
    expired.valid_until = Some(Utc::now() - Duration::days(1));
    ctx.coupon_repo.create(expired).await?;

    let err = ctx.coupon_service
        .validate("EXPIRED", Uuid::new_v4(), 1000)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    Ok(())
}

#[tokio::test]
async fn test_minimum_purchase_is_enforced() -> anyhow::Result<()> {
    let ctx = setup().await?;

    let mut request = coupon_request("MIN1000");
    request.min_purchase_amount = 1000;
    ctx.coupon_repo.create(request).await?;

    let err = ctx.coupon_service
        .validate("MIN1000", Uuid::new_v4(), 999)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    let ok = ctx.coupon_service.validate("MIN1000", Uuid::new_v4(), 1000).await?;
    assert_eq!(ok.discount_amount, 200);

    Ok(())
}

#[tokio::test]
async fn test_inactive_coupon_is_invisible() -> anyhow::Result<()> {
    let ctx = setup().await?;

    let mut request = coupon_request("DISABLED");
    request.is_active = false;
    ctx.coupon_repo.create(request).await?;

    let err = ctx.coupon_service
        .validate("DISABLED", Uuid::new_v4(), 1000)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    // The code itself stays taken; only validation ignores it
    assert!(ctx.coupon_repo.find_by_code("disabled").await?.is_some());
    assert!(ctx.coupon_repo.find_active_by_code("disabled").await?.is_none());

    Ok(())
}

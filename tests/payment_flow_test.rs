use std::sync::Arc;

use pathshala::{
    auth::{AuthService, StaticRolePolicy},
    domain::{
        BillingInfo, CreateCouponRequest, CreateCourseRequest, CreateUserRequest, DiscountType,
        PaymentMethod, PaymentStatus, SubmitPaymentRequest, User, VerifyAction,
    },
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

async fn create_course(ctx: &ServiceContext, price: i64) -> anyhow::Result<pathshala::domain::Course> {
    let course = ctx.course_repo.create(CreateCourseRequest {
        title: "Test Course".to_string(),
        slug: format!("test-course-{}", Uuid::new_v4()),
        description: String::new(),
        category_id: None,
        teacher_id: None,
        price,
        thumbnail_url: None,
        intro_video_id: None,
        is_published: true,
    }).await?;

    Ok(course)
}

async fn create_user(ctx: &ServiceContext) -> anyhow::Result<User> {
    let user = ctx.user_repo.create(CreateUserRequest {
        email: format!("{}@example.com", Uuid::new_v4()),
        phone: Some("01712345678".to_string()),
        full_name: "Test Student".to_string(),
        password_hash: "unused".to_string(),
    }).await?;

    Ok(user)
}

fn submission(course_id: Uuid, user_id: Option<Uuid>, amount: i64) -> SubmitPaymentRequest {
    SubmitPaymentRequest {
        course_id,
        user_id,
        amount,
        payment_method: PaymentMethod::Bkash,
        transaction_id: "TX123456789".to_string(),
        phone_number: "01712345678".to_string(),
        billing_info: None,
        coupon_code: None,
    }
}

#[tokio::test]
async fn test_submission_creates_pending_payment() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let course = create_course(&ctx, 4500).await?;
    let user = create_user(&ctx).await?;

    let payment = ctx.payment_service
        .submit(submission(course.id, Some(user.id), 4500))
        .await?;

    assert_eq!(payment.status, PaymentStatus::Pending);
    assert_eq!(payment.amount, 4500);
    assert_eq!(payment.gateway_response["guest"], serde_json::json!(false));
    assert_eq!(payment.gateway_response["phone"], serde_json::json!("01712345678"));

    // Submission alone must not enroll anyone
    assert!(!ctx.enrollment_repo.exists(user.id, course.id).await?);

    // The student sees a "payment received" notification
    let notifications = ctx.notification_repo.list_by_user(user.id, 10, 0).await?;
    assert_eq!(notifications.len(), 1);

    Ok(())
}

#[tokio::test]
async fn test_unknown_course_is_rejected() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let user = create_user(&ctx).await?;

    let err = ctx.payment_service
        .submit(submission(Uuid::new_v4(), Some(user.id), 1000))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    Ok(())
}

#[tokio::test]
async fn test_guest_checkout_requires_billing_details() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let course = create_course(&ctx, 4500).await?;

    let err = ctx.payment_service
        .submit(submission(course.id, None, 4500))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let mut with_billing = submission(course.id, None, 4500);
    with_billing.billing_info = Some(BillingInfo {
        full_name: "Guest Buyer".to_string(),
        email: "guest@example.com".to_string(),
        address: None,
        city: None,
    });

    let payment = ctx.payment_service.submit(with_billing).await?;
    assert_eq!(payment.status, PaymentStatus::Pending);
    assert_eq!(payment.gateway_response["guest"], serde_json::json!(true));

    Ok(())
}

#[tokio::test]
async fn test_already_enrolled_user_cannot_resubmit() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let course = create_course(&ctx, 4500).await?;
    let user = create_user(&ctx).await?;

    ctx.enrollment_repo.create(user.id, course.id).await?;

    let err = ctx.payment_service
        .submit(submission(course.id, Some(user.id), 4500))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    Ok(())
}

#[tokio::test]
async fn test_approval_enrolls_exactly_once() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let course = create_course(&ctx, 4500).await?;
    let user = create_user(&ctx).await?;
    let admin = create_user(&ctx).await?;

    let payment = ctx.payment_service
        .submit(submission(course.id, Some(user.id), 4500))
        .await?;

    let resolved = ctx.payment_service
        .verify(payment.id, VerifyAction::Approve, Some("trxn checked".to_string()), admin.id)
        .await?;

    assert_eq!(resolved.status, PaymentStatus::Completed);
    assert_eq!(resolved.gateway_response["action"], serde_json::json!("approve"));
    assert_eq!(resolved.gateway_response["verified_by"], serde_json::json!(admin.id));

    // Enrollment created and the counter moved once
    assert!(ctx.enrollment_repo.exists(user.id, course.id).await?);
    let course = ctx.course_repo.find_by_id(course.id).await?.unwrap();
    assert_eq!(course.total_students, 1);

    // A resolved payment cannot be resolved again
    let err = ctx.payment_service
        .verify(payment.id, VerifyAction::Approve, None, admin.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    // And the retry changed nothing
    let course = ctx.course_repo.find_by_id(course.id).await?.unwrap();
    assert_eq!(course.total_students, 1);
    assert_eq!(ctx.enrollment_repo.list_by_course(course.id).await?.len(), 1);

    Ok(())
}

#[tokio::test]
async fn test_rejection_fails_payment_without_enrolling() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let course = create_course(&ctx, 4500).await?;
    let user = create_user(&ctx).await?;
    let admin = create_user(&ctx).await?;

    let payment = ctx.payment_service
        .submit(submission(course.id, Some(user.id), 4500))
        .await?;

    let resolved = ctx.payment_service
        .verify(payment.id, VerifyAction::Reject, Some("no such trxn".to_string()), admin.id)
        .await?;

    assert_eq!(resolved.status, PaymentStatus::Failed);
    assert!(!ctx.enrollment_repo.exists(user.id, course.id).await?);

    // Approving a failed payment is also refused
    let err = ctx.payment_service
        .verify(payment.id, VerifyAction::Approve, None, admin.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    Ok(())
}

#[tokio::test]
async fn test_approval_redeems_attached_coupon() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let course = create_course(&ctx, 4500).await?;
    let user = create_user(&ctx).await?;
    let admin = create_user(&ctx).await?;

    let coupon = ctx.coupon_repo.create(CreateCouponRequest {
        code: "SAVE20".to_string(),
        discount_type: DiscountType::Percentage,
        discount_value: 20,
        max_uses: Some(10),
        min_purchase_amount: 0,
        valid_from: None,
        valid_until: None,
        is_active: true,
        course_id: None,
    }).await?;

    let mut request = submission(course.id, Some(user.id), 3600);
    request.coupon_code = Some("save20".to_string());

    let payment = ctx.payment_service.submit(request).await?;
    assert_eq!(payment.coupon_code.as_deref(), Some("SAVE20"));

    // Validation alone does not redeem
    let unredeemed = ctx.coupon_repo.find_by_id(coupon.id).await?.unwrap();
    assert_eq!(unredeemed.used_count, 0);

    ctx.payment_service
        .verify(payment.id, VerifyAction::Approve, None, admin.id)
        .await?;

    let redeemed = ctx.coupon_repo.find_by_id(coupon.id).await?.unwrap();
    assert_eq!(redeemed.used_count, 1);

    Ok(())
}

#[tokio::test]
async fn test_guest_approval_completes_without_enrollment() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let course = create_course(&ctx, 4500).await?;
    let admin = create_user(&ctx).await?;

    let mut request = submission(course.id, None, 4500);
    request.billing_info = Some(BillingInfo {
        full_name: "Guest Buyer".to_string(),
        email: "guest@example.com".to_string(),
        address: None,
        city: None,
    });

    let payment = ctx.payment_service.submit(request).await?;

    let resolved = ctx.payment_service
        .verify(payment.id, VerifyAction::Approve, None, admin.id)
        .await?;

    assert_eq!(resolved.status, PaymentStatus::Completed);

    // No account to enroll; the counter stays put until manual enrollment
    let course = ctx.course_repo.find_by_id(course.id).await?.unwrap();
    assert_eq!(course.total_students, 0);

    Ok(())
}

#[tokio::test]
async fn test_unpublished_course_is_not_purchasable() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let user = create_user(&ctx).await?;

    let course = ctx.course_repo.create(CreateCourseRequest {
        title: "Draft".to_string(),
        slug: "draft".to_string(),
        description: String::new(),
        category_id: None,
        teacher_id: None,
        price: 1000,
        thumbnail_url: None,
        intro_video_id: None,
        is_published: false,
    }).await?;

    let err = ctx.payment_service
        .submit(submission(course.id, Some(user.id), 1000))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    Ok(())
}

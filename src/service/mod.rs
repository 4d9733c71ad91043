pub mod coupon_service;
pub mod enrollment_service;
pub mod otp_service;
pub mod payment_service;

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::auth::{AuthService, RolePolicy};
use crate::integrations::SmsGateway;
use crate::repository::*;

pub use coupon_service::CouponService;
pub use enrollment_service::EnrollmentService;
pub use otp_service::OtpService;
pub use payment_service::PaymentService;

pub struct ServiceContext {
    pub user_repo: Arc<dyn UserRepository>,
    pub course_repo: Arc<dyn CourseRepository>,
    pub enrollment_repo: Arc<dyn EnrollmentRepository>,
    pub payment_repo: Arc<dyn PaymentRepository>,
    pub coupon_repo: Arc<dyn CouponRepository>,
    pub notification_repo: Arc<dyn NotificationRepository>,
    pub verification_repo: Arc<dyn VerificationRepository>,
    pub category_repo: Arc<dyn CategoryRepository>,
    pub teacher_repo: Arc<dyn TeacherRepository>,
    pub testimonial_repo: Arc<dyn TestimonialRepository>,
    pub auth_service: Arc<AuthService>,
    pub role_policy: Arc<dyn RolePolicy>,
    pub sms_gateway: Arc<dyn SmsGateway>,
    pub coupon_service: Arc<CouponService>,
    pub payment_service: Arc<PaymentService>,
    pub enrollment_service: Arc<EnrollmentService>,
    pub otp_service: Arc<OtpService>,
    pub db_pool: SqlitePool,
}

impl ServiceContext {
    pub fn new(
        auth_service: Arc<AuthService>,
        role_policy: Arc<dyn RolePolicy>,
        sms_gateway: Arc<dyn SmsGateway>,
        db_pool: SqlitePool,
    ) -> Self {
        let user_repo: Arc<dyn UserRepository> = Arc::new(SqliteUserRepository::new(db_pool.clone()));
        let course_repo: Arc<dyn CourseRepository> =
            Arc::new(SqliteCourseRepository::new(db_pool.clone()));
        let enrollment_repo: Arc<dyn EnrollmentRepository> =
            Arc::new(SqliteEnrollmentRepository::new(db_pool.clone()));
        let payment_repo: Arc<dyn PaymentRepository> =
            Arc::new(SqlitePaymentRepository::new(db_pool.clone()));
        let coupon_repo: Arc<dyn CouponRepository> =
            Arc::new(SqliteCouponRepository::new(db_pool.clone()));
        let notification_repo: Arc<dyn NotificationRepository> =
            Arc::new(SqliteNotificationRepository::new(db_pool.clone()));
        let verification_repo: Arc<dyn VerificationRepository> =
            Arc::new(SqliteVerificationRepository::new(db_pool.clone()));
        let category_repo: Arc<dyn CategoryRepository> =
            Arc::new(SqliteCategoryRepository::new(db_pool.clone()));
        let teacher_repo: Arc<dyn TeacherRepository> =
            Arc::new(SqliteTeacherRepository::new(db_pool.clone()));
        let testimonial_repo: Arc<dyn TestimonialRepository> =
            Arc::new(SqliteTestimonialRepository::new(db_pool.clone()));

        let coupon_service = Arc::new(CouponService::new(coupon_repo.clone()));
        let payment_service = Arc::new(PaymentService::new(
            db_pool.clone(),
            course_repo.clone(),
            enrollment_repo.clone(),
            payment_repo.clone(),
            notification_repo.clone(),
            coupon_service.clone(),
        ));
        let enrollment_service = Arc::new(EnrollmentService::new(
            enrollment_repo.clone(),
            course_repo.clone(),
            notification_repo.clone(),
        ));
        let otp_service = Arc::new(OtpService::new(
            verification_repo.clone(),
            sms_gateway.clone(),
        ));

        Self {
            user_repo,
            course_repo,
            enrollment_repo,
            payment_repo,
            coupon_repo,
            notification_repo,
            verification_repo,
            category_repo,
            teacher_repo,
            testimonial_repo,
            auth_service,
            role_policy,
            sms_gateway,
            coupon_service,
            payment_service,
            enrollment_service,
            otp_service,
            db_pool,
        }
    }
}

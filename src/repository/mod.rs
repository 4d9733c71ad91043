use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::*;
use crate::error::Result;

pub mod catalog_repository;
pub mod coupon_repository;
pub mod course_repository;
pub mod enrollment_repository;
pub mod notification_repository;
pub mod payment_repository;
pub mod user_repository;
pub mod verification_repository;

pub use catalog_repository::{
    CategoryRepository, SqliteCategoryRepository, SqliteTeacherRepository,
    SqliteTestimonialRepository, TeacherRepository, TestimonialRepository,
};
pub use coupon_repository::SqliteCouponRepository;
pub use course_repository::SqliteCourseRepository;
pub use enrollment_repository::SqliteEnrollmentRepository;
pub use notification_repository::SqliteNotificationRepository;
pub use payment_repository::SqlitePaymentRepository;
pub use user_repository::SqliteUserRepository;
pub use verification_repository::SqliteVerificationRepository;

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: CreateUserRequest) -> Result<User>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;
    async fn update(&self, id: Uuid, update: UpdateUserRequest) -> Result<User>;
    async fn count(&self) -> Result<i64>;
}

#[async_trait]
pub trait CourseRepository: Send + Sync {
    async fn create(&self, course: CreateCourseRequest) -> Result<Course>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Course>>;
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Course>>;
    async fn list_published(&self, category_id: Option<Uuid>) -> Result<Vec<Course>>;
    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Course>>;
    async fn update(&self, id: Uuid, update: UpdateCourseRequest) -> Result<Course>;
    async fn delete(&self, id: Uuid) -> Result<()>;
    async fn count(&self) -> Result<i64>;
    async fn increment_students(&self, id: Uuid) -> Result<()>;

    async fn create_section(&self, course_id: Uuid, section: CreateSectionRequest) -> Result<Section>;
    async fn find_section(&self, id: Uuid) -> Result<Option<Section>>;
    async fn update_section(&self, id: Uuid, section: CreateSectionRequest) -> Result<Section>;
    async fn delete_section(&self, id: Uuid) -> Result<()>;
    async fn list_sections(&self, course_id: Uuid) -> Result<Vec<Section>>;

    async fn create_lesson(&self, section_id: Uuid, lesson: CreateLessonRequest) -> Result<Lesson>;
    async fn find_lesson(&self, id: Uuid) -> Result<Option<Lesson>>;
    async fn update_lesson(&self, id: Uuid, update: UpdateLessonRequest) -> Result<Lesson>;
    async fn delete_lesson(&self, id: Uuid) -> Result<()>;
    async fn list_lessons(&self, section_id: Uuid) -> Result<Vec<Lesson>>;
    /// Course owning the lesson, via its section.
    async fn lesson_course_id(&self, lesson_id: Uuid) -> Result<Option<Uuid>>;
    async fn count_lessons(&self, course_id: Uuid) -> Result<i64>;
}

#[async_trait]
pub trait EnrollmentRepository: Send + Sync {
    /// Conflict-aware insert. Returns None when an enrollment for the
    /// pair already exists.
    async fn create(&self, user_id: Uuid, course_id: Uuid) -> Result<Option<Enrollment>>;
    async fn find(&self, user_id: Uuid, course_id: Uuid) -> Result<Option<Enrollment>>;
    async fn exists(&self, user_id: Uuid, course_id: Uuid) -> Result<bool>;
    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Enrollment>>;
    async fn list_by_course(&self, course_id: Uuid) -> Result<Vec<Enrollment>>;
    async fn update_progress(
        &self,
        user_id: Uuid,
        course_id: Uuid,
        progress_percentage: i64,
        completed_at: Option<DateTime<Utc>>,
    ) -> Result<()>;
    /// Idempotent. Returns true when the completion was newly recorded.
    async fn mark_lesson_complete(&self, user_id: Uuid, lesson_id: Uuid) -> Result<bool>;
    async fn count_completed_lessons(&self, user_id: Uuid, course_id: Uuid) -> Result<i64>;
    async fn count(&self) -> Result<i64>;
}

#[async_trait]
pub trait PaymentRepository: Send + Sync {
    async fn create(&self, payment: Payment) -> Result<Payment>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Payment>>;
    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Payment>>;
    async fn list_by_status(&self, status: PaymentStatus, limit: i64, offset: i64) -> Result<Vec<Payment>>;
    async fn count_by_status(&self, status: PaymentStatus) -> Result<i64>;
    async fn completed_revenue(&self) -> Result<i64>;
}

#[async_trait]
pub trait CouponRepository: Send + Sync {
    async fn create(&self, coupon: CreateCouponRequest) -> Result<CouponCode>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<CouponCode>>;
    /// Case-insensitive lookup, active or not. Codes are unique either way.
    async fn find_by_code(&self, code: &str) -> Result<Option<CouponCode>>;
    /// Case-insensitive lookup over active coupons only.
    async fn find_active_by_code(&self, code: &str) -> Result<Option<CouponCode>>;
    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<CouponCode>>;
    async fn update(&self, id: Uuid, update: UpdateCouponRequest) -> Result<CouponCode>;
    async fn delete(&self, id: Uuid) -> Result<()>;
}

#[async_trait]
pub trait NotificationRepository: Send + Sync {
    async fn create(&self, notification: CreateNotificationRequest) -> Result<Notification>;
    async fn list_by_user(&self, user_id: Uuid, limit: i64, offset: i64) -> Result<Vec<Notification>>;
    /// Returns false when the notification does not exist or belongs to
    /// someone else.
    async fn mark_read(&self, id: Uuid, user_id: Uuid) -> Result<bool>;
    async fn unread_count(&self, user_id: Uuid) -> Result<i64>;
}

#[async_trait]
pub trait VerificationRepository: Send + Sync {
    /// Insert or replace the live code for a phone.
    async fn upsert(&self, phone: &str, otp_code: &str, expires_at: DateTime<Utc>) -> Result<PhoneVerification>;
    async fn find_by_phone(&self, phone: &str) -> Result<Option<PhoneVerification>>;
    async fn delete_by_phone(&self, phone: &str) -> Result<()>;
    async fn delete_expired(&self) -> Result<u64>;
}

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::{
    domain::{CreateNotificationRequest, Enrollment, NotificationKind},
    error::{AppError, Result},
    repository::{CourseRepository, EnrollmentRepository, NotificationRepository},
};

pub struct EnrollmentService {
    enrollment_repo: Arc<dyn EnrollmentRepository>,
    course_repo: Arc<dyn CourseRepository>,
    notification_repo: Arc<dyn NotificationRepository>,
}

impl EnrollmentService {
    pub fn new(
        enrollment_repo: Arc<dyn EnrollmentRepository>,
        course_repo: Arc<dyn CourseRepository>,
        notification_repo: Arc<dyn NotificationRepository>,
    ) -> Self {
        Self {
            enrollment_repo,
            course_repo,
            notification_repo,
        }
    }

    /// Self-service enrollment, free courses only. Paid courses go
    /// through checkout and admin verification.
    pub async fn enroll_free(&self, user_id: Uuid, course_id: Uuid) -> Result<Enrollment> {
        let course = self
            .course_repo
            .find_by_id(course_id)
            .await?
            .filter(|c| c.is_published)
            .ok_or_else(|| AppError::NotFound("Course not found".to_string()))?;

        if course.price > 0 {
            return Err(AppError::BadRequest(
                "This course requires payment".to_string(),
            ));
        }

        let enrollment = self.enroll(user_id, course_id).await?;

        self.notification_repo
            .create(CreateNotificationRequest {
                user_id,
                title: "Enrollment confirmed".to_string(),
                message: format!("You are now enrolled in \"{}\".", course.title),
                kind: NotificationKind::Enrollment,
            })
            .await?;

        Ok(enrollment)
    }

    /// Admin-driven enrollment, used for guest-payment follow-up and
    /// support cases. Idempotent: enrolling twice returns the existing
    /// row.
    pub async fn enroll_manual(&self, user_id: Uuid, course_id: Uuid) -> Result<Enrollment> {
        self.course_repo
            .find_by_id(course_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Course not found".to_string()))?;

        self.enroll(user_id, course_id).await
    }

    async fn enroll(&self, user_id: Uuid, course_id: Uuid) -> Result<Enrollment> {
        match self.enrollment_repo.create(user_id, course_id).await? {
            Some(enrollment) => {
                self.course_repo.increment_students(course_id).await?;
                Ok(enrollment)
            }
            None => self
                .enrollment_repo
                .find(user_id, course_id)
                .await?
                .ok_or_else(|| AppError::Database("Enrollment lookup failed".to_string())),
        }
    }

    /// Record a finished lesson and recompute course progress. Repeating
    /// a lesson does not move the numbers.
    pub async fn complete_lesson(&self, user_id: Uuid, lesson_id: Uuid) -> Result<Enrollment> {
        let course_id = self
            .course_repo
            .lesson_course_id(lesson_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Lesson not found".to_string()))?;

        if !self.enrollment_repo.exists(user_id, course_id).await? {
            return Err(AppError::Forbidden);
        }

        self.enrollment_repo.mark_lesson_complete(user_id, lesson_id).await?;

        let total = self.course_repo.count_lessons(course_id).await?;
        let completed = self.enrollment_repo.count_completed_lessons(user_id, course_id).await?;

        let progress = if total > 0 { completed * 100 / total } else { 0 };
        let completed_at = if total > 0 && completed >= total {
            Some(Utc::now())
        } else {
            None
        };

        self.enrollment_repo
            .update_progress(user_id, course_id, progress, completed_at)
            .await?;

        self.enrollment_repo
            .find(user_id, course_id)
            .await?
            .ok_or_else(|| AppError::Database("Enrollment lookup failed".to_string()))
    }
}

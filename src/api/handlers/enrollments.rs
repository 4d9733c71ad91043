use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    api::{middleware::auth::CurrentUser, state::AppState},
    domain::{Course, Enrollment},
    error::{AppError, Result},
};

/// An enrollment joined with its course, as shown on the dashboard.
#[derive(Debug, Serialize)]
pub struct EnrollmentWithCourse {
    #[serde(flatten)]
    pub enrollment: Enrollment,
    pub course: Option<Course>,
}

pub async fn my_enrollments(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<Vec<EnrollmentWithCourse>>> {
    let enrollments = state.service_context.enrollment_repo
        .list_by_user(current.user.id)
        .await?;

    let mut result = Vec::with_capacity(enrollments.len());
    for enrollment in enrollments {
        let course = state.service_context.course_repo
            .find_by_id(enrollment.course_id)
            .await?;
        result.push(EnrollmentWithCourse { enrollment, course });
    }

    Ok(Json(result))
}

/// Self-service enrollment into a free course.
pub async fn enroll_free(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(course_id): Path<Uuid>,
) -> Result<(StatusCode, Json<Enrollment>)> {
    let enrollment = state.service_context.enrollment_service
        .enroll_free(current.user.id, course_id)
        .await?;

    Ok((StatusCode::CREATED, Json(enrollment)))
}

/// Mark a lesson finished; returns the refreshed enrollment with its
/// recomputed progress.
pub async fn complete_lesson(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(lesson_id): Path<Uuid>,
) -> Result<Json<Enrollment>> {
    let enrollment = state.service_context.enrollment_service
        .complete_lesson(current.user.id, lesson_id)
        .await?;

    Ok(Json(enrollment))
}

#[derive(Debug, Deserialize)]
pub struct AdminEnrollDto {
    pub user_id: Uuid,
    pub course_id: Uuid,
}

/// Manual enrollment, used after approving guest payments and for
/// support cases. Idempotent.
pub async fn admin_enroll(
    State(state): State<AppState>,
    Json(dto): Json<AdminEnrollDto>,
) -> Result<(StatusCode, Json<Enrollment>)> {
    state.service_context.user_repo
        .find_by_id(dto.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let enrollment = state.service_context.enrollment_service
        .enroll_manual(dto.user_id, dto.course_id)
        .await?;

    Ok((StatusCode::CREATED, Json(enrollment)))
}

pub async fn admin_list_by_course(
    State(state): State<AppState>,
    Path(course_id): Path<Uuid>,
) -> Result<Json<Vec<Enrollment>>> {
    state.service_context.course_repo
        .find_by_id(course_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Course not found".to_string()))?;

    let enrollments = state.service_context.enrollment_repo
        .list_by_course(course_id)
        .await?;

    Ok(Json(enrollments))
}

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    api::{middleware::auth::CurrentUser, state::AppState},
    domain::{
        Course, CreateCourseRequest, CreateLessonRequest, CreateSectionRequest, Lesson, Section,
        UpdateCourseRequest, UpdateLessonRequest,
    },
    error::{AppError, Result},
};

#[derive(Debug, Deserialize)]
pub struct CatalogParams {
    /// Category slug to filter by.
    pub category: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    50
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CourseSummary {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub description: String,
    pub category_id: Option<Uuid>,
    pub teacher_id: Option<Uuid>,
    pub price: i64,
    pub thumbnail_url: Option<String>,
    pub total_students: i64,
}

impl From<Course> for CourseSummary {
    fn from(course: Course) -> Self {
        Self {
            id: course.id,
            title: course.title,
            slug: course.slug,
            description: course.description,
            category_id: course.category_id,
            teacher_id: course.teacher_id,
            price: course.price,
            thumbnail_url: course.thumbnail_url,
            total_students: course.total_students,
        }
    }
}

/// A lesson as shown to a viewer. `video_id` is withheld unless the
/// lesson is a preview or the viewer is enrolled (or an admin).
#[derive(Debug, Serialize, ToSchema)]
pub struct LessonView {
    pub id: Uuid,
    pub title: String,
    pub duration_minutes: i64,
    pub position: i64,
    pub is_preview: bool,
    pub video_id: Option<String>,
}

impl LessonView {
    fn from_lesson(lesson: Lesson, unlocked: bool) -> Self {
        let video_id = if unlocked || lesson.is_preview {
            Some(lesson.video_id)
        } else {
            None
        };
        Self {
            id: lesson.id,
            title: lesson.title,
            duration_minutes: lesson.duration_minutes,
            position: lesson.position,
            is_preview: lesson.is_preview,
            video_id,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SectionView {
    pub id: Uuid,
    pub title: String,
    pub position: i64,
    pub lessons: Vec<LessonView>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CourseDetail {
    #[serde(flatten)]
    pub course: Course,
    pub sections: Vec<SectionView>,
    pub enrolled: bool,
}

/// Published catalog, optionally filtered by category slug.
#[utoipa::path(
    get,
    path = "/api/courses",
    params(("category" = Option<String>, Query, description = "Category slug")),
    responses((status = 200, body = [CourseSummary]))
)]
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<CatalogParams>,
) -> Result<Json<Vec<CourseSummary>>> {
    let category_id = match params.category {
        Some(slug) => {
            let category = state.service_context.category_repo
                .find_by_slug(&slug)
                .await?
                .ok_or_else(|| AppError::NotFound("Category not found".to_string()))?;
            Some(category.id)
        }
        None => None,
    };

    let courses = state.service_context.course_repo
        .list_published(category_id)
        .await?;

    Ok(Json(courses.into_iter().map(Into::into).collect()))
}

/// Course detail with its curriculum. Lesson video ids are only present
/// for previews, enrolled students, and admins.
#[utoipa::path(
    get,
    path = "/api/courses/{id}",
    params(("id" = Uuid, Path, description = "Course id")),
    responses((status = 200, body = CourseDetail), (status = 404, description = "Unknown course"))
)]
pub async fn get(
    State(state): State<AppState>,
    current: Option<Extension<CurrentUser>>,
    Path(id): Path<Uuid>,
) -> Result<Json<CourseDetail>> {
    let course = state.service_context.course_repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Course not found".to_string()))?;

    let (enrolled, is_admin) = match &current {
        Some(Extension(CurrentUser { user })) => {
            let enrolled = state.service_context.enrollment_repo
                .exists(user.id, course.id)
                .await?;
            let is_admin = state.service_context.role_policy.is_admin(user.id).await?;
            (enrolled, is_admin)
        }
        None => (false, false),
    };

    // Unpublished courses are only visible to admins.
    if !course.is_published && !is_admin {
        return Err(AppError::NotFound("Course not found".to_string()));
    }

    let unlocked = enrolled || is_admin;

    let mut sections = Vec::new();
    for section in state.service_context.course_repo.list_sections(course.id).await? {
        let lessons = state.service_context.course_repo
            .list_lessons(section.id)
            .await?
            .into_iter()
            .map(|l| LessonView::from_lesson(l, unlocked))
            .collect();

        sections.push(SectionView {
            id: section.id,
            title: section.title,
            position: section.position,
            lessons,
        });
    }

    Ok(Json(CourseDetail {
        course,
        sections,
        enrolled,
    }))
}

// Admin surface below: full course/section/lesson CRUD.

pub async fn admin_list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Course>>> {
    let courses = state.service_context.course_repo
        .list(params.limit, params.offset)
        .await?;

    Ok(Json(courses))
}

pub async fn create(
    State(state): State<AppState>,
    Json(req): Json<CreateCourseRequest>,
) -> Result<(StatusCode, Json<Course>)> {
    if req.title.trim().is_empty() || req.slug.trim().is_empty() {
        return Err(AppError::Validation("title and slug are required".to_string()));
    }
    if req.price < 0 {
        return Err(AppError::Validation("price cannot be negative".to_string()));
    }
    if state.service_context.course_repo.find_by_slug(&req.slug).await?.is_some() {
        return Err(AppError::Conflict("A course with this slug already exists".to_string()));
    }

    let course = state.service_context.course_repo.create(req).await?;

    Ok((StatusCode::CREATED, Json(course)))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateCourseRequest>,
) -> Result<Json<Course>> {
    state.service_context.course_repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Course not found".to_string()))?;

    let course = state.service_context.course_repo.update(id, req).await?;

    Ok(Json(course))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    state.service_context.course_repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Course not found".to_string()))?;

    state.service_context.course_repo.delete(id).await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_sections(
    State(state): State<AppState>,
    Path(course_id): Path<Uuid>,
) -> Result<Json<Vec<Section>>> {
    let sections = state.service_context.course_repo.list_sections(course_id).await?;

    Ok(Json(sections))
}

pub async fn create_section(
    State(state): State<AppState>,
    Path(course_id): Path<Uuid>,
    Json(req): Json<CreateSectionRequest>,
) -> Result<(StatusCode, Json<Section>)> {
    state.service_context.course_repo
        .find_by_id(course_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Course not found".to_string()))?;

    let section = state.service_context.course_repo
        .create_section(course_id, req)
        .await?;

    Ok((StatusCode::CREATED, Json(section)))
}

pub async fn update_section(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<CreateSectionRequest>,
) -> Result<Json<Section>> {
    let section = state.service_context.course_repo.update_section(id, req).await?;

    Ok(Json(section))
}

pub async fn delete_section(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    state.service_context.course_repo.delete_section(id).await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn create_lesson(
    State(state): State<AppState>,
    Path(section_id): Path<Uuid>,
    Json(req): Json<CreateLessonRequest>,
) -> Result<(StatusCode, Json<Lesson>)> {
    state.service_context.course_repo
        .find_section(section_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Section not found".to_string()))?;

    if req.video_id.trim().is_empty() {
        return Err(AppError::Validation("video_id is required".to_string()));
    }

    let lesson = state.service_context.course_repo
        .create_lesson(section_id, req)
        .await?;

    Ok((StatusCode::CREATED, Json(lesson)))
}

pub async fn update_lesson(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateLessonRequest>,
) -> Result<Json<Lesson>> {
    state.service_context.course_repo
        .find_lesson(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Lesson not found".to_string()))?;

    let lesson = state.service_context.course_repo.update_lesson(id, req).await?;

    Ok(Json(lesson))
}

pub async fn delete_lesson(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    state.service_context.course_repo.delete_lesson(id).await?;

    Ok(StatusCode::NO_CONTENT)
}

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::{
    api::state::AppState,
    domain::{
        Category, CreateCategoryRequest, CreateTeacherRequest, CreateTestimonialRequest, Teacher,
        Testimonial, UpdateTeacherRequest,
    },
    error::{AppError, Result},
};

#[utoipa::path(get, path = "/api/categories", responses((status = 200, body = [Category])))]
pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<Category>>> {
    let categories = state.service_context.category_repo.list().await?;

    Ok(Json(categories))
}

#[utoipa::path(get, path = "/api/teachers", responses((status = 200, body = [Teacher])))]
pub async fn list_teachers(
    State(state): State<AppState>,
) -> Result<Json<Vec<Teacher>>> {
    let teachers = state.service_context.teacher_repo.list().await?;

    Ok(Json(teachers))
}

#[utoipa::path(get, path = "/api/testimonials", responses((status = 200, body = [Testimonial])))]
pub async fn list_testimonials(
    State(state): State<AppState>,
) -> Result<Json<Vec<Testimonial>>> {
    let testimonials = state.service_context.testimonial_repo.list_published().await?;

    Ok(Json(testimonials))
}

pub async fn create_category(
    State(state): State<AppState>,
    Json(req): Json<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<Category>)> {
    if req.name.trim().is_empty() || req.slug.trim().is_empty() {
        return Err(AppError::Validation("name and slug are required".to_string()));
    }
    if state.service_context.category_repo.find_by_slug(&req.slug).await?.is_some() {
        return Err(AppError::Conflict("A category with this slug already exists".to_string()));
    }

    let category = state.service_context.category_repo.create(req).await?;

    Ok((StatusCode::CREATED, Json(category)))
}

pub async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    state.service_context.category_repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Category not found".to_string()))?;

    state.service_context.category_repo.delete(id).await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn create_teacher(
    State(state): State<AppState>,
    Json(req): Json<CreateTeacherRequest>,
) -> Result<(StatusCode, Json<Teacher>)> {
    if req.full_name.trim().is_empty() {
        return Err(AppError::Validation("full_name is required".to_string()));
    }

    let teacher = state.service_context.teacher_repo.create(req).await?;

    Ok((StatusCode::CREATED, Json(teacher)))
}

pub async fn update_teacher(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateTeacherRequest>,
) -> Result<Json<Teacher>> {
    state.service_context.teacher_repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Teacher not found".to_string()))?;

    let teacher = state.service_context.teacher_repo.update(id, req).await?;

    Ok(Json(teacher))
}

pub async fn delete_teacher(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    state.service_context.teacher_repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Teacher not found".to_string()))?;

    state.service_context.teacher_repo.delete(id).await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn admin_list_testimonials(
    State(state): State<AppState>,
) -> Result<Json<Vec<Testimonial>>> {
    let testimonials = state.service_context.testimonial_repo.list().await?;

    Ok(Json(testimonials))
}

pub async fn create_testimonial(
    State(state): State<AppState>,
    Json(req): Json<CreateTestimonialRequest>,
) -> Result<(StatusCode, Json<Testimonial>)> {
    if !(1..=5).contains(&req.rating) {
        return Err(AppError::Validation("rating must be between 1 and 5".to_string()));
    }

    let testimonial = state.service_context.testimonial_repo.create(req).await?;

    Ok((StatusCode::CREATED, Json(testimonial)))
}

pub async fn delete_testimonial(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    state.service_context.testimonial_repo.delete(id).await?;

    Ok(StatusCode::NO_CONTENT)
}

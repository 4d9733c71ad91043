use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Course {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub description: String,
    pub category_id: Option<Uuid>,
    pub teacher_id: Option<Uuid>,
    /// Whole BDT. Mobile-money wallets transact in taka, not paisa.
    pub price: i64,
    pub thumbnail_url: Option<String>,
    pub intro_video_id: Option<String>,
    pub is_published: bool,
    pub total_students: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Section {
    pub id: Uuid,
    pub course_id: Uuid,
    pub title: String,
    pub position: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Lesson {
    pub id: Uuid,
    pub section_id: Uuid,
    pub title: String,
    /// 11-character YouTube id. Hidden from non-enrolled viewers unless
    /// the lesson is a preview.
    pub video_id: String,
    pub duration_minutes: i64,
    pub position: i64,
    pub is_preview: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Teacher {
    pub id: Uuid,
    pub full_name: String,
    pub title: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Testimonial {
    pub id: Uuid,
    pub student_name: String,
    pub content: String,
    pub rating: i64,
    pub avatar_url: Option<String>,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateCategoryRequest {
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateTeacherRequest {
    pub full_name: String,
    pub title: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct UpdateTeacherRequest {
    pub full_name: Option<String>,
    pub title: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateTestimonialRequest {
    pub student_name: String,
    pub content: String,
    pub rating: i64,
    pub avatar_url: Option<String>,
    #[serde(default = "default_published")]
    pub is_published: bool,
}

fn default_published() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateCourseRequest {
    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub description: String,
    pub category_id: Option<Uuid>,
    pub teacher_id: Option<Uuid>,
    pub price: i64,
    pub thumbnail_url: Option<String>,
    pub intro_video_id: Option<String>,
    #[serde(default)]
    pub is_published: bool,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct UpdateCourseRequest {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub category_id: Option<Uuid>,
    pub teacher_id: Option<Uuid>,
    pub price: Option<i64>,
    pub thumbnail_url: Option<String>,
    pub intro_video_id: Option<String>,
    pub is_published: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateSectionRequest {
    pub title: String,
    #[serde(default)]
    pub position: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateLessonRequest {
    pub title: String,
    pub video_id: String,
    #[serde(default)]
    pub duration_minutes: i64,
    #[serde(default)]
    pub position: i64,
    #[serde(default)]
    pub is_preview: bool,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct UpdateLessonRequest {
    pub title: Option<String>,
    pub video_id: Option<String>,
    pub duration_minutes: Option<i64>,
    pub position: Option<i64>,
    pub is_preview: Option<bool>,
}

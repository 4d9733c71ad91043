use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::{
    domain::{
        Course, CreateCourseRequest, CreateLessonRequest, CreateSectionRequest, Lesson, Section,
        UpdateCourseRequest, UpdateLessonRequest,
    },
    error::{AppError, Result},
    repository::CourseRepository,
};

#[derive(FromRow)]
struct CourseRow {
    id: String,
    title: String,
    slug: String,
    description: String,
    category_id: Option<String>,
    teacher_id: Option<String>,
    price: i64,
    thumbnail_url: Option<String>,
    intro_video_id: Option<String>,
    is_published: bool,
    total_students: i64,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

#[derive(FromRow)]
struct SectionRow {
    id: String,
    course_id: String,
    title: String,
    position: i64,
}

#[derive(FromRow)]
struct LessonRow {
    id: String,
    section_id: String,
    title: String,
    video_id: String,
    duration_minutes: i64,
    position: i64,
    is_preview: bool,
}

pub struct SqliteCourseRepository {
    pool: SqlitePool,
}

const COURSE_COLUMNS: &str = "id, title, slug, description, category_id, teacher_id, price, \
     thumbnail_url, intro_video_id, is_published, total_students, created_at, updated_at";

impl SqliteCourseRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn parse_uuid(s: &str) -> Result<Uuid> {
        Uuid::parse_str(s).map_err(|e| AppError::Database(e.to_string()))
    }

    fn row_to_course(row: CourseRow) -> Result<Course> {
        Ok(Course {
            id: Self::parse_uuid(&row.id)?,
            title: row.title,
            slug: row.slug,
            description: row.description,
            category_id: row.category_id.as_deref().map(Self::parse_uuid).transpose()?,
            teacher_id: row.teacher_id.as_deref().map(Self::parse_uuid).transpose()?,
            price: row.price,
            thumbnail_url: row.thumbnail_url,
            intro_video_id: row.intro_video_id,
            is_published: row.is_published,
            total_students: row.total_students,
            created_at: DateTime::from_naive_utc_and_offset(row.created_at, Utc),
            updated_at: DateTime::from_naive_utc_and_offset(row.updated_at, Utc),
        })
    }

    fn row_to_section(row: SectionRow) -> Result<Section> {
        Ok(Section {
            id: Self::parse_uuid(&row.id)?,
            course_id: Self::parse_uuid(&row.course_id)?,
            title: row.title,
            position: row.position,
        })
    }

    fn row_to_lesson(row: LessonRow) -> Result<Lesson> {
        Ok(Lesson {
            id: Self::parse_uuid(&row.id)?,
            section_id: Self::parse_uuid(&row.section_id)?,
            title: row.title,
            video_id: row.video_id,
            duration_minutes: row.duration_minutes,
            position: row.position,
            is_preview: row.is_preview,
        })
    }
}

#[async_trait]
impl CourseRepository for SqliteCourseRepository {
    async fn create(&self, course: CreateCourseRequest) -> Result<Course> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();
        let category_id_str = course.category_id.map(|u| u.to_string());
        let teacher_id_str = course.teacher_id.map(|u| u.to_string());
        let now = Utc::now().naive_utc();

        sqlx::query(
            r#"
            INSERT INTO courses (
                id, title, slug, description, category_id, teacher_id, price,
                thumbnail_url, intro_video_id, is_published, total_students,
                created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 0, ?, ?)
            "#
        )
        .bind(&id_str)
        .bind(&course.title)
        .bind(&course.slug)
        .bind(&course.description)
        .bind(&category_id_str)
        .bind(&teacher_id_str)
        .bind(course.price)
        .bind(&course.thumbnail_url)
        .bind(&course.intro_video_id)
        .bind(course.is_published)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        self.find_by_id(id).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve created course".to_string())
        })
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Course>> {
        let id_str = id.to_string();
        let row = sqlx::query_as::<_, CourseRow>(
            &format!("SELECT {COURSE_COLUMNS} FROM courses WHERE id = ?")
        )
        .bind(id_str)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        match row {
            Some(r) => Ok(Some(Self::row_to_course(r)?)),
            None => Ok(None),
        }
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Course>> {
        let row = sqlx::query_as::<_, CourseRow>(
            &format!("SELECT {COURSE_COLUMNS} FROM courses WHERE slug = ?")
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        match row {
            Some(r) => Ok(Some(Self::row_to_course(r)?)),
            None => Ok(None),
        }
    }

    async fn list_published(&self, category_id: Option<Uuid>) -> Result<Vec<Course>> {
        let rows = match category_id {
            Some(category) => {
                let category_str = category.to_string();
                sqlx::query_as::<_, CourseRow>(
                    &format!(
                        "SELECT {COURSE_COLUMNS} FROM courses \
                         WHERE is_published = 1 AND category_id = ? \
                         ORDER BY created_at DESC"
                    )
                )
                .bind(category_str)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query_as::<_, CourseRow>(
                    &format!(
                        "SELECT {COURSE_COLUMNS} FROM courses \
                         WHERE is_published = 1 \
                         ORDER BY created_at DESC"
                    )
                )
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter().map(Self::row_to_course).collect()
    }

    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Course>> {
        let rows = sqlx::query_as::<_, CourseRow>(
            &format!(
                "SELECT {COURSE_COLUMNS} FROM courses \
                 ORDER BY created_at DESC LIMIT ? OFFSET ?"
            )
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter().map(Self::row_to_course).collect()
    }

    async fn update(&self, id: Uuid, update: UpdateCourseRequest) -> Result<Course> {
        let id_str = id.to_string();
        let category_id_str = update.category_id.map(|u| u.to_string());
        let teacher_id_str = update.teacher_id.map(|u| u.to_string());
        let now = Utc::now().naive_utc();

        sqlx::query(
            r#"
            UPDATE courses
            SET title = COALESCE(?, title),
                slug = COALESCE(?, slug),
                description = COALESCE(?, description),
                category_id = COALESCE(?, category_id),
                teacher_id = COALESCE(?, teacher_id),
                price = COALESCE(?, price),
                thumbnail_url = COALESCE(?, thumbnail_url),
                intro_video_id = COALESCE(?, intro_video_id),
                is_published = COALESCE(?, is_published),
                updated_at = ?
            WHERE id = ?
            "#
        )
        .bind(&update.title)
        .bind(&update.slug)
        .bind(&update.description)
        .bind(&category_id_str)
        .bind(&teacher_id_str)
        .bind(update.price)
        .bind(&update.thumbnail_url)
        .bind(&update.intro_video_id)
        .bind(update.is_published)
        .bind(now)
        .bind(&id_str)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        self.find_by_id(id).await?.ok_or_else(|| {
            AppError::NotFound("Course not found".to_string())
        })
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let id_str = id.to_string();
        sqlx::query("DELETE FROM courses WHERE id = ?")
            .bind(&id_str)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }

    async fn count(&self) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM courses")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(count)
    }

    async fn increment_students(&self, id: Uuid) -> Result<()> {
        let id_str = id.to_string();
        sqlx::query("UPDATE courses SET total_students = total_students + 1 WHERE id = ?")
            .bind(&id_str)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }

    async fn create_section(&self, course_id: Uuid, section: CreateSectionRequest) -> Result<Section> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();
        let course_id_str = course_id.to_string();

        sqlx::query(
            "INSERT INTO sections (id, course_id, title, position) VALUES (?, ?, ?, ?)"
        )
        .bind(&id_str)
        .bind(&course_id_str)
        .bind(&section.title)
        .bind(section.position)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        self.find_section(id).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve created section".to_string())
        })
    }

    async fn find_section(&self, id: Uuid) -> Result<Option<Section>> {
        let id_str = id.to_string();
        let row = sqlx::query_as::<_, SectionRow>(
            "SELECT id, course_id, title, position FROM sections WHERE id = ?"
        )
        .bind(id_str)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        match row {
            Some(r) => Ok(Some(Self::row_to_section(r)?)),
            None => Ok(None),
        }
    }

    async fn update_section(&self, id: Uuid, section: CreateSectionRequest) -> Result<Section> {
        let id_str = id.to_string();

        sqlx::query("UPDATE sections SET title = ?, position = ? WHERE id = ?")
            .bind(&section.title)
            .bind(section.position)
            .bind(&id_str)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        self.find_section(id).await?.ok_or_else(|| {
            AppError::NotFound("Section not found".to_string())
        })
    }

    async fn delete_section(&self, id: Uuid) -> Result<()> {
        let id_str = id.to_string();
        sqlx::query("DELETE FROM sections WHERE id = ?")
            .bind(&id_str)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }

    async fn list_sections(&self, course_id: Uuid) -> Result<Vec<Section>> {
        let course_id_str = course_id.to_string();
        let rows = sqlx::query_as::<_, SectionRow>(
            "SELECT id, course_id, title, position FROM sections \
             WHERE course_id = ? ORDER BY position, title"
        )
        .bind(course_id_str)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter().map(Self::row_to_section).collect()
    }

    async fn create_lesson(&self, section_id: Uuid, lesson: CreateLessonRequest) -> Result<Lesson> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();
        let section_id_str = section_id.to_string();

        sqlx::query(
            r#"
            INSERT INTO lessons (id, section_id, title, video_id, duration_minutes, position, is_preview)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#
        )
        .bind(&id_str)
        .bind(&section_id_str)
        .bind(&lesson.title)
        .bind(&lesson.video_id)
        .bind(lesson.duration_minutes)
        .bind(lesson.position)
        .bind(lesson.is_preview)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        self.find_lesson(id).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve created lesson".to_string())
        })
    }

    async fn find_lesson(&self, id: Uuid) -> Result<Option<Lesson>> {
        let id_str = id.to_string();
        let row = sqlx::query_as::<_, LessonRow>(
            "SELECT id, section_id, title, video_id, duration_minutes, position, is_preview \
             FROM lessons WHERE id = ?"
        )
        .bind(id_str)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        match row {
            Some(r) => Ok(Some(Self::row_to_lesson(r)?)),
            None => Ok(None),
        }
    }

    async fn update_lesson(&self, id: Uuid, update: UpdateLessonRequest) -> Result<Lesson> {
        let id_str = id.to_string();

        sqlx::query(
            r#"
            UPDATE lessons
            SET title = COALESCE(?, title),
                video_id = COALESCE(?, video_id),
                duration_minutes = COALESCE(?, duration_minutes),
                position = COALESCE(?, position),
                is_preview = COALESCE(?, is_preview)
            WHERE id = ?
            "#
        )
        .bind(&update.title)
        .bind(&update.video_id)
        .bind(update.duration_minutes)
        .bind(update.position)
        .bind(update.is_preview)
        .bind(&id_str)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        self.find_lesson(id).await?.ok_or_else(|| {
            AppError::NotFound("Lesson not found".to_string())
        })
    }

    async fn delete_lesson(&self, id: Uuid) -> Result<()> {
        let id_str = id.to_string();
        sqlx::query("DELETE FROM lessons WHERE id = ?")
            .bind(&id_str)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }

    async fn list_lessons(&self, section_id: Uuid) -> Result<Vec<Lesson>> {
        let section_id_str = section_id.to_string();
        let rows = sqlx::query_as::<_, LessonRow>(
            "SELECT id, section_id, title, video_id, duration_minutes, position, is_preview \
             FROM lessons WHERE section_id = ? ORDER BY position, title"
        )
        .bind(section_id_str)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter().map(Self::row_to_lesson).collect()
    }

    async fn lesson_course_id(&self, lesson_id: Uuid) -> Result<Option<Uuid>> {
        let lesson_id_str = lesson_id.to_string();
        let course_id = sqlx::query_scalar::<_, String>(
            r#"
            SELECT s.course_id FROM lessons l
            JOIN sections s ON s.id = l.section_id
            WHERE l.id = ?
            "#
        )
        .bind(lesson_id_str)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        course_id.as_deref().map(Self::parse_uuid).transpose()
    }

    async fn count_lessons(&self, course_id: Uuid) -> Result<i64> {
        let course_id_str = course_id.to_string();
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM lessons l
            JOIN sections s ON s.id = l.section_id
            WHERE s.course_id = ?
            "#
        )
        .bind(course_id_str)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(count)
    }
}

//! Reference-data repositories: categories, teachers, testimonials.
//! Small CRUD surfaces, grouped in one file.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::{
    domain::{
        Category, CreateCategoryRequest, CreateTeacherRequest, CreateTestimonialRequest, Teacher,
        Testimonial, UpdateTeacherRequest,
    },
    error::{AppError, Result},
};

#[async_trait]
pub trait CategoryRepository: Send + Sync {
    async fn create(&self, category: CreateCategoryRequest) -> Result<Category>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Category>>;
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>>;
    async fn list(&self) -> Result<Vec<Category>>;
    async fn delete(&self, id: Uuid) -> Result<()>;
}

#[async_trait]
pub trait TeacherRepository: Send + Sync {
    async fn create(&self, teacher: CreateTeacherRequest) -> Result<Teacher>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Teacher>>;
    async fn list(&self) -> Result<Vec<Teacher>>;
    async fn update(&self, id: Uuid, update: UpdateTeacherRequest) -> Result<Teacher>;
    async fn delete(&self, id: Uuid) -> Result<()>;
}

#[async_trait]
pub trait TestimonialRepository: Send + Sync {
    async fn create(&self, testimonial: CreateTestimonialRequest) -> Result<Testimonial>;
    async fn list_published(&self) -> Result<Vec<Testimonial>>;
    async fn list(&self) -> Result<Vec<Testimonial>>;
    async fn delete(&self, id: Uuid) -> Result<()>;
}

fn parse_uuid(s: &str) -> Result<Uuid> {
    Uuid::parse_str(s).map_err(|e| AppError::Database(e.to_string()))
}

#[derive(FromRow)]
struct CategoryRow {
    id: String,
    name: String,
    slug: String,
    created_at: NaiveDateTime,
}

fn row_to_category(row: CategoryRow) -> Result<Category> {
    Ok(Category {
        id: parse_uuid(&row.id)?,
        name: row.name,
        slug: row.slug,
        created_at: DateTime::from_naive_utc_and_offset(row.created_at, Utc),
    })
}

pub struct SqliteCategoryRepository {
    pool: SqlitePool,
}

impl SqliteCategoryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CategoryRepository for SqliteCategoryRepository {
    async fn create(&self, category: CreateCategoryRequest) -> Result<Category> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();
        let now = Utc::now().naive_utc();

        sqlx::query("INSERT INTO categories (id, name, slug, created_at) VALUES (?, ?, ?, ?)")
            .bind(&id_str)
            .bind(&category.name)
            .bind(&category.slug)
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        self.find_by_id(id).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve created category".to_string())
        })
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Category>> {
        let id_str = id.to_string();
        let row = sqlx::query_as::<_, CategoryRow>(
            "SELECT id, name, slug, created_at FROM categories WHERE id = ?"
        )
        .bind(id_str)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        match row {
            Some(r) => Ok(Some(row_to_category(r)?)),
            None => Ok(None),
        }
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>> {
        let row = sqlx::query_as::<_, CategoryRow>(
            "SELECT id, name, slug, created_at FROM categories WHERE slug = ?"
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        match row {
            Some(r) => Ok(Some(row_to_category(r)?)),
            None => Ok(None),
        }
    }

    async fn list(&self) -> Result<Vec<Category>> {
        let rows = sqlx::query_as::<_, CategoryRow>(
            "SELECT id, name, slug, created_at FROM categories ORDER BY name"
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter().map(row_to_category).collect()
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let id_str = id.to_string();
        sqlx::query("DELETE FROM categories WHERE id = ?")
            .bind(&id_str)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }
}

#[derive(FromRow)]
struct TeacherRow {
    id: String,
    full_name: String,
    title: Option<String>,
    bio: Option<String>,
    avatar_url: Option<String>,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

fn row_to_teacher(row: TeacherRow) -> Result<Teacher> {
    Ok(Teacher {
        id: parse_uuid(&row.id)?,
        full_name: row.full_name,
        title: row.title,
        bio: row.bio,
        avatar_url: row.avatar_url,
        created_at: DateTime::from_naive_utc_and_offset(row.created_at, Utc),
        updated_at: DateTime::from_naive_utc_and_offset(row.updated_at, Utc),
    })
}

pub struct SqliteTeacherRepository {
    pool: SqlitePool,
}

impl SqliteTeacherRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TeacherRepository for SqliteTeacherRepository {
    async fn create(&self, teacher: CreateTeacherRequest) -> Result<Teacher> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();
        let now = Utc::now().naive_utc();

        sqlx::query(
            r#"
            INSERT INTO teachers (id, full_name, title, bio, avatar_url, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#
        )
        .bind(&id_str)
        .bind(&teacher.full_name)
        .bind(&teacher.title)
        .bind(&teacher.bio)
        .bind(&teacher.avatar_url)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        self.find_by_id(id).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve created teacher".to_string())
        })
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Teacher>> {
        let id_str = id.to_string();
        let row = sqlx::query_as::<_, TeacherRow>(
            "SELECT id, full_name, title, bio, avatar_url, created_at, updated_at \
             FROM teachers WHERE id = ?"
        )
        .bind(id_str)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        match row {
            Some(r) => Ok(Some(row_to_teacher(r)?)),
            None => Ok(None),
        }
    }

    async fn list(&self) -> Result<Vec<Teacher>> {
        let rows = sqlx::query_as::<_, TeacherRow>(
            "SELECT id, full_name, title, bio, avatar_url, created_at, updated_at \
             FROM teachers ORDER BY full_name"
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter().map(row_to_teacher).collect()
    }

    async fn update(&self, id: Uuid, update: UpdateTeacherRequest) -> Result<Teacher> {
        let id_str = id.to_string();
        let now = Utc::now().naive_utc();

        sqlx::query(
            r#"
            UPDATE teachers
            SET full_name = COALESCE(?, full_name),
                title = COALESCE(?, title),
                bio = COALESCE(?, bio),
                avatar_url = COALESCE(?, avatar_url),
                updated_at = ?
            WHERE id = ?
            "#
        )
        .bind(&update.full_name)
        .bind(&update.title)
        .bind(&update.bio)
        .bind(&update.avatar_url)
        .bind(now)
        .bind(&id_str)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        self.find_by_id(id).await?.ok_or_else(|| {
            AppError::NotFound("Teacher not found".to_string())
        })
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let id_str = id.to_string();
        sqlx::query("DELETE FROM teachers WHERE id = ?")
            .bind(&id_str)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }
}

#[derive(FromRow)]
struct TestimonialRow {
    id: String,
    student_name: String,
    content: String,
    rating: i64,
    avatar_url: Option<String>,
    is_published: bool,
    created_at: NaiveDateTime,
}

fn row_to_testimonial(row: TestimonialRow) -> Result<Testimonial> {
    Ok(Testimonial {
        id: parse_uuid(&row.id)?,
        student_name: row.student_name,
        content: row.content,
        rating: row.rating,
        avatar_url: row.avatar_url,
        is_published: row.is_published,
        created_at: DateTime::from_naive_utc_and_offset(row.created_at, Utc),
    })
}

pub struct SqliteTestimonialRepository {
    pool: SqlitePool,
}

impl SqliteTestimonialRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TestimonialRepository for SqliteTestimonialRepository {
    async fn create(&self, testimonial: CreateTestimonialRequest) -> Result<Testimonial> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();
        let now = Utc::now().naive_utc();

        sqlx::query(
            r#"
            INSERT INTO testimonials (id, student_name, content, rating, avatar_url, is_published, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#
        )
        .bind(&id_str)
        .bind(&testimonial.student_name)
        .bind(&testimonial.content)
        .bind(testimonial.rating)
        .bind(&testimonial.avatar_url)
        .bind(testimonial.is_published)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        let row = sqlx::query_as::<_, TestimonialRow>(
            "SELECT id, student_name, content, rating, avatar_url, is_published, created_at \
             FROM testimonials WHERE id = ?"
        )
        .bind(&id_str)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        row_to_testimonial(row)
    }

    async fn list_published(&self) -> Result<Vec<Testimonial>> {
        let rows = sqlx::query_as::<_, TestimonialRow>(
            "SELECT id, student_name, content, rating, avatar_url, is_published, created_at \
             FROM testimonials WHERE is_published = 1 ORDER BY created_at DESC"
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter().map(row_to_testimonial).collect()
    }

    async fn list(&self) -> Result<Vec<Testimonial>> {
        let rows = sqlx::query_as::<_, TestimonialRow>(
            "SELECT id, student_name, content, rating, avatar_url, is_published, created_at \
             FROM testimonials ORDER BY created_at DESC"
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter().map(row_to_testimonial).collect()
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let id_str = id.to_string();
        sqlx::query("DELETE FROM testimonials WHERE id = ?")
            .bind(&id_str)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }
}

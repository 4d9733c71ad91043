use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::{
    domain::Enrollment,
    error::{AppError, Result},
    repository::EnrollmentRepository,
};

#[derive(FromRow)]
struct EnrollmentRow {
    id: String,
    user_id: String,
    course_id: String,
    progress_percentage: i64,
    enrolled_at: NaiveDateTime,
    completed_at: Option<NaiveDateTime>,
}

pub struct SqliteEnrollmentRepository {
    pool: SqlitePool,
}

impl SqliteEnrollmentRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_enrollment(row: EnrollmentRow) -> Result<Enrollment> {
        Ok(Enrollment {
            id: Uuid::parse_str(&row.id).map_err(|e| AppError::Database(e.to_string()))?,
            user_id: Uuid::parse_str(&row.user_id).map_err(|e| AppError::Database(e.to_string()))?,
            course_id: Uuid::parse_str(&row.course_id).map_err(|e| AppError::Database(e.to_string()))?,
            progress_percentage: row.progress_percentage,
            enrolled_at: DateTime::from_naive_utc_and_offset(row.enrolled_at, Utc),
            completed_at: row.completed_at.map(|dt| DateTime::from_naive_utc_and_offset(dt, Utc)),
        })
    }
}

#[async_trait]
impl EnrollmentRepository for SqliteEnrollmentRepository {
    async fn create(&self, user_id: Uuid, course_id: Uuid) -> Result<Option<Enrollment>> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();
        let user_id_str = user_id.to_string();
        let course_id_str = course_id.to_string();
        let now = Utc::now().naive_utc();

        // The UNIQUE(user_id, course_id) constraint makes this safe under
        // concurrent submissions for the same pair.
        let result = sqlx::query(
            r#"
            INSERT INTO enrollments (id, user_id, course_id, progress_percentage, enrolled_at)
            VALUES (?, ?, ?, 0, ?)
            ON CONFLICT(user_id, course_id) DO NOTHING
            "#
        )
        .bind(&id_str)
        .bind(&user_id_str)
        .bind(&course_id_str)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        Ok(Some(self.find(user_id, course_id).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve created enrollment".to_string())
        })?))
    }

    async fn find(&self, user_id: Uuid, course_id: Uuid) -> Result<Option<Enrollment>> {
        let user_id_str = user_id.to_string();
        let course_id_str = course_id.to_string();

        let row = sqlx::query_as::<_, EnrollmentRow>(
            r#"
            SELECT id, user_id, course_id, progress_percentage, enrolled_at, completed_at
            FROM enrollments
            WHERE user_id = ? AND course_id = ?
            "#
        )
        .bind(user_id_str)
        .bind(course_id_str)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        match row {
            Some(r) => Ok(Some(Self::row_to_enrollment(r)?)),
            None => Ok(None),
        }
    }

    async fn exists(&self, user_id: Uuid, course_id: Uuid) -> Result<bool> {
        Ok(self.find(user_id, course_id).await?.is_some())
    }

    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Enrollment>> {
        let user_id_str = user_id.to_string();
        let rows = sqlx::query_as::<_, EnrollmentRow>(
            r#"
            SELECT id, user_id, course_id, progress_percentage, enrolled_at, completed_at
            FROM enrollments
            WHERE user_id = ?
            ORDER BY enrolled_at DESC
            "#
        )
        .bind(user_id_str)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter().map(Self::row_to_enrollment).collect()
    }

    async fn list_by_course(&self, course_id: Uuid) -> Result<Vec<Enrollment>> {
        let course_id_str = course_id.to_string();
        let rows = sqlx::query_as::<_, EnrollmentRow>(
            r#"
            SELECT id, user_id, course_id, progress_percentage, enrolled_at, completed_at
            FROM enrollments
            WHERE course_id = ?
            ORDER BY enrolled_at DESC
            "#
        )
        .bind(course_id_str)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter().map(Self::row_to_enrollment).collect()
    }

    async fn update_progress(
        &self,
        user_id: Uuid,
        course_id: Uuid,
        progress_percentage: i64,
        completed_at: Option<DateTime<Utc>>,
    ) -> Result<()> {
        let user_id_str = user_id.to_string();
        let course_id_str = course_id.to_string();
        let completed_at_naive = completed_at.map(|dt| dt.naive_utc());

        sqlx::query(
            r#"
            UPDATE enrollments
            SET progress_percentage = ?,
                completed_at = COALESCE(completed_at, ?)
            WHERE user_id = ? AND course_id = ?
            "#
        )
        .bind(progress_percentage)
        .bind(completed_at_naive)
        .bind(&user_id_str)
        .bind(&course_id_str)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }

    async fn mark_lesson_complete(&self, user_id: Uuid, lesson_id: Uuid) -> Result<bool> {
        let id = Uuid::new_v4().to_string();
        let user_id_str = user_id.to_string();
        let lesson_id_str = lesson_id.to_string();
        let now = Utc::now().naive_utc();

        let result = sqlx::query(
            r#"
            INSERT INTO lesson_progress (id, user_id, lesson_id, completed_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(user_id, lesson_id) DO NOTHING
            "#
        )
        .bind(&id)
        .bind(&user_id_str)
        .bind(&lesson_id_str)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }

    async fn count_completed_lessons(&self, user_id: Uuid, course_id: Uuid) -> Result<i64> {
        let user_id_str = user_id.to_string();
        let course_id_str = course_id.to_string();

        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM lesson_progress lp
            JOIN lessons l ON l.id = lp.lesson_id
            JOIN sections s ON s.id = l.section_id
            WHERE lp.user_id = ? AND s.course_id = ?
            "#
        )
        .bind(&user_id_str)
        .bind(&course_id_str)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(count)
    }

    async fn count(&self) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM enrollments")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(count)
    }
}

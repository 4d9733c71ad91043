use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::{
    domain::{CreateNotificationRequest, Notification, NotificationKind},
    error::{AppError, Result},
    repository::NotificationRepository,
};

#[derive(FromRow)]
struct NotificationRow {
    id: String,
    user_id: String,
    title: String,
    message: String,
    kind: String,
    is_read: bool,
    created_at: NaiveDateTime,
}

pub struct SqliteNotificationRepository {
    pool: SqlitePool,
}

impl SqliteNotificationRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_notification(row: NotificationRow) -> Result<Notification> {
        Ok(Notification {
            id: Uuid::parse_str(&row.id).map_err(|e| AppError::Database(e.to_string()))?,
            user_id: Uuid::parse_str(&row.user_id).map_err(|e| AppError::Database(e.to_string()))?,
            title: row.title,
            message: row.message,
            kind: parse_kind(&row.kind)?,
            is_read: row.is_read,
            created_at: DateTime::from_naive_utc_and_offset(row.created_at, Utc),
        })
    }
}

fn parse_kind(s: &str) -> Result<NotificationKind> {
    match s {
        "Payment" => Ok(NotificationKind::Payment),
        "Enrollment" => Ok(NotificationKind::Enrollment),
        "System" => Ok(NotificationKind::System),
        _ => Err(AppError::Database(format!("Invalid notification kind: {}", s))),
    }
}

pub(crate) fn kind_to_str(kind: &NotificationKind) -> &'static str {
    match kind {
        NotificationKind::Payment => "Payment",
        NotificationKind::Enrollment => "Enrollment",
        NotificationKind::System => "System",
    }
}

#[async_trait]
impl NotificationRepository for SqliteNotificationRepository {
    async fn create(&self, notification: CreateNotificationRequest) -> Result<Notification> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();
        let user_id_str = notification.user_id.to_string();
        let kind_str = kind_to_str(&notification.kind);
        let now = Utc::now().naive_utc();

        sqlx::query(
            r#"
            INSERT INTO notifications (id, user_id, title, message, kind, is_read, created_at)
            VALUES (?, ?, ?, ?, ?, 0, ?)
            "#
        )
        .bind(&id_str)
        .bind(&user_id_str)
        .bind(&notification.title)
        .bind(&notification.message)
        .bind(kind_str)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        let row = sqlx::query_as::<_, NotificationRow>(
            "SELECT id, user_id, title, message, kind, is_read, created_at \
             FROM notifications WHERE id = ?"
        )
        .bind(&id_str)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Self::row_to_notification(row)
    }

    async fn list_by_user(&self, user_id: Uuid, limit: i64, offset: i64) -> Result<Vec<Notification>> {
        let user_id_str = user_id.to_string();
        let rows = sqlx::query_as::<_, NotificationRow>(
            "SELECT id, user_id, title, message, kind, is_read, created_at \
             FROM notifications WHERE user_id = ? \
             ORDER BY created_at DESC LIMIT ? OFFSET ?"
        )
        .bind(user_id_str)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter().map(Self::row_to_notification).collect()
    }

    async fn mark_read(&self, id: Uuid, user_id: Uuid) -> Result<bool> {
        let id_str = id.to_string();
        let user_id_str = user_id.to_string();

        let result = sqlx::query(
            "UPDATE notifications SET is_read = 1 WHERE id = ? AND user_id = ?"
        )
        .bind(&id_str)
        .bind(&user_id_str)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }

    async fn unread_count(&self, user_id: Uuid) -> Result<i64> {
        let user_id_str = user_id.to_string();
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM notifications WHERE user_id = ? AND is_read = 0"
        )
        .bind(user_id_str)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(count)
    }
}

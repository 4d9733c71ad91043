use async_trait::async_trait;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::{domain::Role, error::Result};

/// Capability check for privileged routes. Production backs it with the
/// user_roles table; tests swap in `StaticRolePolicy`.
#[async_trait]
pub trait RolePolicy: Send + Sync {
    async fn is_admin(&self, user_id: Uuid) -> Result<bool>;
}

pub struct SqliteRolePolicy {
    pool: SqlitePool,
}

impl SqliteRolePolicy {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn grant(&self, user_id: Uuid, role: Role) -> Result<()> {
        let user_id_str = user_id.to_string();
        sqlx::query(
            "INSERT INTO user_roles (user_id, role) VALUES (?, ?) ON CONFLICT(user_id, role) DO NOTHING"
        )
        .bind(&user_id_str)
        .bind(role.as_str())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn revoke(&self, user_id: Uuid, role: Role) -> Result<()> {
        let user_id_str = user_id.to_string();
        sqlx::query("DELETE FROM user_roles WHERE user_id = ? AND role = ?")
            .bind(&user_id_str)
            .bind(role.as_str())
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

#[async_trait]
impl RolePolicy for SqliteRolePolicy {
    async fn is_admin(&self, user_id: Uuid) -> Result<bool> {
        let user_id_str = user_id.to_string();
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM user_roles WHERE user_id = ? AND role = ?"
        )
        .bind(&user_id_str)
        .bind(Role::Admin.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(count > 0)
    }
}

/// Fixed admin set, for tests and one-off tooling.
#[derive(Default)]
pub struct StaticRolePolicy {
    admins: Vec<Uuid>,
}

impl StaticRolePolicy {
    pub fn new(admins: Vec<Uuid>) -> Self {
        Self { admins }
    }
}

#[async_trait]
impl RolePolicy for StaticRolePolicy {
    async fn is_admin(&self, user_id: Uuid) -> Result<bool> {
        Ok(self.admins.contains(&user_id))
    }
}

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::{
    domain::{CouponCode, CreateCouponRequest, DiscountType, UpdateCouponRequest},
    error::{AppError, Result},
    repository::CouponRepository,
};

#[derive(FromRow)]
struct CouponRow {
    id: String,
    code: String,
    discount_type: String,
    discount_value: i64,
    max_uses: Option<i64>,
    used_count: i64,
    min_purchase_amount: i64,
    valid_from: NaiveDateTime,
    valid_until: Option<NaiveDateTime>,
    is_active: bool,
    course_id: Option<String>,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

pub struct SqliteCouponRepository {
    pool: SqlitePool,
}

const COUPON_COLUMNS: &str = "id, code, discount_type, discount_value, max_uses, used_count, \
     min_purchase_amount, valid_from, valid_until, is_active, course_id, created_at, updated_at";

impl SqliteCouponRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_coupon(row: CouponRow) -> Result<CouponCode> {
        Ok(CouponCode {
            id: Uuid::parse_str(&row.id).map_err(|e| AppError::Database(e.to_string()))?,
            code: row.code,
            discount_type: parse_discount_type(&row.discount_type)?,
            discount_value: row.discount_value,
            max_uses: row.max_uses,
            used_count: row.used_count,
            min_purchase_amount: row.min_purchase_amount,
            valid_from: DateTime::from_naive_utc_and_offset(row.valid_from, Utc),
            valid_until: row.valid_until.map(|dt| DateTime::from_naive_utc_and_offset(dt, Utc)),
            is_active: row.is_active,
            course_id: row
                .course_id
                .as_deref()
                .map(Uuid::parse_str)
                .transpose()
                .map_err(|e| AppError::Database(e.to_string()))?,
            created_at: DateTime::from_naive_utc_and_offset(row.created_at, Utc),
            updated_at: DateTime::from_naive_utc_and_offset(row.updated_at, Utc),
        })
    }
}

fn parse_discount_type(s: &str) -> Result<DiscountType> {
    match s {
        "Percentage" => Ok(DiscountType::Percentage),
        "Fixed" => Ok(DiscountType::Fixed),
        _ => Err(AppError::Database(format!("Invalid discount type: {}", s))),
    }
}

fn discount_type_to_str(discount_type: &DiscountType) -> &'static str {
    match discount_type {
        DiscountType::Percentage => "Percentage",
        DiscountType::Fixed => "Fixed",
    }
}

#[async_trait]
impl CouponRepository for SqliteCouponRepository {
    async fn create(&self, coupon: CreateCouponRequest) -> Result<CouponCode> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();
        let code = coupon.code.trim().to_uppercase();
        let type_str = discount_type_to_str(&coupon.discount_type);
        let course_id_str = coupon.course_id.map(|u| u.to_string());
        let now = Utc::now();
        let valid_from_naive = coupon.valid_from.unwrap_or(now).naive_utc();
        let valid_until_naive = coupon.valid_until.map(|dt| dt.naive_utc());
        let now_naive = now.naive_utc();

        sqlx::query(
            r#"
            INSERT INTO coupon_codes (
                id, code, discount_type, discount_value, max_uses, used_count,
                min_purchase_amount, valid_from, valid_until, is_active, course_id,
                created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, 0, ?, ?, ?, ?, ?, ?, ?)
            "#
        )
        .bind(&id_str)
        .bind(&code)
        .bind(type_str)
        .bind(coupon.discount_value)
        .bind(coupon.max_uses)
        .bind(coupon.min_purchase_amount)
        .bind(valid_from_naive)
        .bind(valid_until_naive)
        .bind(coupon.is_active)
        .bind(&course_id_str)
        .bind(now_naive)
        .bind(now_naive)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        self.find_by_id(id).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve created coupon".to_string())
        })
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<CouponCode>> {
        let id_str = id.to_string();
        let row = sqlx::query_as::<_, CouponRow>(
            &format!("SELECT {COUPON_COLUMNS} FROM coupon_codes WHERE id = ?")
        )
        .bind(id_str)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        match row {
            Some(r) => Ok(Some(Self::row_to_coupon(r)?)),
            None => Ok(None),
        }
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<CouponCode>> {
        let code = code.trim().to_uppercase();
        let row = sqlx::query_as::<_, CouponRow>(
            &format!("SELECT {COUPON_COLUMNS} FROM coupon_codes WHERE code = ?")
        )
        .bind(&code)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        match row {
            Some(r) => Ok(Some(Self::row_to_coupon(r)?)),
            None => Ok(None),
        }
    }

    async fn find_active_by_code(&self, code: &str) -> Result<Option<CouponCode>> {
        let code = code.trim().to_uppercase();
        let row = sqlx::query_as::<_, CouponRow>(
            &format!(
                "SELECT {COUPON_COLUMNS} FROM coupon_codes \
                 WHERE code = ? AND is_active = 1"
            )
        )
        .bind(&code)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        match row {
            Some(r) => Ok(Some(Self::row_to_coupon(r)?)),
            None => Ok(None),
        }
    }

    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<CouponCode>> {
        let rows = sqlx::query_as::<_, CouponRow>(
            &format!(
                "SELECT {COUPON_COLUMNS} FROM coupon_codes \
                 ORDER BY created_at DESC LIMIT ? OFFSET ?"
            )
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter().map(Self::row_to_coupon).collect()
    }

    async fn update(&self, id: Uuid, update: UpdateCouponRequest) -> Result<CouponCode> {
        let id_str = id.to_string();
        let type_str = update.discount_type.as_ref().map(discount_type_to_str);
        let course_id_str = update.course_id.map(|u| u.to_string());
        let valid_from_naive = update.valid_from.map(|dt| dt.naive_utc());
        let valid_until_naive = update.valid_until.map(|dt| dt.naive_utc());
        let now = Utc::now().naive_utc();

        sqlx::query(
            r#"
            UPDATE coupon_codes
            SET discount_type = COALESCE(?, discount_type),
                discount_value = COALESCE(?, discount_value),
                max_uses = COALESCE(?, max_uses),
                min_purchase_amount = COALESCE(?, min_purchase_amount),
                valid_from = COALESCE(?, valid_from),
                valid_until = COALESCE(?, valid_until),
                is_active = COALESCE(?, is_active),
                course_id = COALESCE(?, course_id),
                updated_at = ?
            WHERE id = ?
            "#
        )
        .bind(type_str)
        .bind(update.discount_value)
        .bind(update.max_uses)
        .bind(update.min_purchase_amount)
        .bind(valid_from_naive)
        .bind(valid_until_naive)
        .bind(update.is_active)
        .bind(&course_id_str)
        .bind(now)
        .bind(&id_str)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        self.find_by_id(id).await?.ok_or_else(|| {
            AppError::NotFound("Coupon not found".to_string())
        })
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let id_str = id.to_string();
        sqlx::query("DELETE FROM coupon_codes WHERE id = ?")
            .bind(&id_str)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }
}

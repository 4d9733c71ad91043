use axum::{extract::State, Json};
use serde::Serialize;

use crate::{
    api::state::AppState,
    domain::PaymentStatus,
    error::Result,
};

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub total_courses: i64,
    pub total_users: i64,
    pub total_enrollments: i64,
    pub pending_payments: i64,
    pub completed_revenue: i64,
}

pub async fn stats(State(state): State<AppState>) -> Result<Json<StatsResponse>> {
    let ctx = &state.service_context;

    let total_courses = ctx.course_repo.count().await?;
    let total_users = ctx.user_repo.count().await?;
    let total_enrollments = ctx.enrollment_repo.count().await?;
    let pending_payments = ctx.payment_repo.count_by_status(PaymentStatus::Pending).await?;
    let completed_revenue = ctx.payment_repo.completed_revenue().await?;

    Ok(Json(StatsResponse {
        total_courses,
        total_users,
        total_enrollments,
        pending_payments,
        completed_revenue,
    }))
}

//! Adherence progress endpoint.

use axum::extract::{Query, State};
use axum::Json;
use chrono::{Duration, Local};
use serde::Deserialize;

use crate::adherence;
use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::db::repository;
use crate::models::ProgressReport;

/// Longest reporting window a client may request.
const MAX_REPORT_DAYS: u32 = 365;

#[derive(Deserialize)]
pub struct ProgressQuery {
    pub days: Option<u32>,
}

/// `GET /api/progress` — adherence report over the trailing `days`
/// window (default 30), ending now.
pub async fn report(
    State(ctx): State<ApiContext>,
    Query(query): Query<ProgressQuery>,
) -> Result<Json<ProgressReport>, ApiError> {
    let days = query.days.unwrap_or(30);
    if days == 0 || days > MAX_REPORT_DAYS {
        return Err(ApiError::BadRequest(format!(
            "days must be between 1 and {MAX_REPORT_DAYS}, got {days}"
        )));
    }

    let period_end = Local::now().naive_local();
    let period_start = period_end - Duration::days(i64::from(days));

    let conn = ctx.open_db()?;
    let doses = repository::list_dose_logs_in_period(&conn, &period_start, &period_end)?;
    let active_count = repository::count_active_schedules(&conn)?;

    let report = adherence::compute_adherence(&doses, active_count, period_start, period_end)?;

    tracing::debug!(
        days,
        instances = report.stats.total_doses_scheduled,
        rate = report.stats.adherence_rate,
        "progress report computed"
    );

    Ok(Json(report))
}

//! Medication schedule endpoints.
//!
//! Creating a schedule also materializes its dose instances for the
//! configured horizon; deleting one removes the instances with it.

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::Local;
use serde::Deserialize;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, SuccessResponse};
use crate::db::repository;
use crate::dosing;
use crate::models::{MedicationSchedule, ScheduleInput, ScheduleUpdate};

#[derive(Deserialize)]
pub struct MedicationListQuery {
    pub active_only: Option<bool>,
}

/// `POST /api/medications` — create a schedule and generate its dose
/// instances.
///
/// The time list is validated before anything is written: a malformed
/// entry rejects the whole request and leaves no schedule and no dose
/// logs behind.
pub async fn create(
    State(ctx): State<ApiContext>,
    Json(input): Json<ScheduleInput>,
) -> Result<Json<MedicationSchedule>, ApiError> {
    dosing::validate_times(&input.specific_times)?;

    let conn = ctx.open_db()?;
    let now = Local::now().naive_local();

    let schedule = MedicationSchedule {
        id: Uuid::new_v4(),
        drug_id: input.drug_id,
        drug_name: input.drug_name,
        dosage: input.dosage,
        dosage_form: input.dosage_form,
        frequency: input.frequency,
        custom_frequency: input.custom_frequency,
        times_per_day: input.times_per_day,
        specific_times: input.specific_times,
        start_date: input.start_date.unwrap_or(now),
        end_date: input.end_date,
        duration_days: input.duration_days,
        with_food: input.with_food,
        special_instructions: input.special_instructions,
        reminder_enabled: input.reminder_enabled,
        reminder_minutes_before: input.reminder_minutes_before,
        active: true,
        created_at: now,
        updated_at: now,
    };

    repository::insert_schedule(&conn, &schedule)?;

    let doses = dosing::generate_doses(&schedule, ctx.horizon_days)?;
    repository::insert_dose_logs(&conn, &doses)?;

    tracing::info!(
        medication_id = %schedule.id,
        drug_name = %schedule.drug_name,
        doses_generated = doses.len(),
        horizon_days = ctx.horizon_days,
        "medication schedule created"
    );

    Ok(Json(schedule))
}

/// `GET /api/medications` — list schedules, newest first. Defaults to
/// active schedules only; pass `?active_only=false` for everything.
pub async fn list(
    State(ctx): State<ApiContext>,
    Query(query): Query<MedicationListQuery>,
) -> Result<Json<Vec<MedicationSchedule>>, ApiError> {
    let conn = ctx.open_db()?;
    let schedules = repository::list_schedules(&conn, query.active_only.unwrap_or(true))?;
    Ok(Json(schedules))
}

/// `GET /api/medications/:id` — fetch a single schedule.
pub async fn detail(
    State(ctx): State<ApiContext>,
    Path(medication_id): Path<String>,
) -> Result<Json<MedicationSchedule>, ApiError> {
    let conn = ctx.open_db()?;
    let id = parse_medication_id(&medication_id)?;

    let schedule = repository::get_schedule(&conn, &id)?
        .ok_or_else(|| ApiError::NotFound("Medication not found".into()))?;

    Ok(Json(schedule))
}

/// `PUT /api/medications/:id` — partial update. Already-generated dose
/// instances are left untouched, including when the time list changes.
pub async fn update(
    State(ctx): State<ApiContext>,
    Path(medication_id): Path<String>,
    Json(update): Json<ScheduleUpdate>,
) -> Result<Json<MedicationSchedule>, ApiError> {
    if let Some(times) = &update.specific_times {
        dosing::validate_times(times)?;
    }

    let conn = ctx.open_db()?;
    let id = parse_medication_id(&medication_id)?;

    let schedule = repository::update_schedule(&conn, &id, &update, Local::now().naive_local())?;
    Ok(Json(schedule))
}

/// `DELETE /api/medications/:id` — delete a schedule and every dose log
/// generated from it.
pub async fn remove(
    State(ctx): State<ApiContext>,
    Path(medication_id): Path<String>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let conn = ctx.open_db()?;
    let id = parse_medication_id(&medication_id)?;

    let removed_logs = repository::delete_schedule_cascade(&conn, &id)?;
    tracing::info!(
        medication_id = %id,
        dose_logs_removed = removed_logs,
        "medication schedule deleted"
    );

    Ok(Json(SuccessResponse::new("Medication deleted successfully")))
}

fn parse_medication_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|e| ApiError::BadRequest(format!("Invalid medication ID: {e}")))
}

//! Dose log endpoints: manual logging, filtered listing, status
//! updates, and the mark-taken quick action.

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::{Local, NaiveDateTime};
use serde::Deserialize;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::db::repository::{self, DoseLogFilter};
use crate::models::enums::DoseStatus;
use crate::models::{DoseInput, DoseLog, DoseUpdate};

#[derive(Deserialize)]
pub struct DoseListQuery {
    pub medication_id: Option<Uuid>,
    pub status: Option<DoseStatus>,
    pub start_date: Option<NaiveDateTime>,
    pub end_date: Option<NaiveDateTime>,
}

#[derive(Deserialize)]
pub struct TakeQuery {
    pub notes: Option<String>,
}

/// `POST /api/doses` — log a dose by hand, typically for as-needed
/// medications with no generated instances.
pub async fn create(
    State(ctx): State<ApiContext>,
    Json(input): Json<DoseInput>,
) -> Result<Json<DoseLog>, ApiError> {
    let conn = ctx.open_db()?;
    let now = Local::now().naive_local();

    let dose = DoseLog {
        id: Uuid::new_v4(),
        medication_id: input.medication_id,
        drug_name: input.drug_name,
        dosage: input.dosage,
        scheduled_time: input.scheduled_time.unwrap_or(now),
        actual_time: input.actual_time,
        status: input.status.unwrap_or(DoseStatus::Scheduled),
        notes: input.notes,
        side_effects_reported: input.side_effects_reported,
        created_at: now,
        updated_at: now,
    };

    repository::insert_dose_log(&conn, &dose)?;
    Ok(Json(dose))
}

/// `GET /api/doses` — list dose logs, most recent scheduled first.
/// All filters are optional and combine; date bounds are inclusive.
pub async fn list(
    State(ctx): State<ApiContext>,
    Query(query): Query<DoseListQuery>,
) -> Result<Json<Vec<DoseLog>>, ApiError> {
    let conn = ctx.open_db()?;

    let filter = DoseLogFilter {
        medication_id: query.medication_id,
        status: query.status,
        from: query.start_date,
        to: query.end_date,
    };

    let doses = repository::list_dose_logs(&conn, &filter)?;
    Ok(Json(doses))
}

/// `GET /api/doses/:id` — fetch a single dose log.
pub async fn detail(
    State(ctx): State<ApiContext>,
    Path(dose_id): Path<String>,
) -> Result<Json<DoseLog>, ApiError> {
    let conn = ctx.open_db()?;
    let id = parse_dose_id(&dose_id)?;

    let dose = repository::get_dose_log(&conn, &id)?
        .ok_or_else(|| ApiError::NotFound("Dose log not found".into()))?;

    Ok(Json(dose))
}

/// `PUT /api/doses/:id` — partial update of status, actual time, notes,
/// or reported side effects.
pub async fn update(
    State(ctx): State<ApiContext>,
    Path(dose_id): Path<String>,
    Json(update): Json<DoseUpdate>,
) -> Result<Json<DoseLog>, ApiError> {
    let conn = ctx.open_db()?;
    let id = parse_dose_id(&dose_id)?;

    let dose = repository::update_dose_log(&conn, &id, &update, Local::now().naive_local())?;
    Ok(Json(dose))
}

/// `POST /api/doses/:id/take` — quick action: mark the dose taken now,
/// optionally attaching a note via the `notes` query parameter.
pub async fn take(
    State(ctx): State<ApiContext>,
    Path(dose_id): Path<String>,
    Query(query): Query<TakeQuery>,
) -> Result<Json<DoseLog>, ApiError> {
    let conn = ctx.open_db()?;
    let id = parse_dose_id(&dose_id)?;

    let dose = repository::mark_dose_taken(
        &conn,
        &id,
        query.notes.as_deref(),
        Local::now().naive_local(),
    )?;

    tracing::debug!(dose_id = %id, "dose marked taken");
    Ok(Json(dose))
}

fn parse_dose_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|e| ApiError::BadRequest(format!("Invalid dose ID: {e}")))
}

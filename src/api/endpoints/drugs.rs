//! Drug catalog endpoints.

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::Local;
use serde::Deserialize;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, SuccessResponse};
use crate::db::repository;
use crate::models::{Drug, DrugInput};

#[derive(Deserialize)]
pub struct DrugListQuery {
    pub search: Option<String>,
    pub category: Option<String>,
}

/// `POST /api/drugs` — add a drug to the catalog.
pub async fn create(
    State(ctx): State<ApiContext>,
    Json(input): Json<DrugInput>,
) -> Result<Json<Drug>, ApiError> {
    let conn = ctx.open_db()?;
    let now = Local::now().naive_local();

    let drug = Drug {
        id: Uuid::new_v4(),
        name: input.name,
        active_ingredient: input.active_ingredient,
        description: input.description,
        dosage_forms: input.dosage_forms,
        standard_dosages: input.standard_dosages,
        pharmacokinetics: input.pharmacokinetics,
        interactions: input.interactions,
        contraindications: input.contraindications,
        side_effects: input.side_effects,
        warnings: input.warnings,
        category: input.category,
        created_at: now,
        updated_at: now,
    };

    repository::insert_drug(&conn, &drug)?;
    tracing::debug!(drug_id = %drug.id, name = %drug.name, "drug created");

    Ok(Json(drug))
}

/// `GET /api/drugs` — list drugs, optionally filtered by a search term
/// (name or active ingredient, case-insensitive) and exact category.
pub async fn list(
    State(ctx): State<ApiContext>,
    Query(query): Query<DrugListQuery>,
) -> Result<Json<Vec<Drug>>, ApiError> {
    let conn = ctx.open_db()?;
    let drugs = repository::list_drugs(&conn, query.search.as_deref(), query.category.as_deref())?;
    Ok(Json(drugs))
}

/// `GET /api/drugs/:id` — fetch a single drug.
pub async fn detail(
    State(ctx): State<ApiContext>,
    Path(drug_id): Path<String>,
) -> Result<Json<Drug>, ApiError> {
    let conn = ctx.open_db()?;
    let id = parse_drug_id(&drug_id)?;

    let drug = repository::get_drug(&conn, &id)?
        .ok_or_else(|| ApiError::NotFound("Drug not found".into()))?;

    Ok(Json(drug))
}

/// `PUT /api/drugs/:id` — replace a drug's editable fields.
pub async fn update(
    State(ctx): State<ApiContext>,
    Path(drug_id): Path<String>,
    Json(input): Json<DrugInput>,
) -> Result<Json<Drug>, ApiError> {
    let conn = ctx.open_db()?;
    let id = parse_drug_id(&drug_id)?;

    let drug = repository::update_drug(&conn, &id, &input, Local::now().naive_local())?;
    Ok(Json(drug))
}

/// `DELETE /api/drugs/:id` — remove a drug from the catalog. Schedules
/// referencing it keep their denormalized name and dosage.
pub async fn remove(
    State(ctx): State<ApiContext>,
    Path(drug_id): Path<String>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let conn = ctx.open_db()?;
    let id = parse_drug_id(&drug_id)?;

    repository::delete_drug(&conn, &id)?;
    tracing::debug!(drug_id = %id, "drug deleted");

    Ok(Json(SuccessResponse::new("Drug deleted successfully")))
}

fn parse_drug_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|e| ApiError::BadRequest(format!("Invalid drug ID: {e}")))
}

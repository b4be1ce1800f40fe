//! Service banner and health check endpoints.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::config;
use crate::db;

#[derive(Serialize)]
pub struct BannerResponse {
    pub message: String,
    pub status: &'static str,
}

/// `GET /api/` — service banner.
pub async fn root() -> Json<BannerResponse> {
    Json(BannerResponse {
        message: format!("{} API v{}", config::APP_NAME, config::APP_VERSION),
        status: "active",
    })
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// `GET /api/health` — liveness check that also proves the database is
/// reachable, not just the process.
pub async fn check(State(ctx): State<ApiContext>) -> Result<Json<HealthResponse>, ApiError> {
    let conn = ctx.open_db()?;
    db::count_tables(&conn)?;

    Ok(Json(HealthResponse {
        status: "ok",
        version: config::APP_VERSION,
    }))
}

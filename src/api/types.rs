//! Shared types for the HTTP API layer.

use std::path::PathBuf;
use std::sync::Arc;

use rusqlite::Connection;
use serde::Serialize;

use crate::db::{self, DatabaseError};

/// Shared context for all API routes.
///
/// Holds the database location rather than a live handle: SQLite
/// connections are not `Sync`, so each request opens its own
/// short-lived connection instead.
#[derive(Clone)]
pub struct ApiContext {
    db_path: Arc<PathBuf>,
    pub horizon_days: u32,
}

impl ApiContext {
    pub fn new(db_path: PathBuf, horizon_days: u32) -> Self {
        Self {
            db_path: Arc::new(db_path),
            horizon_days,
        }
    }

    /// Open a connection to the application database.
    pub fn open_db(&self) -> Result<Connection, DatabaseError> {
        db::open_database(&self.db_path)
    }
}

/// Confirmation body for delete-style operations.
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
    pub message: String,
}

impl SuccessResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

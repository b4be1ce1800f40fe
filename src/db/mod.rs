pub mod repository;
pub mod sqlite;

pub use repository::*;
pub use sqlite::*;

use thiserror::Error;

/// Storage-layer failures, recoverable or not, as seen by callers of
/// the repository functions.
///
/// `Corrupted` is reserved for values that fail to decode out of TEXT
/// columns (datetimes, UUIDs, JSON lists). Those never come from user
/// input — the write path validates first — so hitting one means a bug
/// or a hand-edited database file, and the API maps it to a 500.
#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("schema migration v{version} did not apply: {reason}")]
    MigrationFailed { version: i64, reason: String },

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    #[error("unrecognized {field}: {value:?}")]
    InvalidEnum { field: String, value: String },

    #[error("corrupt {what} in stored row: {detail}")]
    Corrupted { what: &'static str, detail: String },
}

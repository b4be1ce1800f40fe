//! Connection setup and embedded schema migrations.
//!
//! Each migration runs inside its own transaction together with the
//! insert of its `schema_version` row, so a script that fails halfway
//! leaves the file at the previous version rather than half-applied.

use std::path::Path;

use rusqlite::{params, Connection};

use super::DatabaseError;

/// Migration scripts compiled into the binary, ordered by version.
/// Append-only: editing a shipped script changes nothing for databases
/// that already recorded its version.
const MIGRATIONS: &[(i64, &str)] = &[
    (1, include_str!("../../resources/migrations/001_initial.sql")),
];

/// Open the database file (creating it if absent) and bring its schema
/// up to date.
pub fn open_database(path: &Path) -> Result<Connection, DatabaseError> {
    let conn = Connection::open(path)?;
    configure_pragmas(&conn)?;
    run_migrations(&conn)?;
    Ok(conn)
}

/// In-memory database with the full schema, for tests.
pub fn open_memory_database() -> Result<Connection, DatabaseError> {
    let conn = Connection::open_in_memory()?;
    configure_pragmas(&conn)?;
    run_migrations(&conn)?;
    Ok(conn)
}

fn configure_pragmas(conn: &Connection) -> Result<(), DatabaseError> {
    // Handlers open one connection per request, so writers queue on the
    // file lock rather than erroring out.
    conn.execute_batch(
        "PRAGMA journal_mode=DELETE;
         PRAGMA foreign_keys=ON;
         PRAGMA busy_timeout=5000;",
    )?;
    Ok(())
}

/// Apply every migration newer than the version recorded in the file.
pub fn run_migrations(conn: &Connection) -> Result<(), DatabaseError> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_version (
             version INTEGER PRIMARY KEY,
             applied_at TEXT NOT NULL DEFAULT (datetime('now'))
         )",
        [],
    )?;

    let applied = schema_version(conn)?;

    for (version, sql) in MIGRATIONS {
        if *version <= applied {
            continue;
        }
        tracing::info!("Applying schema migration v{version}");
        apply_migration(conn, *version, sql).map_err(|e| DatabaseError::MigrationFailed {
            version: *version,
            reason: e.to_string(),
        })?;
    }

    Ok(())
}

/// One migration, one transaction: the script and its version row
/// commit together or not at all.
fn apply_migration(conn: &Connection, version: i64, sql: &str) -> rusqlite::Result<()> {
    let tx = conn.unchecked_transaction()?;
    tx.execute_batch(sql)?;
    tx.execute(
        "INSERT INTO schema_version (version) VALUES (?1)",
        params![version],
    )?;
    tx.commit()
}

/// Highest migration version this database has recorded, 0 for a fresh
/// file.
fn schema_version(conn: &Connection) -> Result<i64, DatabaseError> {
    let version = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |row| row.get(0),
    )?;
    Ok(version)
}

/// Number of user tables, surfaced by the health endpoint.
pub fn count_tables(conn: &Connection) -> Result<i64, DatabaseError> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'",
        [],
        |row| row.get::<_, i64>(0),
    )?;
    Ok(count)
}

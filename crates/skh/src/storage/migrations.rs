//! Database migration system for skh.
//!
//! Migrations are applied in version order, each inside its own transaction,
//! and recorded in the `schema_migrations` table so every script runs once.

use rusqlite::Connection;
use tracing::{debug, info};

use crate::error::{Error, Result};

use super::schema::{Migration, CREATE_MIGRATIONS_TABLE, MIGRATIONS};

/// The current schema version.
pub const CURRENT_VERSION: i32 = 3;

/// Initialize the database schema.
///
/// Creates the tracking table if needed, then applies every migration newer
/// than the recorded version.
///
/// # Errors
///
/// Returns an error if a migration script fails; that script's changes are
/// rolled back and later scripts are not attempted.
pub fn initialize_schema(conn: &Connection) -> Result<()> {
    conn.execute(CREATE_MIGRATIONS_TABLE, [])?;

    let version = get_schema_version(conn)?;
    debug!("Database schema at version {}", version);
    if version < CURRENT_VERSION {
        run_migrations(conn, version)?;
    }

    Ok(())
}

/// Get the current schema version from the database.
///
/// Returns 0 if no migration has been applied (fresh database).
///
/// # Errors
///
/// Returns an error if the tracking table cannot be read.
pub fn get_schema_version(conn: &Connection) -> Result<i32> {
    let version: i32 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
        [],
        |row| row.get(0),
    )?;
    Ok(version)
}

/// Run migrations from the given version to the current version.
fn run_migrations(conn: &Connection, from_version: i32) -> Result<()> {
    for migration in MIGRATIONS.iter().filter(|m| m.version > from_version) {
        run_migration(conn, migration)?;
    }
    info!("Database schema migrated to version {}", CURRENT_VERSION);
    Ok(())
}

/// Apply one migration and record its version atomically.
fn run_migration(conn: &Connection, migration: &Migration) -> Result<()> {
    info!(
        "Applying migration {} ({})",
        migration.version, migration.name
    );

    let tx = conn.unchecked_transaction()?;
    tx.execute_batch(migration.sql)
        .map_err(|e| Error::DatabaseMigration {
            message: format!(
                "migration {} ({}) failed: {e}",
                migration.version, migration.name
            ),
        })?;
    tx.execute(
        "INSERT INTO schema_migrations (version) VALUES (?1)",
        [migration.version],
    )?;
    tx.commit()?;
    Ok(())
}

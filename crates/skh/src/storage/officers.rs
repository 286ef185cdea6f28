//! Queries over the `petugas` table.

use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::error::Result;
use crate::model::{Officer, OfficerDraft, OfficerRole};

const SELECT_COLUMNS: &str = "SELECT id, nama, pangkat, nrp, jabatan, tipe FROM petugas";

fn row_to_officer(row: &Row<'_>) -> rusqlite::Result<Officer> {
    let role: String = row.get(5)?;
    let role = role.parse::<OfficerRole>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(5, Type::Text, e.to_string().into())
    })?;

    Ok(Officer {
        id: row.get(0)?,
        name: row.get(1)?,
        rank: row.get(2)?,
        service_number: row.get(3)?,
        position: row.get(4)?,
        role,
    })
}

/// Insert an officer, returning the assigned id.
///
/// # Errors
///
/// Returns an error if the database operation fails.
pub fn insert(conn: &Connection, draft: &OfficerDraft) -> Result<i64> {
    conn.execute(
        "INSERT INTO petugas (nama, pangkat, nrp, jabatan, tipe) VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            draft.name,
            draft.rank,
            draft.service_number,
            draft.position,
            draft.role.as_db_str(),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Get an officer by id.
///
/// # Errors
///
/// Returns an error if the database operation fails.
pub fn get(conn: &Connection, id: i64) -> Result<Option<Officer>> {
    let officer = conn
        .query_row(&format!("{SELECT_COLUMNS} WHERE id = ?1"), [id], row_to_officer)
        .optional()?;
    Ok(officer)
}

/// List officers ordered by name, optionally restricted to one role.
///
/// # Errors
///
/// Returns an error if the database operation fails.
pub fn list(conn: &Connection, role: Option<OfficerRole>) -> Result<Vec<Officer>> {
    let mut stmt = conn.prepare(&format!(
        "{SELECT_COLUMNS} WHERE ?1 IS NULL OR tipe = ?1 ORDER BY nama ASC, id ASC"
    ))?;
    let officers = stmt
        .query_map([role.map(OfficerRole::as_db_str)], row_to_officer)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(officers)
}

/// Overwrite an officer's fields. Returns `false` if not found.
///
/// # Errors
///
/// Returns an error if the database operation fails.
pub fn update(conn: &Connection, id: i64, draft: &OfficerDraft) -> Result<bool> {
    let affected = conn.execute(
        "UPDATE petugas SET nama = ?1, pangkat = ?2, nrp = ?3, jabatan = ?4, tipe = ?5 WHERE id = ?6",
        params![
            draft.name,
            draft.rank,
            draft.service_number,
            draft.position,
            draft.role.as_db_str(),
            id,
        ],
    )?;
    Ok(affected > 0)
}

/// Delete an officer. Returns `false` if not found.
///
/// Settings references to the officer are cleared by the foreign key.
///
/// # Errors
///
/// Returns an error if the database operation fails.
pub fn delete(conn: &Connection, id: i64) -> Result<bool> {
    let affected = conn.execute("DELETE FROM petugas WHERE id = ?1", [id])?;
    Ok(affected > 0)
}

/// Count registered officers.
///
/// # Errors
///
/// Returns an error if the database operation fails.
pub fn count(conn: &Connection) -> Result<i64> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM petugas", [], |row| row.get(0))?;
    Ok(count)
}

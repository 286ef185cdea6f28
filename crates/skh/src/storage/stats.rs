//! Aggregate reads backing the dashboard.
//!
//! Every timestamp is stored in the reference offset, so a prefix of the
//! stored text is already the local month (`YYYY-MM`) or day (`YYYY-MM-DD`).

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rusqlite::types::Type;
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Number of lost items recorded under one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCount {
    /// Item category.
    pub category: String,
    /// Items recorded in that category.
    pub total: i64,
}

/// Count all letters.
///
/// # Errors
///
/// Returns an error if the database operation fails.
pub fn total_letters(conn: &Connection) -> Result<i64> {
    super::letters::count(conn)
}

/// Count letters issued in the given calendar month.
///
/// # Errors
///
/// Returns an error if the database operation fails.
pub fn letters_in_month(conn: &Connection, year: i32, month: u32) -> Result<i64> {
    let prefix = format!("{year:04}-{month:02}");
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM surat WHERE substr(tanggal_surat, 1, 7) = ?1",
        [prefix],
        |row| row.get(0),
    )?;
    Ok(count)
}

/// Count lost items per category, most frequent first, ties by name.
///
/// # Errors
///
/// Returns an error if the database operation fails.
pub fn category_counts(conn: &Connection) -> Result<Vec<CategoryCount>> {
    let mut stmt = conn.prepare(
        r"
        SELECT jenis_barang, COUNT(*) AS total
        FROM barang
        GROUP BY jenis_barang
        ORDER BY total DESC, jenis_barang ASC
        ",
    )?;
    let counts = stmt
        .query_map([], |row| {
            Ok(CategoryCount {
                category: row.get(0)?,
                total: row.get(1)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(counts)
}

/// Count letters per day between `from` and `to`, inclusive.
///
/// Days without letters are absent from the map.
///
/// # Errors
///
/// Returns an error if the database operation fails.
pub fn daily_counts(
    conn: &Connection,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<BTreeMap<NaiveDate, i64>> {
    let mut stmt = conn.prepare(
        r"
        SELECT substr(tanggal_surat, 1, 10) AS day, COUNT(*)
        FROM surat
        WHERE substr(tanggal_surat, 1, 10) BETWEEN ?1 AND ?2
        GROUP BY day
        ",
    )?;
    let rows = stmt.query_map(
        params![from.format("%Y-%m-%d").to_string(), to.format("%Y-%m-%d").to_string()],
        |row| {
            let day: String = row.get(0)?;
            let day = NaiveDate::parse_from_str(&day, "%Y-%m-%d").map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(e))
            })?;
            Ok((day, row.get::<_, i64>(1)?))
        },
    )?;

    let mut counts = BTreeMap::new();
    for row in rows {
        let (day, total) = row?;
        counts.insert(day, total);
    }
    Ok(counts)
}

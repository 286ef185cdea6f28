//! Queries over the `surat` and `barang` tables.

use chrono::{DateTime, FixedOffset, SecondsFormat};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction};
use tracing::debug;

use crate::error::Result;
use crate::model::{Letter, LetterDraft, LetterSummary, LostItem, Reporter};

/// Format timestamps are written in. Rows are always stored in the
/// reference offset, so the first ten characters are the local date.
pub(crate) fn encode_timestamp(instant: &DateTime<FixedOffset>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Secs, false)
}

/// Parse a stored timestamp.
///
/// Also accepts the `2006-01-02 15:04:05.999-07:00` layout written by older
/// deployments.
pub(crate) fn decode_timestamp(raw: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f%:z"))
        .ok()
}

fn timestamp_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<FixedOffset>> {
    let raw: String = row.get(idx)?;
    decode_timestamp(&raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            Type::Text,
            format!("invalid timestamp: {raw}").into(),
        )
    })
}

/// Insert a new letter with its items.
///
/// Requires a transaction so the letter and its items land together.
///
/// # Errors
///
/// Returns an error if any insert fails, including a duplicate number.
pub fn insert(
    tx: &Transaction<'_>,
    number: &str,
    issued_at: &DateTime<FixedOffset>,
    draft: &LetterDraft,
) -> Result<i64> {
    let reporter = &draft.reporter;
    tx.execute(
        r"
        INSERT INTO surat (nomor_surat, tanggal_surat, pelapor_nama, pelapor_ttl,
            pelapor_agama, pelapor_kelamin, pelapor_pekerjaan, pelapor_alamat, lokasi_hilang)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        ",
        params![
            number,
            encode_timestamp(issued_at),
            reporter.name,
            reporter.birth_info,
            reporter.religion,
            reporter.sex,
            reporter.occupation,
            reporter.address,
            draft.loss_location,
        ],
    )?;

    let id = tx.last_insert_rowid();
    insert_items(tx, id, &draft.items)?;
    debug!("Inserted letter {} with id {}", number, id);
    Ok(id)
}

fn insert_items(conn: &Connection, letter_id: i64, items: &[LostItem]) -> Result<()> {
    let mut stmt =
        conn.prepare("INSERT INTO barang (surat_id, jenis_barang, data) VALUES (?1, ?2, ?3)")?;
    for item in items {
        stmt.execute(params![letter_id, item.category, item.description])?;
    }
    Ok(())
}

/// Replace a letter's mutable fields and its complete item list.
///
/// The number and issuance timestamp are left untouched. Returns `false` if
/// no letter has the given id.
///
/// # Errors
///
/// Returns an error if the database operation fails.
pub fn replace(tx: &Transaction<'_>, id: i64, draft: &LetterDraft) -> Result<bool> {
    let reporter = &draft.reporter;
    let affected = tx.execute(
        r"
        UPDATE surat SET pelapor_nama = ?1, pelapor_ttl = ?2, pelapor_agama = ?3,
            pelapor_kelamin = ?4, pelapor_pekerjaan = ?5, pelapor_alamat = ?6,
            lokasi_hilang = ?7
        WHERE id = ?8
        ",
        params![
            reporter.name,
            reporter.birth_info,
            reporter.religion,
            reporter.sex,
            reporter.occupation,
            reporter.address,
            draft.loss_location,
            id,
        ],
    )?;
    if affected == 0 {
        return Ok(false);
    }

    tx.execute("DELETE FROM barang WHERE surat_id = ?1", [id])?;
    insert_items(tx, id, &draft.items)?;
    Ok(true)
}

/// Get a letter with its items.
///
/// # Errors
///
/// Returns an error if the database operation fails.
pub fn get(conn: &Connection, id: i64) -> Result<Option<Letter>> {
    let letter = conn
        .query_row(
            r"
            SELECT id, nomor_surat, tanggal_surat, pelapor_nama, pelapor_ttl, pelapor_agama,
                pelapor_kelamin, pelapor_pekerjaan, pelapor_alamat, lokasi_hilang
            FROM surat WHERE id = ?1
            ",
            [id],
            |row| {
                Ok(Letter {
                    id: row.get(0)?,
                    number: row.get(1)?,
                    issued_at: timestamp_column(row, 2)?,
                    reporter: Reporter {
                        name: row.get(3)?,
                        birth_info: row.get(4)?,
                        religion: row.get(5)?,
                        sex: row.get(6)?,
                        occupation: row.get(7)?,
                        address: row.get(8)?,
                    },
                    loss_location: row.get(9)?,
                    items: Vec::new(),
                })
            },
        )
        .optional()?;

    let Some(mut letter) = letter else {
        return Ok(None);
    };
    letter.items = items(conn, id)?;
    Ok(Some(letter))
}

/// Get the items of a letter in insertion order.
///
/// # Errors
///
/// Returns an error if the database operation fails.
pub fn items(conn: &Connection, letter_id: i64) -> Result<Vec<LostItem>> {
    let mut stmt =
        conn.prepare("SELECT jenis_barang, data FROM barang WHERE surat_id = ?1 ORDER BY id")?;
    let items = stmt
        .query_map([letter_id], |row| {
            Ok(LostItem {
                category: row.get(0)?,
                description: row.get(1)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(items)
}

/// List letters newest first.
///
/// With a non-empty `filter`, only letters whose reporter name or number
/// contains it are returned. Matching ignores case for ASCII letters only,
/// since SQLite's `LIKE` does not fold other characters.
///
/// # Errors
///
/// Returns an error if the database operation fails.
pub fn list(conn: &Connection, filter: Option<&str>) -> Result<Vec<LetterSummary>> {
    let pattern = filter
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .map(|f| format!("%{}%", escape_like(f)));

    let mut stmt = conn.prepare(
        r"
        SELECT id, nomor_surat, tanggal_surat, pelapor_nama
        FROM surat
        WHERE ?1 IS NULL
            OR pelapor_nama LIKE ?1 ESCAPE '\'
            OR nomor_surat LIKE ?1 ESCAPE '\'
        ORDER BY id DESC
        ",
    )?;

    let letters = stmt
        .query_map([pattern], |row| {
            Ok(LetterSummary {
                id: row.get(0)?,
                number: row.get(1)?,
                issued_at: timestamp_column(row, 2)?,
                reporter_name: row.get(3)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(letters)
}

fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Delete a letter and, through the cascade, its items.
///
/// Returns `true` if a letter was deleted, `false` if not found.
///
/// # Errors
///
/// Returns an error if the database operation fails.
pub fn delete(conn: &Connection, id: i64) -> Result<bool> {
    let affected = conn.execute("DELETE FROM surat WHERE id = ?1", [id])?;
    Ok(affected > 0)
}

/// Count stored letters.
///
/// # Errors
///
/// Returns an error if the database operation fails.
pub fn count(conn: &Connection) -> Result<i64> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM surat", [], |row| row.get(0))?;
    Ok(count)
}

/// Restart the `surat` id sequence. Only meaningful while the table is empty.
///
/// # Errors
///
/// Returns an error if the database operation fails.
pub fn reset_id_sequence(conn: &Connection) -> Result<()> {
    conn.execute("DELETE FROM sqlite_sequence WHERE name = 'surat'", [])?;
    Ok(())
}

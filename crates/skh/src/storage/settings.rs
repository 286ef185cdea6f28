//! Queries over the `pengaturan` singleton row.

use rusqlite::{params, Connection};

use crate::error::Result;
use crate::model::{Settings, SettingsDetails, DEFAULT_NUMBER_FORMAT};

use super::officers;

/// Load the settings row.
///
/// A blank stored number format falls back to [`DEFAULT_NUMBER_FORMAT`] and a
/// blank logo path reads as no logo.
///
/// # Errors
///
/// Returns an error if the row cannot be read.
pub fn load(conn: &Connection) -> Result<Settings> {
    let settings = conn.query_row(
        r"
        SELECT kop_surat_1, kop_surat_2, kop_surat_3, logo_path, format_nomor_surat,
            last_nomor_surat, last_nomor_year, pejabat_id, penerima_id, wilayah, nama_kantor
        FROM pengaturan WHERE id = 1
        ",
        [],
        |row| {
            let logo_path: Option<String> = row.get(3)?;
            let number_format: String = row.get(4)?;
            Ok(Settings {
                letterhead: [row.get(0)?, row.get(1)?, row.get(2)?],
                logo_path: logo_path.filter(|p| !p.trim().is_empty()),
                number_format: if number_format.trim().is_empty() {
                    DEFAULT_NUMBER_FORMAT.to_string()
                } else {
                    number_format
                },
                last_issued_number: row.get(5)?,
                last_issued_year: row.get(6)?,
                signing_officer_id: row.get(7)?,
                receiving_officer_id: row.get(8)?,
                region: row.get(9)?,
                office_name: row.get(10)?,
            })
        },
    )?;
    Ok(settings)
}

/// Load the settings row with the designated officers resolved.
///
/// # Errors
///
/// Returns an error if any of the reads fail.
pub fn load_details(conn: &Connection) -> Result<SettingsDetails> {
    let settings = load(conn)?;
    let signing_officer = match settings.signing_officer_id {
        Some(id) => officers::get(conn, id)?,
        None => None,
    };
    let receiving_officer = match settings.receiving_officer_id {
        Some(id) => officers::get(conn, id)?,
        None => None,
    };

    Ok(SettingsDetails {
        settings,
        signing_officer,
        receiving_officer,
    })
}

/// Overwrite every column of the settings row.
///
/// # Errors
///
/// Returns an error if the update fails, e.g. an officer id that does not
/// exist.
pub fn save(conn: &Connection, settings: &Settings) -> Result<()> {
    let [line_1, line_2, line_3] = &settings.letterhead;
    conn.execute(
        r"
        UPDATE pengaturan SET kop_surat_1 = ?1, kop_surat_2 = ?2, kop_surat_3 = ?3,
            logo_path = ?4, format_nomor_surat = ?5, last_nomor_surat = ?6,
            last_nomor_year = ?7, pejabat_id = ?8, penerima_id = ?9, wilayah = ?10,
            nama_kantor = ?11
        WHERE id = 1
        ",
        params![
            line_1,
            line_2,
            line_3,
            settings.logo_path,
            settings.number_format,
            settings.last_issued_number,
            settings.last_issued_year,
            settings.signing_officer_id,
            settings.receiving_officer_id,
            settings.region,
            settings.office_name,
        ],
    )?;
    Ok(())
}

/// Record the number and year of the letter just issued.
///
/// # Errors
///
/// Returns an error if the update fails.
pub fn store_counter(conn: &Connection, number: i64, year: i32) -> Result<()> {
    conn.execute(
        "UPDATE pengaturan SET last_nomor_surat = ?1, last_nomor_year = ?2 WHERE id = 1",
        params![number, year],
    )?;
    Ok(())
}

/// Zero the counter and re-base it on `year`.
///
/// # Errors
///
/// Returns an error if the update fails.
pub fn reset_counter(conn: &Connection, year: i32) -> Result<()> {
    store_counter(conn, 0, year)
}

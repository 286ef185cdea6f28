//! Settings routes.
//!
//! The settings form is posted as `multipart/form-data` so the letterhead
//! logo can travel with the text fields.

use actix_multipart::{Field, Multipart, MultipartError};
use actix_web::web::{get, post, scope, Data};
use actix_web::{HttpResponse, Scope};
use futures_util::StreamExt;
use tracing::debug;

use crate::error::{Error, Result};
use crate::model::SettingsUpdate;
use crate::service::{LogoUpload, Services};

const API_PATH: &str = "/pengaturan";

/// Name of the multipart field carrying the logo.
const LOGO_FIELD: &str = "logo";

/// Cap on any single text field.
const MAX_TEXT_FIELD_BYTES: usize = 16 * 1024;

/// Routes under `/pengaturan`:
///
/// * `GET /pengaturan`: current settings and officer candidates
/// * `POST /pengaturan`: multipart update, optionally with a `logo` file
pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("", get().to(show))
        .route("", post().to(update))
}

async fn show(services: Data<Services>) -> Result<HttpResponse> {
    let view = services.settings.view().await?;
    Ok(HttpResponse::Ok().json(view))
}

async fn update(services: Data<Services>, payload: Multipart) -> Result<HttpResponse> {
    let max_logo_bytes = services.settings.uploads().max_bytes();
    let (update, logo) = read_form(payload, max_logo_bytes).await?;
    let details = services.settings.update(update, logo).await?;
    Ok(HttpResponse::Ok().json(details))
}

async fn read_form(
    mut payload: Multipart,
    max_logo_bytes: usize,
) -> Result<(SettingsUpdate, Option<LogoUpload>)> {
    let mut update = SettingsUpdate::default();
    let mut logo = None;

    while let Some(item) = payload.next().await {
        let mut field = item.map_err(malformed)?;
        let name = field
            .content_disposition()
            .and_then(|cd| cd.get_name().map(str::to_string))
            .unwrap_or_default();

        if name == LOGO_FIELD {
            let file_name = field
                .content_disposition()
                .and_then(|cd| cd.get_filename().map(str::to_string))
                .unwrap_or_default();
            let bytes = read_field(&mut field, max_logo_bytes).await?;
            // an empty file input still sends a part
            if !file_name.is_empty() && !bytes.is_empty() {
                logo = Some(LogoUpload { file_name, bytes });
            }
        } else {
            let bytes = read_field(&mut field, MAX_TEXT_FIELD_BYTES).await?;
            let value = String::from_utf8(bytes)
                .map_err(|_| Error::validation(format!("field {name} is not valid UTF-8")))?;
            apply_field(&mut update, &name, value)?;
        }
    }

    Ok((update, logo))
}

async fn read_field(field: &mut Field, limit: usize) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    while let Some(chunk) = field.next().await {
        let chunk = chunk.map_err(malformed)?;
        if bytes.len() + chunk.len() > limit {
            return Err(Error::validation(format!("upload exceeds {limit} bytes")));
        }
        bytes.extend_from_slice(&chunk);
    }
    Ok(bytes)
}

#[allow(clippy::needless_pass_by_value)]
fn malformed(err: MultipartError) -> Error {
    Error::validation(format!("malformed form data: {err}"))
}

/// Store one text field into `update`.
///
/// Both the English field names and the form names of the desk application
/// (`kop_surat_1`, `pejabat_id`, ...) are accepted. A blank counter is left
/// unchanged while a blank officer id clears the designation.
fn apply_field(update: &mut SettingsUpdate, name: &str, value: String) -> Result<()> {
    match name {
        "letterhead_1" | "kop_surat_1" => update.letterhead_1 = Some(value),
        "letterhead_2" | "kop_surat_2" => update.letterhead_2 = Some(value),
        "letterhead_3" | "kop_surat_3" => update.letterhead_3 = Some(value),
        "number_format" | "format_nomor_surat" => update.number_format = Some(value),
        "region" | "wilayah" => update.region = Some(value),
        "office_name" | "nama_kantor" => update.office_name = Some(value),
        "last_issued_number" | "last_nomor_surat" => {
            update.last_issued_number = parse_optional(name, &value)?;
        }
        "last_issued_year" | "last_nomor_year" => {
            update.last_issued_year = parse_optional(name, &value)?;
        }
        "signing_officer_id" | "pejabat_id" => {
            update.signing_officer_id = Some(parse_optional(name, &value)?.unwrap_or(0));
        }
        "receiving_officer_id" | "penerima_id" => {
            update.receiving_officer_id = Some(parse_optional(name, &value)?.unwrap_or(0));
        }
        other => debug!("Ignoring settings field {:?}", other),
    }
    Ok(())
}

fn parse_optional<T: std::str::FromStr>(name: &str, value: &str) -> Result<Option<T>> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    value
        .parse()
        .map(Some)
        .map_err(|_| Error::validation(format!("{name} must be a whole number")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply(fields: &[(&str, &str)]) -> Result<SettingsUpdate> {
        let mut update = SettingsUpdate::default();
        for (name, value) in fields {
            apply_field(&mut update, name, (*value).to_string())?;
        }
        Ok(update)
    }

    #[test]
    fn test_form_names_map_onto_update() {
        let update = apply(&[
            ("kop_surat_1", "KEPOLISIAN NEGARA REPUBLIK INDONESIA"),
            ("format_nomor_surat", "SKH/{NO}/{BLN_ROMAWI}/{THN}"),
            ("last_nomor_surat", "12"),
            ("last_nomor_year", "2024"),
            ("pejabat_id", "3"),
            ("wilayah", "Makassar"),
        ])
        .unwrap();

        assert_eq!(
            update.letterhead_1.as_deref(),
            Some("KEPOLISIAN NEGARA REPUBLIK INDONESIA")
        );
        assert_eq!(update.number_format.as_deref(), Some("SKH/{NO}/{BLN_ROMAWI}/{THN}"));
        assert_eq!(update.last_issued_number, Some(12));
        assert_eq!(update.last_issued_year, Some(2024));
        assert_eq!(update.signing_officer_id, Some(3));
        assert_eq!(update.region.as_deref(), Some("Makassar"));
        assert_eq!(update.receiving_officer_id, None);
    }

    #[test]
    fn test_english_names_map_onto_update() {
        let update = apply(&[("office_name", "Polsek Ujung"), ("receiving_officer_id", "5")]).unwrap();
        assert_eq!(update.office_name.as_deref(), Some("Polsek Ujung"));
        assert_eq!(update.receiving_officer_id, Some(5));
    }

    #[test]
    fn test_blank_values() {
        let update = apply(&[("last_nomor_surat", " "), ("pejabat_id", "")]).unwrap();
        assert_eq!(update.last_issued_number, None);
        assert_eq!(update.signing_officer_id, Some(0));
    }

    #[test]
    fn test_non_numeric_counter_is_rejected() {
        let err = apply(&[("last_nomor_surat", "dua belas")]).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_unknown_fields_are_ignored() {
        let update = apply(&[("csrf", "token")]).unwrap();
        assert_eq!(update, SettingsUpdate::default());
    }
}

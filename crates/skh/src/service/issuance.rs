//! The letter issuance workflow.
//!
//! Issuing a letter assigns the next sequence number, renders it through the
//! configured template and stores the letter together with the advanced
//! counter. Everything after validation happens inside one `IMMEDIATE`
//! transaction: the write lock is held from the moment the counter is read
//! until the new letter is committed, so two concurrent issuances queue
//! instead of racing for the same number.

use chrono::{DateTime, Datelike, FixedOffset, SubsecRound};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::model::{Letter, LetterDraft};
use crate::numbering::{compute_next_number, format_number};
use crate::storage::{letters, settings, Storage};

/// Issue a new letter at `now`.
///
/// When no letters exist the stored counter is first reset to zero for the
/// current year, so a wiped dataset always starts again at number 1.
///
/// # Errors
///
/// - [`Error::Validation`] if the draft is incomplete; nothing is written.
/// - [`Error::SettingsUnavailable`] if the settings row cannot be read.
/// - [`Error::CounterExhausted`] if the counter cannot advance; nothing is written.
/// - Any storage error; the transaction is rolled back and the counter is
///   left untouched.
pub fn issue(storage: &mut Storage, draft: LetterDraft, now: DateTime<FixedOffset>) -> Result<Letter> {
    draft.validate()?;

    // stored with whole-second precision
    let now = now.trunc_subsecs(0);
    let year = now.year();
    let tx = storage.begin_immediate()?;

    if letters::count(&tx)? == 0 {
        debug!("No letters on record, resetting counter for {}", year);
        settings::reset_counter(&tx, year)?;
        letters::reset_id_sequence(&tx)?;
    }

    let current = settings::load(&tx).map_err(Error::settings_unavailable)?;
    let number = compute_next_number(current.last_issued_number, current.last_issued_year, year)?;
    let formatted = format_number(&current.number_format, number, &now)?;

    settings::store_counter(&tx, number, year)?;
    let id = letters::insert(&tx, &formatted, &now, &draft)?;
    tx.commit()?;

    info!("Issued letter {} (id {})", formatted, id);

    let LetterDraft {
        reporter,
        loss_location,
        items,
    } = draft;
    Ok(Letter {
        id,
        number: formatted,
        issued_at: now,
        reporter,
        loss_location,
        items,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{LostItem, Reporter, Settings};
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(8 * 3600)
            .unwrap()
            .with_ymd_and_hms(y, m, d, 10, 0, 0)
            .unwrap()
    }

    fn draft(name: &str) -> LetterDraft {
        LetterDraft {
            reporter: Reporter {
                name: name.to_string(),
                ..Reporter::default()
            },
            loss_location: "Pantai Losari".to_string(),
            items: vec![LostItem::new("KTP", "7371"), LostItem::new("SIM", "C")],
        }
    }

    fn set_format(storage: &Storage, template: &str) {
        let current = settings::load(storage.conn()).unwrap();
        settings::save(
            storage.conn(),
            &Settings {
                number_format: template.to_string(),
                ..current
            },
        )
        .unwrap();
    }

    #[test]
    fn test_first_letter_gets_number_one() {
        let mut storage = Storage::open_in_memory().unwrap();
        set_format(&storage, "{NO}/{BLN_ROMAWI}/{THN}");

        let letter = issue(&mut storage, draft("Budi"), at(2024, 6, 15)).unwrap();

        assert_eq!(letter.number, "001/VI/2024");
        assert_eq!(letter.items.len(), 2);
        let stored = letters::get(storage.conn(), letter.id).unwrap().unwrap();
        assert_eq!(stored, letter);
    }

    #[test]
    fn test_numbers_increase_within_year() {
        let mut storage = Storage::open_in_memory().unwrap();
        set_format(&storage, "{NO}/{THN}");

        let first = issue(&mut storage, draft("Budi"), at(2024, 6, 15)).unwrap();
        let second = issue(&mut storage, draft("Ani"), at(2024, 7, 1)).unwrap();

        assert_eq!(first.number, "001/2024");
        assert_eq!(second.number, "002/2024");
        let current = settings::load(storage.conn()).unwrap();
        assert_eq!(current.last_issued_number, 2);
        assert_eq!(current.last_issued_year, 2024);
    }

    #[test]
    fn test_new_year_restarts_sequence() {
        let mut storage = Storage::open_in_memory().unwrap();
        set_format(&storage, "{NO}/{THN}");

        issue(&mut storage, draft("Budi"), at(2024, 12, 31)).unwrap();
        issue(&mut storage, draft("Ani"), at(2024, 12, 31)).unwrap();
        let letter = issue(&mut storage, draft("Rudi"), at(2025, 1, 2)).unwrap();

        assert_eq!(letter.number, "001/2025");
    }

    #[test]
    fn test_empty_table_heals_stale_counter() {
        let mut storage = Storage::open_in_memory().unwrap();
        set_format(&storage, "{NO}/{THN}");
        settings::store_counter(storage.conn(), 57, 2024).unwrap();

        let letter = issue(&mut storage, draft("Budi"), at(2024, 6, 15)).unwrap();

        assert_eq!(letter.number, "001/2024");
        assert_eq!(letter.id, 1);
    }

    #[test]
    fn test_delete_does_not_reuse_numbers() {
        let mut storage = Storage::open_in_memory().unwrap();
        set_format(&storage, "{NO}/{THN}");

        issue(&mut storage, draft("Budi"), at(2024, 6, 15)).unwrap();
        let second = issue(&mut storage, draft("Ani"), at(2024, 6, 15)).unwrap();
        issue(&mut storage, draft("Rudi"), at(2024, 6, 15)).unwrap();
        letters::delete(storage.conn(), second.id).unwrap();

        let next = issue(&mut storage, draft("Sari"), at(2024, 6, 16)).unwrap();
        assert_eq!(next.number, "004/2024");
    }

    #[test]
    fn test_invalid_draft_writes_nothing() {
        let mut storage = Storage::open_in_memory().unwrap();
        issue(&mut storage, draft("Budi"), at(2024, 6, 15)).unwrap();
        let before = settings::load(storage.conn()).unwrap();

        let err = issue(&mut storage, draft("  "), at(2024, 6, 15)).unwrap_err();

        assert!(err.is_validation());
        assert_eq!(letters::count(storage.conn()).unwrap(), 1);
        assert_eq!(settings::load(storage.conn()).unwrap(), before);
    }

    #[test]
    fn test_duplicate_number_rolls_back_counter() {
        crate::logging::init_test_logging();
        let mut storage = Storage::open_in_memory().unwrap();
        // a template without {NO} renders the same text twice
        set_format(&storage, "SKH/{THN}");

        issue(&mut storage, draft("Budi"), at(2024, 6, 15)).unwrap();
        let result = issue(&mut storage, draft("Ani"), at(2024, 6, 15));

        assert!(result.unwrap_err().is_storage());
        assert_eq!(letters::count(storage.conn()).unwrap(), 1);
        assert_eq!(settings::load(storage.conn()).unwrap().last_issued_number, 1);
    }

    #[test]
    fn test_exhausted_counter_is_rejected_without_writing() {
        let mut storage = Storage::open_in_memory().unwrap();
        issue(&mut storage, draft("Budi"), at(2024, 6, 15)).unwrap();
        settings::store_counter(storage.conn(), i64::MAX, 2024).unwrap();

        let err = issue(&mut storage, draft("Ani"), at(2024, 6, 16)).unwrap_err();

        assert!(matches!(err, Error::CounterExhausted { last_number: i64::MAX }));
        assert_eq!(letters::count(storage.conn()).unwrap(), 1);
        let current = settings::load(storage.conn()).unwrap();
        assert_eq!(current.last_issued_number, i64::MAX);
    }

    #[test]
    fn test_missing_settings_row_is_reported() {
        let mut storage = Storage::open_in_memory().unwrap();
        storage.conn().execute("DELETE FROM pengaturan", []).unwrap();

        let err = issue(&mut storage, draft("Budi"), at(2024, 6, 15)).unwrap_err();

        assert!(matches!(err, Error::SettingsUnavailable { .. }));
        assert_eq!(letters::count(storage.conn()).unwrap(), 0);
    }
}

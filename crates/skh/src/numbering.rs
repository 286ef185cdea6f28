//! Sequential document numbering.
//!
//! Letter numbers restart at 1 every calendar year and are rendered through a
//! template with `{NO}`, `{THN}` and `{BLN_ROMAWI}` placeholders. All dates
//! are taken in a single fixed reference offset so numbering does not depend
//! on the host's local timezone.

use std::borrow::Cow;
use std::sync::LazyLock;

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, Utc};
use regex::{Captures, Regex};

use crate::error::{Error, Result};

/// Offset of the deployment locale (WITA, UTC+8).
pub const DEFAULT_UTC_OFFSET_HOURS: i32 = 8;

const ROMAN_MONTHS: [&str; 12] = [
    "I", "II", "III", "IV", "V", "VI", "VII", "VIII", "IX", "X", "XI", "XII",
];

const INDONESIAN_MONTHS: [&str; 12] = [
    "Januari",
    "Februari",
    "Maret",
    "April",
    "Mei",
    "Juni",
    "Juli",
    "Agustus",
    "September",
    "Oktober",
    "November",
    "Desember",
];

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{(NO|THN|BLN_ROMAWI)\}").expect("placeholder pattern is valid")
});

/// Compute the sequence number for the next letter.
///
/// The sequence restarts at 1 when `current_year` is past `last_year`;
/// otherwise it continues from `last_number`.
///
/// # Errors
///
/// Returns [`Error::CounterExhausted`] if `last_number` cannot be incremented.
pub fn compute_next_number(last_number: i64, last_year: i32, current_year: i32) -> Result<i64> {
    if current_year > last_year {
        return Ok(1);
    }
    last_number
        .checked_add(1)
        .ok_or(Error::CounterExhausted { last_number })
}

/// Render a letter number from its template.
///
/// Unknown placeholders are left as literal text.
///
/// # Errors
///
/// Returns [`Error::InvalidMonth`] if the date's month has no roman numeral.
pub fn format_number(template: &str, number: i64, date: &impl Datelike) -> Result<String> {
    let month = month_to_roman(date.month())?;
    let year = date.year().to_string();
    let number = format!("{number:03}");

    let rendered: Cow<'_, str> = PLACEHOLDER.replace_all(template, |caps: &Captures<'_>| {
        match &caps[1] {
            "NO" => number.clone(),
            "THN" => year.clone(),
            _ => month.to_string(),
        }
    });
    Ok(rendered.into_owned())
}

/// Convert a month number (1-12) to an uppercase roman numeral.
///
/// # Errors
///
/// Returns [`Error::InvalidMonth`] for any value outside 1-12.
pub fn month_to_roman(month: u32) -> Result<&'static str> {
    month
        .checked_sub(1)
        .and_then(|index| ROMAN_MONTHS.get(index as usize))
        .copied()
        .ok_or(Error::InvalidMonth(month))
}

/// Format a date the way it is printed on letters, e.g. `15 Juni 2024`.
///
/// # Errors
///
/// Returns [`Error::InvalidMonth`] if the month is out of range.
pub fn format_indonesian_date(date: &impl Datelike) -> Result<String> {
    let month = date
        .month0()
        .try_into()
        .ok()
        .and_then(|index: usize| INDONESIAN_MONTHS.get(index))
        .ok_or(Error::InvalidMonth(date.month()))?;
    Ok(format!("{} {} {}", date.day(), month, date.year()))
}

/// Source of "now" in the reference offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceClock {
    offset: FixedOffset,
}

impl ReferenceClock {
    /// Create a clock for a whole-hour UTC offset.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the offset is not a valid UTC offset.
    pub fn from_hours(hours: i32) -> Result<Self> {
        hours
            .checked_mul(3600)
            .and_then(FixedOffset::east_opt)
            .map(|offset| Self { offset })
            .ok_or_else(|| Error::ConfigValidation {
                message: format!("invalid UTC offset: {hours} hours"),
            })
    }

    /// The reference offset.
    #[must_use]
    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// The current instant in the reference offset.
    #[must_use]
    pub fn now(&self) -> DateTime<FixedOffset> {
        self.localize(&Utc::now())
    }

    /// Express a UTC instant in the reference offset.
    #[must_use]
    pub fn localize(&self, instant: &DateTime<Utc>) -> DateTime<FixedOffset> {
        instant.with_timezone(&self.offset)
    }

    /// Today's calendar date in the reference offset.
    #[must_use]
    pub fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

impl Default for ReferenceClock {
    fn default() -> Self {
        Self::from_hours(DEFAULT_UTC_OFFSET_HOURS).expect("default offset is a valid UTC offset")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn test_next_number_increments_within_year() {
        assert_eq!(compute_next_number(6, 2024, 2024).unwrap(), 7);
        assert_eq!(compute_next_number(0, 2024, 2024).unwrap(), 1);
    }

    #[test]
    fn test_next_number_resets_on_new_year() {
        assert_eq!(compute_next_number(57, 2023, 2024).unwrap(), 1);
        assert_eq!(compute_next_number(0, 0, 2024).unwrap(), 1);
    }

    #[test]
    fn test_next_number_never_resets_backwards() {
        // A clock running behind the stored year keeps counting.
        assert_eq!(compute_next_number(10, 2025, 2024).unwrap(), 11);
    }

    #[test]
    fn test_next_number_refuses_to_wrap() {
        assert!(matches!(
            compute_next_number(i64::MAX, 2024, 2024),
            Err(Error::CounterExhausted { last_number: i64::MAX })
        ));
        // a new year still restarts an exhausted counter
        assert_eq!(compute_next_number(i64::MAX, 2023, 2024).unwrap(), 1);
    }

    #[test]
    fn test_next_number_rule_holds_for_grid() {
        for last_number in [0_i64, 1, 41, 999] {
            for last_year in [2022, 2023, 2024] {
                for current_year in [2022, 2023, 2024, 2025] {
                    let next = compute_next_number(last_number, last_year, current_year).unwrap();
                    if current_year > last_year {
                        assert_eq!(next, 1);
                    } else {
                        assert_eq!(next, last_number + 1);
                    }
                }
            }
        }
    }

    #[test]
    fn test_format_number_example() {
        let formatted = format_number("{NO}/{BLN_ROMAWI}/{THN}", 7, &date(2024, 6, 15)).unwrap();
        assert_eq!(formatted, "007/VI/2024");
    }

    #[test]
    fn test_format_number_keeps_unknown_placeholders() {
        let formatted =
            format_number("SKH/{NO}/{UNIT}/{BLN_ROMAWI}/{THN}", 12, &date(2024, 12, 1)).unwrap();
        assert_eq!(formatted, "SKH/012/{UNIT}/XII/2024");
    }

    #[test]
    fn test_format_number_repeated_placeholders() {
        let formatted = format_number("{NO}-{NO}", 3, &date(2024, 1, 1)).unwrap();
        assert_eq!(formatted, "003-003");
    }

    #[test]
    fn test_format_number_wide_numbers_not_truncated() {
        let formatted = format_number("{NO}", 1234, &date(2024, 1, 1)).unwrap();
        assert_eq!(formatted, "1234");
    }

    #[test]
    fn test_month_to_roman_table() {
        let expected = [
            "I", "II", "III", "IV", "V", "VI", "VII", "VIII", "IX", "X", "XI", "XII",
        ];
        for (month, roman) in (1..=12).zip(expected) {
            assert_eq!(month_to_roman(month).unwrap(), roman);
        }
    }

    #[test]
    fn test_month_to_roman_out_of_range_fails() {
        assert!(matches!(month_to_roman(0), Err(Error::InvalidMonth(0))));
        assert!(matches!(month_to_roman(13), Err(Error::InvalidMonth(13))));
    }

    #[test]
    fn test_format_indonesian_date() {
        assert_eq!(
            format_indonesian_date(&date(2024, 6, 15)).unwrap(),
            "15 Juni 2024"
        );
        assert_eq!(
            format_indonesian_date(&date(2025, 1, 2)).unwrap(),
            "2 Januari 2025"
        );
    }

    #[test]
    fn test_reference_clock_offset() {
        let clock = ReferenceClock::from_hours(8).unwrap();
        assert_eq!(clock.offset().local_minus_utc(), 8 * 3600);
        assert_eq!(ReferenceClock::default(), clock);
    }

    #[test]
    fn test_reference_clock_rejects_bad_offset() {
        assert!(ReferenceClock::from_hours(30).is_err());
    }

    #[test]
    fn test_localize_crosses_midnight() {
        let clock = ReferenceClock::from_hours(8).unwrap();
        let utc = Utc.with_ymd_and_hms(2024, 12, 31, 17, 30, 0).unwrap();
        let local = clock.localize(&utc);
        assert_eq!(local.date_naive(), date(2025, 1, 1));
    }
}

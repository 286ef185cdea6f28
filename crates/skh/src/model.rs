//! Core record types for skh.
//!
//! This module defines the letters, lost items, officers and the settings
//! singleton that the storage layer persists and the services operate on.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Number format used when the settings row has none configured.
pub const DEFAULT_NUMBER_FORMAT: &str = "SKH/{NO}/{BLN_ROMAWI}/{THN}";

/// The duty an officer can be designated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OfficerRole {
    /// Signs issued letters (`Pejabat`).
    #[serde(alias = "Pejabat", alias = "pejabat")]
    SigningOfficial,
    /// Receives the report at the desk (`Penerima`).
    #[serde(alias = "Penerima", alias = "penerima")]
    Receiver,
}

impl OfficerRole {
    /// The tag stored in the `petugas.tipe` column.
    #[must_use]
    pub fn as_db_str(self) -> &'static str {
        match self {
            Self::SigningOfficial => "Pejabat",
            Self::Receiver => "Penerima",
        }
    }
}

impl fmt::Display for OfficerRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_db_str())
    }
}

impl FromStr for OfficerRole {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pejabat" | "signing_official" => Ok(Self::SigningOfficial),
            "penerima" | "receiver" => Ok(Self::Receiver),
            other => Err(Error::validation(format!("unknown officer role: {other}"))),
        }
    }
}

/// An officer eligible to sign or receive letters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Officer {
    /// Row identity.
    pub id: i64,
    /// Full name.
    pub name: String,
    /// Rank (`pangkat`).
    pub rank: String,
    /// Service number (`NRP`).
    pub service_number: String,
    /// Position title (`jabatan`).
    pub position: String,
    /// Designated duty.
    pub role: OfficerRole,
}

impl Officer {
    /// Attach a row identity to submitted fields.
    #[must_use]
    pub fn from_draft(id: i64, draft: OfficerDraft) -> Self {
        Self {
            id,
            name: draft.name,
            rank: draft.rank,
            service_number: draft.service_number,
            position: draft.position,
            role: draft.role,
        }
    }
}

/// Submitted officer fields, used for both creation and update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfficerDraft {
    /// Full name.
    pub name: String,
    /// Rank.
    #[serde(default)]
    pub rank: String,
    /// Service number.
    #[serde(default)]
    pub service_number: String,
    /// Position title.
    #[serde(default)]
    pub position: String,
    /// Designated duty.
    pub role: OfficerRole,
}

impl OfficerDraft {
    /// Check required fields.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the name is blank.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::validation("officer name is required"));
        }
        Ok(())
    }
}

/// Personal details of the person reporting the loss.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Reporter {
    /// Full name.
    pub name: String,
    /// Place and date of birth, e.g. `Makassar, 1990-01-31`.
    pub birth_info: String,
    /// Religion.
    pub religion: String,
    /// Sex.
    pub sex: String,
    /// Occupation.
    pub occupation: String,
    /// Home address.
    pub address: String,
}

/// One lost item listed on a letter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LostItem {
    /// Item category, e.g. `KTP` or `STNK`.
    pub category: String,
    /// Free-text details (document number, owner name, ...).
    #[serde(default)]
    pub description: String,
}

impl LostItem {
    /// Create a new lost item entry.
    #[must_use]
    pub fn new(category: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            description: description.into(),
        }
    }
}

/// The mutable content of a letter, as submitted by a user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LetterDraft {
    /// Reporter details.
    pub reporter: Reporter,
    /// Where the items were lost.
    pub loss_location: String,
    /// Lost items in display order.
    pub items: Vec<LostItem>,
}

impl LetterDraft {
    /// Check the fields a letter cannot be issued without.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the reporter name or loss location is blank.
    pub fn validate(&self) -> Result<()> {
        if self.reporter.name.trim().is_empty() || self.loss_location.trim().is_empty() {
            return Err(Error::validation(
                "reporter name and loss location are required",
            ));
        }
        Ok(())
    }
}

/// An issued lost item report letter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Letter {
    /// Row identity.
    pub id: i64,
    /// Formatted document number, immutable once issued.
    pub number: String,
    /// Issuance time in the reference timezone.
    pub issued_at: DateTime<FixedOffset>,
    /// Reporter details.
    pub reporter: Reporter,
    /// Where the items were lost.
    pub loss_location: String,
    /// Lost items in display order.
    pub items: Vec<LostItem>,
}

/// A letter row as shown in listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LetterSummary {
    /// Row identity.
    pub id: i64,
    /// Formatted document number.
    pub number: String,
    /// Issuance time in the reference timezone.
    pub issued_at: DateTime<FixedOffset>,
    /// Reporter name.
    pub reporter_name: String,
}

/// The settings singleton.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// The three letterhead lines, top to bottom.
    pub letterhead: [String; 3],
    /// Public path of the uploaded logo, if any.
    pub logo_path: Option<String>,
    /// Number template with `{NO}`, `{BLN_ROMAWI}` and `{THN}` placeholders.
    pub number_format: String,
    /// Sequence number of the most recently issued letter.
    pub last_issued_number: i64,
    /// Calendar year in which `last_issued_number` was assigned.
    pub last_issued_year: i32,
    /// Officer designated to sign letters.
    pub signing_officer_id: Option<i64>,
    /// Officer designated to receive reports.
    pub receiving_officer_id: Option<i64>,
    /// Region name printed on the letter (`wilayah`).
    pub region: String,
    /// Office name printed on the letter (`nama_kantor`).
    pub office_name: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            letterhead: Default::default(),
            logo_path: None,
            number_format: DEFAULT_NUMBER_FORMAT.to_string(),
            last_issued_number: 0,
            last_issued_year: 0,
            signing_officer_id: None,
            receiving_officer_id: None,
            region: String::new(),
            office_name: String::new(),
        }
    }
}

impl Settings {
    /// Merge submitted fields into these settings.
    ///
    /// Absent fields keep their current value. An officer id of `0` clears the
    /// reference. The logo path is never touched here.
    pub fn apply(&mut self, update: SettingsUpdate) {
        let SettingsUpdate {
            letterhead_1,
            letterhead_2,
            letterhead_3,
            number_format,
            last_issued_number,
            last_issued_year,
            signing_officer_id,
            receiving_officer_id,
            region,
            office_name,
        } = update;

        for (slot, line) in self
            .letterhead
            .iter_mut()
            .zip([letterhead_1, letterhead_2, letterhead_3])
        {
            if let Some(line) = line {
                *slot = line;
            }
        }
        if let Some(format) = number_format {
            self.number_format = format;
        }
        if let Some(number) = last_issued_number {
            self.last_issued_number = number;
        }
        if let Some(year) = last_issued_year {
            self.last_issued_year = year;
        }
        if let Some(id) = signing_officer_id {
            self.signing_officer_id = (id != 0).then_some(id);
        }
        if let Some(id) = receiving_officer_id {
            self.receiving_officer_id = (id != 0).then_some(id);
        }
        if let Some(region) = region {
            self.region = region;
        }
        if let Some(office_name) = office_name {
            self.office_name = office_name;
        }
    }
}

/// Settings together with the designated officers' details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsDetails {
    /// The settings row.
    #[serde(flatten)]
    pub settings: Settings,
    /// Details of `signing_officer_id`, if it resolves.
    pub signing_officer: Option<Officer>,
    /// Details of `receiving_officer_id`, if it resolves.
    pub receiving_officer: Option<Officer>,
}

/// Submitted settings fields. `None` means "not submitted".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsUpdate {
    /// First letterhead line.
    pub letterhead_1: Option<String>,
    /// Second letterhead line.
    pub letterhead_2: Option<String>,
    /// Third letterhead line.
    pub letterhead_3: Option<String>,
    /// Number template.
    pub number_format: Option<String>,
    /// Manually corrected counter.
    pub last_issued_number: Option<i64>,
    /// Manually corrected counter year.
    pub last_issued_year: Option<i32>,
    /// Signing officer id, `0` to clear.
    pub signing_officer_id: Option<i64>,
    /// Receiving officer id, `0` to clear.
    pub receiving_officer_id: Option<i64>,
    /// Region name.
    pub region: Option<String>,
    /// Office name.
    pub office_name: Option<String>,
}

impl SettingsUpdate {
    /// Check submitted values.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a blank number format or a negative counter.
    pub fn validate(&self) -> Result<()> {
        if let Some(format) = &self.number_format {
            if format.trim().is_empty() {
                return Err(Error::validation("number format cannot be empty"));
            }
        }
        if matches!(self.last_issued_number, Some(n) if n < 0) {
            return Err(Error::validation("last issued number cannot be negative"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(name: &str, location: &str) -> LetterDraft {
        LetterDraft {
            reporter: Reporter {
                name: name.to_string(),
                ..Reporter::default()
            },
            loss_location: location.to_string(),
            items: vec![LostItem::new("KTP", "1234")],
        }
    }

    #[test]
    fn test_officer_role_db_str() {
        assert_eq!(OfficerRole::SigningOfficial.as_db_str(), "Pejabat");
        assert_eq!(OfficerRole::Receiver.as_db_str(), "Penerima");
        assert_eq!(OfficerRole::Receiver.to_string(), "Penerima");
    }

    #[test]
    fn test_officer_role_from_str() {
        assert_eq!(
            "Pejabat".parse::<OfficerRole>().unwrap(),
            OfficerRole::SigningOfficial
        );
        assert_eq!(
            "receiver".parse::<OfficerRole>().unwrap(),
            OfficerRole::Receiver
        );
        assert!("Komandan".parse::<OfficerRole>().unwrap_err().is_validation());
    }

    #[test]
    fn test_officer_role_serde() {
        let json = serde_json::to_string(&OfficerRole::SigningOfficial).unwrap();
        assert_eq!(json, "\"signing_official\"");

        let role: OfficerRole = serde_json::from_str("\"Penerima\"").unwrap();
        assert_eq!(role, OfficerRole::Receiver);
    }

    #[test]
    fn test_officer_draft_requires_name() {
        let officer = OfficerDraft {
            name: "  ".to_string(),
            rank: "AIPTU".to_string(),
            service_number: "1234".to_string(),
            position: "KA SPKT".to_string(),
            role: OfficerRole::SigningOfficial,
        };
        assert!(officer.validate().unwrap_err().is_validation());
    }

    #[test]
    fn test_letter_draft_validation() {
        assert!(draft("Budi", "Pasar Sentral").validate().is_ok());
        assert!(draft("", "Pasar Sentral").validate().is_err());
        assert!(draft("Budi", "   ").validate().is_err());
    }

    #[test]
    fn test_settings_default_format() {
        let settings = Settings::default();
        assert_eq!(settings.number_format, DEFAULT_NUMBER_FORMAT);
        assert!(settings.logo_path.is_none());
    }

    #[test]
    fn test_settings_apply_merges_submitted_fields() {
        let mut settings = Settings {
            letterhead: ["A".into(), "B".into(), "C".into()],
            logo_path: Some("/static/uploads/logo.png".into()),
            signing_officer_id: Some(3),
            ..Settings::default()
        };

        settings.apply(SettingsUpdate {
            letterhead_2: Some("Sektor Ujung".into()),
            number_format: Some("{NO}/{THN}".into()),
            signing_officer_id: Some(0),
            receiving_officer_id: Some(7),
            ..SettingsUpdate::default()
        });

        assert_eq!(settings.letterhead[0], "A");
        assert_eq!(settings.letterhead[1], "Sektor Ujung");
        assert_eq!(settings.number_format, "{NO}/{THN}");
        assert_eq!(settings.signing_officer_id, None);
        assert_eq!(settings.receiving_officer_id, Some(7));
        assert_eq!(
            settings.logo_path.as_deref(),
            Some("/static/uploads/logo.png")
        );
    }

    #[test]
    fn test_settings_update_validation() {
        let update = SettingsUpdate {
            number_format: Some(String::new()),
            ..SettingsUpdate::default()
        };
        assert!(update.validate().is_err());

        let update = SettingsUpdate {
            last_issued_number: Some(-1),
            ..SettingsUpdate::default()
        };
        assert!(update.validate().is_err());

        assert!(SettingsUpdate::default().validate().is_ok());
    }

    #[test]
    fn test_settings_details_serializes_flat() {
        let details = SettingsDetails {
            settings: Settings::default(),
            signing_officer: None,
            receiving_officer: None,
        };
        let json = serde_json::to_value(&details).unwrap();
        assert!(json.get("number_format").is_some());
        assert!(json.get("signing_officer").is_some());
    }
}

//! Result structs handed to the presentation boundary.

use serde::{Deserialize, Serialize};

use crate::form::LetterForm;
use crate::model::{Letter, LetterSummary, Officer, OfficerRole, SettingsDetails};

/// Dashboard figures in chart-ready form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardView {
    /// All letters on record.
    pub total_letters: i64,
    /// Letters issued in the current month.
    pub letters_this_month: i64,
    /// Item categories, most frequent first.
    pub category_labels: Vec<String>,
    /// Item counts matching `category_labels`.
    pub category_data: Vec<i64>,
    /// The trailing seven days, oldest first, e.g. `09 Jun`.
    pub daily_labels: Vec<String>,
    /// Letters issued on each day of `daily_labels`.
    pub daily_data: Vec<i64>,
}

/// Letter listing with the active search term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LetterListView {
    /// Matching letters, newest first.
    pub letters: Vec<LetterSummary>,
    /// Search term, empty when unfiltered.
    pub query: String,
}

/// Rejected letter submission, echoing what was sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LetterFormError {
    /// Why the submission was rejected.
    pub error: String,
    /// The submission as received.
    pub form: LetterForm,
}

/// Everything the printed letter shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrintView {
    /// The letter with its items.
    pub letter: Letter,
    /// Letterhead and designated officers.
    pub settings: SettingsDetails,
    /// Issuance date spelled out, e.g. `15 Juni 2024`.
    pub issued_on: String,
}

/// Settings form contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsView {
    /// Current settings with officer details.
    pub settings: SettingsDetails,
    /// Officers that may be designated to sign.
    pub signing_candidates: Vec<Officer>,
    /// Officers that may be designated to receive.
    pub receiving_candidates: Vec<Officer>,
}

/// Officer listing, optionally restricted to one role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfficerListView {
    /// Officers ordered by name.
    pub officers: Vec<Officer>,
    /// Role filter in effect.
    pub role: Option<OfficerRole>,
}

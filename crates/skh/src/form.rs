//! Submitted letter form.
//!
//! The form keeps birth place and birth date apart and may carry blank item
//! rows; [`LetterForm::into_draft`] folds it into a [`LetterDraft`].

use serde::{Deserialize, Serialize};

use crate::model::{LetterDraft, LostItem, Reporter};

/// A letter as submitted by the desk officer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LetterForm {
    /// Reporter's full name.
    pub reporter_name: String,
    /// Place of birth.
    pub birth_place: String,
    /// Date of birth as entered.
    pub birth_date: String,
    /// Religion.
    pub religion: String,
    /// Sex.
    pub sex: String,
    /// Occupation.
    pub occupation: String,
    /// Home address.
    pub address: String,
    /// Where the items were lost.
    pub loss_location: String,
    /// Item rows, possibly with blanks.
    pub items: Vec<LostItem>,
}

impl LetterForm {
    /// Convert into a draft.
    ///
    /// Item rows with a blank category are dropped. Birth place and date are
    /// joined as `"<place>, <date>"`, skipping whichever is blank.
    #[must_use]
    pub fn into_draft(self) -> LetterDraft {
        let birth_info = [self.birth_place.trim(), self.birth_date.trim()]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(", ");

        LetterDraft {
            reporter: Reporter {
                name: self.reporter_name,
                birth_info,
                religion: self.religion,
                sex: self.sex,
                occupation: self.occupation,
                address: self.address,
            },
            loss_location: self.loss_location,
            items: self
                .items
                .into_iter()
                .filter(|item| !item.category.trim().is_empty())
                .collect(),
        }
    }
}

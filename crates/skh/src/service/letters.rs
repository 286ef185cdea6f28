//! Letter operations.

use tracing::info;

use crate::error::{Error, Result};
use crate::model::{Letter, LetterDraft, LetterSummary};
use crate::numbering::{format_indonesian_date, ReferenceClock};
use crate::storage::{letters, settings, Database};
use crate::view::{LetterListView, PrintView};

use super::issuance;

/// Issues, edits and looks up letters.
#[derive(Debug, Clone)]
pub struct LetterService {
    db: Database,
    clock: ReferenceClock,
}

impl LetterService {
    /// Create a service over `db`, dating letters with `clock`.
    #[must_use]
    pub fn new(db: Database, clock: ReferenceClock) -> Self {
        Self { db, clock }
    }

    /// Issue a new letter dated now.
    ///
    /// # Errors
    ///
    /// See [`issuance::issue`].
    pub async fn issue(&self, draft: LetterDraft) -> Result<Letter> {
        let now = self.clock.now();
        self.db
            .run(move |storage| issuance::issue(storage, draft, now))
            .await
    }

    /// List letters, newest first, optionally filtered by reporter name or
    /// number.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn list(&self, query: Option<String>) -> Result<LetterListView> {
        let query = query.unwrap_or_default();
        let filter = query.clone();
        let letters: Vec<LetterSummary> = self
            .db
            .run(move |storage| letters::list(storage.conn(), Some(filter.as_str())))
            .await?;
        Ok(LetterListView { letters, query })
    }

    /// Get one letter with its items.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no letter has the id.
    pub async fn get(&self, id: i64) -> Result<Letter> {
        self.db
            .run(move |storage| {
                letters::get(storage.conn(), id)?.ok_or_else(|| Error::not_found("letter", id))
            })
            .await
    }

    /// Replace a letter's reporter details, loss location and items.
    ///
    /// The number and issuance date never change.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for an incomplete draft and
    /// [`Error::NotFound`] if no letter has the id.
    pub async fn update(&self, id: i64, draft: LetterDraft) -> Result<Letter> {
        draft.validate()?;
        let letter = self
            .db
            .run(move |storage| {
                let tx = storage.begin_immediate()?;
                if !letters::replace(&tx, id, &draft)? {
                    return Err(Error::not_found("letter", id));
                }
                let letter = letters::get(&tx, id)?.ok_or_else(|| Error::not_found("letter", id))?;
                tx.commit()?;
                Ok(letter)
            })
            .await?;
        info!("Updated letter {} (id {})", letter.number, id);
        Ok(letter)
    }

    /// Delete a letter and its items. The counter is not touched.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no letter has the id.
    pub async fn delete(&self, id: i64) -> Result<()> {
        self.db
            .run(move |storage| {
                if letters::delete(storage.conn(), id)? {
                    Ok(())
                } else {
                    Err(Error::not_found("letter", id))
                }
            })
            .await?;
        info!("Deleted letter id {}", id);
        Ok(())
    }

    /// Gather what the printed letter needs.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no letter has the id and
    /// [`Error::SettingsUnavailable`] if the settings cannot be read.
    pub async fn print_view(&self, id: i64) -> Result<PrintView> {
        let (letter, settings) = self
            .db
            .run(move |storage| {
                let conn = storage.conn();
                let letter = letters::get(conn, id)?.ok_or_else(|| Error::not_found("letter", id))?;
                let details = settings::load_details(conn).map_err(Error::settings_unavailable)?;
                Ok((letter, details))
            })
            .await?;

        let issued_on = format_indonesian_date(&letter.issued_at)?;
        Ok(PrintView {
            letter,
            settings,
            issued_on,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{LostItem, Reporter};
    use crate::storage::DEFAULT_BUSY_TIMEOUT;

    fn service(dir: &tempfile::TempDir) -> LetterService {
        let db = Database::open(dir.path().join("skh.db"), DEFAULT_BUSY_TIMEOUT).unwrap();
        LetterService::new(db, ReferenceClock::default())
    }

    fn draft(name: &str, items: &[&str]) -> LetterDraft {
        LetterDraft {
            reporter: Reporter {
                name: name.to_string(),
                ..Reporter::default()
            },
            loss_location: "Jalan Perintis".to_string(),
            items: items.iter().map(|c| LostItem::new(*c, "-")).collect(),
        }
    }

    #[tokio::test]
    async fn test_issue_and_get() {
        let dir = tempfile::tempdir().unwrap();
        let service = service(&dir);

        let issued = service.issue(draft("Budi", &["KTP"])).await.unwrap();
        let fetched = service.get(issued.id).await.unwrap();

        assert_eq!(fetched, issued);
        assert!(issued.number.starts_with("SKH/001/"));
    }

    #[tokio::test]
    async fn test_get_missing_letter() {
        let dir = tempfile::tempdir().unwrap();
        let err = service(&dir).get(42).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_update_replaces_items_and_keeps_number() {
        let dir = tempfile::tempdir().unwrap();
        let service = service(&dir);
        let issued = service
            .issue(draft("Budi", &["KTP", "SIM", "STNK"]))
            .await
            .unwrap();

        let updated = service
            .update(issued.id, draft("Budi Santoso", &["ATM"]))
            .await
            .unwrap();

        assert_eq!(updated.number, issued.number);
        assert_eq!(updated.issued_at, issued.issued_at);
        assert_eq!(updated.reporter.name, "Budi Santoso");
        assert_eq!(updated.items, vec![LostItem::new("ATM", "-")]);
    }

    #[tokio::test]
    async fn test_update_validation_and_missing() {
        let dir = tempfile::tempdir().unwrap();
        let service = service(&dir);

        let err = service.update(1, draft("", &[])).await.unwrap_err();
        assert!(err.is_validation());

        let err = service.update(1, draft("Budi", &[])).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_delete_then_missing() {
        let dir = tempfile::tempdir().unwrap();
        let service = service(&dir);
        let issued = service.issue(draft("Budi", &[])).await.unwrap();

        service.delete(issued.id).await.unwrap();
        assert!(service.delete(issued.id).await.unwrap_err().is_not_found());
        assert!(service.list(None).await.unwrap().letters.is_empty());
    }

    #[tokio::test]
    async fn test_list_keeps_query() {
        let dir = tempfile::tempdir().unwrap();
        let service = service(&dir);
        service.issue(draft("Budi", &[])).await.unwrap();
        service.issue(draft("Ani", &[])).await.unwrap();

        let view = service.list(Some("ani".to_string())).await.unwrap();
        assert_eq!(view.query, "ani");
        assert_eq!(view.letters.len(), 1);
        assert_eq!(view.letters[0].reporter_name, "Ani");
    }

    #[tokio::test]
    async fn test_print_view_spells_out_date() {
        let dir = tempfile::tempdir().unwrap();
        let service = service(&dir);
        let issued = service.issue(draft("Budi", &["KTP"])).await.unwrap();

        let view = service.print_view(issued.id).await.unwrap();

        assert_eq!(view.letter, issued);
        assert!(view.issued_on.ends_with(&issued.issued_at.format("%Y").to_string()));
        assert!(view.settings.signing_officer.is_none());
    }
}

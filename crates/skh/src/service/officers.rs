//! Officer registry operations.

use tracing::info;

use crate::error::{Error, Result};
use crate::model::{Officer, OfficerDraft, OfficerRole};
use crate::storage::{officers, Database};
use crate::view::OfficerListView;

/// Maintains the officers who sign and receive letters.
#[derive(Debug, Clone)]
pub struct OfficerService {
    db: Database,
}

impl OfficerService {
    /// Create a service over `db`.
    #[must_use]
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// List officers ordered by name, optionally only those with `role`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn list(&self, role: Option<OfficerRole>) -> Result<OfficerListView> {
        let officers = self
            .db
            .run(move |storage| officers::list(storage.conn(), role))
            .await?;
        Ok(OfficerListView { officers, role })
    }

    /// Get one officer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no officer has the id.
    pub async fn get(&self, id: i64) -> Result<Officer> {
        self.db
            .run(move |storage| {
                officers::get(storage.conn(), id)?.ok_or_else(|| Error::not_found("officer", id))
            })
            .await
    }

    /// Register a new officer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if the name is blank.
    pub async fn create(&self, draft: OfficerDraft) -> Result<Officer> {
        draft.validate()?;
        let officer = self
            .db
            .run(move |storage| {
                let id = officers::insert(storage.conn(), &draft)?;
                Ok(Officer::from_draft(id, draft))
            })
            .await?;
        info!("Registered officer {} as {}", officer.id, officer.role);
        Ok(officer)
    }

    /// Overwrite an officer's details.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if the name is blank and
    /// [`Error::NotFound`] if no officer has the id.
    pub async fn update(&self, id: i64, draft: OfficerDraft) -> Result<Officer> {
        draft.validate()?;
        self.db
            .run(move |storage| {
                if !officers::update(storage.conn(), id, &draft)? {
                    return Err(Error::not_found("officer", id));
                }
                Ok(Officer::from_draft(id, draft))
            })
            .await
    }

    /// Remove an officer. A settings reference to them is cleared.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no officer has the id.
    pub async fn delete(&self, id: i64) -> Result<()> {
        self.db
            .run(move |storage| {
                if officers::delete(storage.conn(), id)? {
                    Ok(())
                } else {
                    Err(Error::not_found("officer", id))
                }
            })
            .await?;
        info!("Removed officer {}", id);
        Ok(())
    }
}

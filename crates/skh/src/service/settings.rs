//! Settings form and update, including the letterhead logo upload.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use chrono::Datelike;
use regex::Regex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::model::{OfficerRole, SettingsDetails, SettingsUpdate};
use crate::numbering::ReferenceClock;
use crate::storage::{letters, officers, settings, Database};
use crate::view::SettingsView;

/// URL prefix under which uploaded files are served.
pub const UPLOADS_URL_PREFIX: &str = "/static/uploads";

/// Default cap on the size of an uploaded logo.
pub const DEFAULT_MAX_LOGO_BYTES: usize = 2 * 1024 * 1024;

static UNSAFE_NAME_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9._-]+").expect("file name pattern is valid"));

/// A logo file received from the settings form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogoUpload {
    /// Name the client gave the file.
    pub file_name: String,
    /// File contents.
    pub bytes: Vec<u8>,
}

/// A file written to the uploads directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredUpload {
    /// Location on disk.
    pub path: PathBuf,
    /// Path the file is served under, e.g. `/static/uploads/<name>`.
    pub public_path: String,
}

/// The directory uploaded logos are written to.
#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
    max_bytes: usize,
}

impl UploadStore {
    /// Create a store writing into `dir`, accepting files up to `max_bytes`.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>, max_bytes: usize) -> Self {
        Self {
            dir: dir.into(),
            max_bytes,
        }
    }

    /// The uploads directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Largest accepted upload in bytes.
    #[must_use]
    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Write an upload under a fresh unique name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for an oversized file and
    /// [`Error::FileWrite`] if the file cannot be written.
    pub async fn save(&self, upload: &LogoUpload) -> Result<StoredUpload> {
        if upload.bytes.len() > self.max_bytes {
            return Err(Error::validation(format!(
                "logo exceeds {} bytes",
                self.max_bytes
            )));
        }

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| Error::DirectoryCreate {
                path: self.dir.clone(),
                source,
            })?;

        let name = format!("{}_{}", Uuid::new_v4(), sanitize_file_name(&upload.file_name));
        let path = self.dir.join(&name);
        tokio::fs::write(&path, &upload.bytes)
            .await
            .map_err(|source| Error::FileWrite {
                path: path.clone(),
                source,
            })?;

        debug!("Stored upload at {}", path.display());
        Ok(StoredUpload {
            path,
            public_path: format!("{UPLOADS_URL_PREFIX}/{name}"),
        })
    }

    /// Remove a stored upload. Failures are logged only.
    pub async fn remove(&self, stored: &StoredUpload) {
        if let Err(e) = tokio::fs::remove_file(&stored.path).await {
            warn!("Failed to remove {}: {}", stored.path.display(), e);
        }
    }
}

/// Reduce a client-supplied file name to a safe final path component.
fn sanitize_file_name(raw: &str) -> String {
    let base = raw.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned = UNSAFE_NAME_CHARS.replace_all(base, "_");
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "logo".to_string()
    } else {
        cleaned.to_string()
    }
}

/// Reads and updates the settings singleton.
#[derive(Debug, Clone)]
pub struct SettingsService {
    db: Database,
    clock: ReferenceClock,
    uploads: UploadStore,
}

impl SettingsService {
    /// Create a service over `db` storing logos in `uploads`.
    #[must_use]
    pub fn new(db: Database, clock: ReferenceClock, uploads: UploadStore) -> Self {
        Self { db, clock, uploads }
    }

    /// The upload store logos are written to.
    #[must_use]
    pub fn uploads(&self) -> &UploadStore {
        &self.uploads
    }

    /// Current settings with the officers that can be designated.
    ///
    /// While no letters exist the last issued number reads as 0, matching
    /// what the next issuance will do.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SettingsUnavailable`] if the settings cannot be read.
    pub async fn view(&self) -> Result<SettingsView> {
        self.db
            .run(|storage| {
                let conn = storage.conn();
                let mut details =
                    settings::load_details(conn).map_err(Error::settings_unavailable)?;
                if letters::count(conn)? == 0 {
                    details.settings.last_issued_number = 0;
                }

                Ok(SettingsView {
                    settings: details,
                    signing_candidates: officers::list(conn, Some(OfficerRole::SigningOfficial))?,
                    receiving_candidates: officers::list(conn, Some(OfficerRole::Receiver))?,
                })
            })
            .await
    }

    /// Merge submitted fields into the settings, optionally replacing the logo.
    ///
    /// Without a new logo the stored logo path is kept. A zero counter year
    /// is replaced by the current year.
    ///
    /// # Errors
    ///
    /// - [`Error::Validation`] for invalid fields or an unknown officer id.
    /// - [`Error::FileWrite`] if the logo cannot be written; nothing is saved.
    /// - Any storage error; a logo written for this update is removed again.
    pub async fn update(
        &self,
        update: SettingsUpdate,
        logo: Option<LogoUpload>,
    ) -> Result<SettingsDetails> {
        update.validate()?;

        let stored = match &logo {
            Some(upload) => Some(self.uploads.save(upload).await?),
            None => None,
        };
        let logo_path = stored.as_ref().map(|s| s.public_path.clone());
        let current_year = self.clock.today().year();

        let result = self
            .db
            .run(move |storage| {
                let tx = storage.begin_immediate()?;
                let mut current = settings::load(&tx).map_err(Error::settings_unavailable)?;
                current.apply(update);

                if let Some(path) = logo_path {
                    current.logo_path = Some(path);
                }
                if current.last_issued_year == 0 {
                    current.last_issued_year = current_year;
                }
                for id in [current.signing_officer_id, current.receiving_officer_id]
                    .into_iter()
                    .flatten()
                {
                    if officers::get(&tx, id)?.is_none() {
                        return Err(Error::validation(format!("unknown officer id {id}")));
                    }
                }

                settings::save(&tx, &current)?;
                let details = settings::load_details(&tx)?;
                tx.commit()?;
                Ok(details)
            })
            .await;

        match result {
            Ok(details) => {
                info!("Settings updated");
                Ok(details)
            }
            Err(e) => {
                if let Some(stored) = &stored {
                    self.uploads.remove(stored).await;
                }
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::OfficerDraft;
    use crate::storage::DEFAULT_BUSY_TIMEOUT;

    struct Fixture {
        dir: tempfile::TempDir,
        db: Database,
        service: SettingsService,
    }

    fn fixture() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open(dir.path().join("skh.db"), DEFAULT_BUSY_TIMEOUT).unwrap();
        let uploads = UploadStore::new(dir.path().join("uploads"), 1024);
        let service = SettingsService::new(db.clone(), ReferenceClock::default(), uploads);
        Fixture { dir, db, service }
    }

    fn logo(name: &str) -> LogoUpload {
        LogoUpload {
            file_name: name.to_string(),
            bytes: b"\x89PNG fake".to_vec(),
        }
    }

    fn uploaded_files(fixture: &Fixture) -> usize {
        std::fs::read_dir(fixture.dir.path().join("uploads"))
            .map(|entries| entries.count())
            .unwrap_or(0)
    }

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("logo polres.png"), "logo_polres.png");
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("C:\\Users\\admin\\logo.png"), "logo.png");
        assert_eq!(sanitize_file_name(".hidden"), "hidden");
        assert_eq!(sanitize_file_name(""), "logo");
    }

    #[tokio::test]
    async fn test_update_stores_logo_and_fills_year() {
        let fixture = fixture();

        let details = fixture
            .service
            .update(
                SettingsUpdate {
                    letterhead_1: Some("KEPOLISIAN NEGARA REPUBLIK INDONESIA".into()),
                    ..SettingsUpdate::default()
                },
                Some(logo("logo.png")),
            )
            .await
            .unwrap();

        let logo_path = details.settings.logo_path.clone().unwrap();
        assert!(logo_path.starts_with("/static/uploads/"));
        assert!(logo_path.ends_with("_logo.png"));
        assert_eq!(details.settings.last_issued_year, ReferenceClock::default().today().year());
        assert_eq!(uploaded_files(&fixture), 1);
    }

    #[tokio::test]
    async fn test_update_without_logo_keeps_previous() {
        let fixture = fixture();
        let first = fixture
            .service
            .update(SettingsUpdate::default(), Some(logo("logo.png")))
            .await
            .unwrap();

        let second = fixture
            .service
            .update(
                SettingsUpdate {
                    region: Some("Makassar".into()),
                    ..SettingsUpdate::default()
                },
                None,
            )
            .await
            .unwrap();

        assert_eq!(second.settings.logo_path, first.settings.logo_path);
        assert_eq!(second.settings.region, "Makassar");
    }

    #[tokio::test]
    async fn test_failed_update_removes_new_logo() {
        let fixture = fixture();

        let err = fixture
            .service
            .update(
                SettingsUpdate {
                    signing_officer_id: Some(99),
                    ..SettingsUpdate::default()
                },
                Some(logo("logo.png")),
            )
            .await
            .unwrap_err();

        assert!(err.is_validation());
        assert_eq!(uploaded_files(&fixture), 0);
        let view = fixture.service.view().await.unwrap();
        assert!(view.settings.settings.logo_path.is_none());
    }

    #[tokio::test]
    async fn test_oversized_logo_rejected() {
        let fixture = fixture();
        let upload = LogoUpload {
            file_name: "big.png".into(),
            bytes: vec![0; 2048],
        };

        let err = fixture
            .service
            .update(SettingsUpdate::default(), Some(upload))
            .await
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[tokio::test]
    async fn test_view_lists_candidates_and_hides_stale_counter() {
        let fixture = fixture();
        let officer_id = fixture
            .db
            .run(|storage| {
                officers::insert(
                    storage.conn(),
                    &OfficerDraft {
                        name: "Hasan".into(),
                        rank: "AKP".into(),
                        service_number: "1".into(),
                        position: "KAPOLSEK".into(),
                        role: OfficerRole::SigningOfficial,
                    },
                )
            })
            .await
            .unwrap();

        fixture
            .service
            .update(
                SettingsUpdate {
                    last_issued_number: Some(15),
                    signing_officer_id: Some(officer_id),
                    ..SettingsUpdate::default()
                },
                None,
            )
            .await
            .unwrap();

        let view = fixture.service.view().await.unwrap();
        assert_eq!(view.settings.settings.last_issued_number, 0);
        assert_eq!(view.signing_candidates.len(), 1);
        assert!(view.receiving_candidates.is_empty());
        assert_eq!(
            view.settings.signing_officer.map(|o| o.name).as_deref(),
            Some("Hasan")
        );
    }
}

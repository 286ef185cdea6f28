//! Application services.
//!
//! Each service owns a [`Database`] handle and runs its blocking storage work
//! through [`Database::run`]. [`Services`] bundles them for the HTTP layer.

pub mod dashboard;
pub mod issuance;
pub mod letters;
pub mod officers;
pub mod settings;

pub use dashboard::{DashboardService, StatsSource};
pub use letters::LetterService;
pub use officers::OfficerService;
pub use settings::{LogoUpload, SettingsService, UploadStore};

use crate::numbering::ReferenceClock;
use crate::storage::Database;

/// All services over one database.
#[derive(Debug, Clone)]
pub struct Services {
    /// Letter issuance and maintenance.
    pub letters: LetterService,
    /// Officer registry.
    pub officers: OfficerService,
    /// Settings singleton.
    pub settings: SettingsService,
    /// Dashboard figures.
    pub dashboard: DashboardService,
}

impl Services {
    /// Wire every service to `db`.
    #[must_use]
    pub fn new(db: &Database, clock: ReferenceClock, uploads: UploadStore) -> Self {
        Self {
            letters: LetterService::new(db.clone(), clock),
            officers: OfficerService::new(db.clone()),
            settings: SettingsService::new(db.clone(), clock, uploads),
            dashboard: DashboardService::new(db.clone(), clock),
        }
    }
}

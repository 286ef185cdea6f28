//! `skh` - Records office for lost item report letters
//!
//! This library issues "surat keterangan hilang" letters under a sequential
//! number that restarts every calendar year, and keeps the officer registry
//! and letterhead settings the printed letters are built from.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod error;
pub mod form;
pub mod logging;
pub mod model;
pub mod numbering;
pub mod service;
pub mod storage;
pub mod view;
pub mod web;

pub use config::Config;
pub use error::{Error, Result};
pub use logging::init_logging;
pub use model::{Letter, LetterDraft, LostItem, Officer, OfficerDraft, OfficerRole, Reporter, Settings};
pub use numbering::ReferenceClock;
pub use service::Services;
pub use storage::{Database, Storage, StorageStats};

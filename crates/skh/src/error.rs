//! Error types for skh.
//!
//! This module defines all error types used throughout the skh crate. Lower
//! layers return these typed failures, the service layer wraps them with
//! context, and the HTTP boundary maps them to responses.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for skh operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Domain Errors ===
    /// Submitted data is missing a required field or is otherwise invalid.
    #[error("validation failed: {message}")]
    Validation {
        /// Description of the validation failure.
        message: String,
    },

    /// A referenced record does not exist.
    #[error("{entity} {id} not found")]
    NotFound {
        /// Kind of record that was looked up.
        entity: &'static str,
        /// Identity that was requested.
        id: i64,
    },

    /// The settings singleton could not be read.
    #[error("settings unavailable: {source}")]
    SettingsUnavailable {
        /// The underlying storage error.
        #[source]
        source: Box<Error>,
    },

    /// The letter counter is at its maximum and cannot be incremented.
    #[error("letter counter exhausted at {last_number}")]
    CounterExhausted {
        /// The stored counter value.
        last_number: i64,
    },

    /// A month number outside 1-12 reached the numbering engine.
    #[error("month {0} has no roman numeral")]
    InvalidMonth(u32),

    // === Storage Errors ===
    /// Failed to open or create the database.
    #[error("failed to open database at {path}: {source}")]
    DatabaseOpen {
        /// Path to the database file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// A database query failed.
    #[error("database query failed: {0}")]
    DatabaseQuery(#[from] rusqlite::Error),

    /// Failed to run database migrations.
    #[error("database migration failed: {message}")]
    DatabaseMigration {
        /// Description of what went wrong.
        message: String,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to write an uploaded file.
    #[error("failed to write file {path}: {source}")]
    FileWrite {
        /// Destination of the write.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Generic Errors ===
    /// An internal error occurred (bug or aborted background task).
    #[error("internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for skh operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a new validation error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a not-found error for the given entity kind and identity.
    #[must_use]
    pub fn not_found(entity: &'static str, id: i64) -> Self {
        Self::NotFound { entity, id }
    }

    /// Wrap a failure that happened while reading the settings row.
    #[must_use]
    pub fn settings_unavailable(source: impl Into<Error>) -> Self {
        Self::SettingsUnavailable {
            source: Box::new(source.into()),
        }
    }

    /// Create a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Check if this error was caused by invalid input.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    /// Check if this error reports a missing record.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this error originated in the database layer.
    #[must_use]
    pub fn is_storage(&self) -> bool {
        matches!(
            self,
            Self::DatabaseOpen { .. }
                | Self::DatabaseQuery(_)
                | Self::DatabaseMigration { .. }
                | Self::SettingsUnavailable { .. }
        )
    }
}

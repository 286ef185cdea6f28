//! Storage layer for skh.
//!
//! This module provides `SQLite`-based persistent storage for letters, their
//! lost items, officers and the settings singleton.
//!
//! [`Storage`] wraps one open connection. [`Database`] is a cheap, cloneable
//! handle that opens a fresh [`Storage`] per unit of work, so request
//! handlers and the dashboard's parallel reads never share a connection.
//! Table access lives in the [`letters`], [`officers`], [`settings`] and
//! [`stats`] submodules as free functions over a borrowed connection, which
//! lets the same code run inside or outside a transaction.

pub mod letters;
pub mod migrations;
pub mod officers;
pub mod schema;
pub mod settings;
pub mod stats;

use std::path::{Path, PathBuf};
use std::time::Duration;

use rusqlite::{Connection, Transaction, TransactionBehavior};
use serde::Serialize;
use tracing::{debug, info};

use crate::error::{Error, Result};

/// Default time a writer waits for the database lock.
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// A single open connection to the skh database.
#[derive(Debug)]
pub struct Storage {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Connection,
}

impl Storage {
    /// Open or create a storage database at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist
    /// and brings the schema up to date.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or migration fails.
    pub fn open(path: impl AsRef<Path>, busy_timeout: Duration) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        let storage = Self::connect(&path, busy_timeout)?;

        // WAL lets the dashboard read while a letter is being issued
        storage
            .conn
            .execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;

        migrations::initialize_schema(&storage.conn)?;

        info!("Database opened successfully at {}", path.display());
        Ok(storage)
    }

    /// Open a connection to an existing, already migrated database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened.
    pub fn connect(path: impl AsRef<Path>, busy_timeout: Duration) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        debug!("Opening database at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;
        Self::configure(&conn, busy_timeout)?;

        Ok(Self { path, conn })
    }

    /// Create an in-memory storage instance for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;
        Self::configure(&conn, DEFAULT_BUSY_TIMEOUT)?;
        migrations::initialize_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn,
        })
    }

    fn configure(conn: &Connection, busy_timeout: Duration) -> Result<()> {
        conn.busy_timeout(busy_timeout)?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(())
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Borrow the underlying connection.
    #[must_use]
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Start a transaction that takes the write lock immediately.
    ///
    /// Concurrent callers queue on the lock (up to the busy timeout), so
    /// anything read inside the transaction cannot be changed by another
    /// writer before commit.
    ///
    /// # Errors
    ///
    /// Returns an error if the lock cannot be acquired.
    pub fn begin_immediate(&mut self) -> Result<Transaction<'_>> {
        Ok(self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?)
    }

    /// Get database statistics.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn stats(&self) -> Result<StorageStats> {
        let total_letters = letters::count(&self.conn)?;
        let total_officers = officers::count(&self.conn)?;
        let current = settings::load(&self.conn)?;
        let schema_version = migrations::get_schema_version(&self.conn)?;

        let db_size_bytes = if self.path.as_os_str() == ":memory:" {
            0
        } else {
            std::fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0)
        };

        Ok(StorageStats {
            total_letters,
            total_officers,
            last_issued_number: current.last_issued_number,
            last_issued_year: current.last_issued_year,
            schema_version,
            db_size_bytes,
        })
    }
}

/// Statistics about the storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StorageStats {
    /// Number of letters stored.
    pub total_letters: i64,
    /// Number of officers registered.
    pub total_officers: i64,
    /// Counter value of the most recent issuance.
    pub last_issued_number: i64,
    /// Year the counter belongs to.
    pub last_issued_year: i32,
    /// Applied schema version.
    pub schema_version: i32,
    /// Size of the database file in bytes.
    pub db_size_bytes: u64,
}

/// Shareable handle to the database file.
///
/// Holds no connection itself; every call to [`Database::connect`] or
/// [`Database::run`] opens its own.
#[derive(Debug, Clone)]
pub struct Database {
    path: PathBuf,
    busy_timeout: Duration,
}

impl Database {
    /// Open the database, creating and migrating it if necessary.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open(path: impl AsRef<Path>, busy_timeout: Duration) -> Result<Self> {
        let storage = Storage::open(path.as_ref(), busy_timeout)?;
        Ok(Self {
            path: storage.path().to_path_buf(),
            busy_timeout,
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Open a new connection.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened.
    pub fn connect(&self) -> Result<Storage> {
        Storage::connect(&self.path, self.busy_timeout)
    }

    /// Run blocking storage work on the runtime's blocking pool.
    ///
    /// # Errors
    ///
    /// Returns the closure's error, a connection error, or an internal error
    /// if the blocking task panicked.
    pub async fn run<T, F>(&self, work: F) -> Result<T>
    where
        F: FnOnce(&mut Storage) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let db = self.clone();
        tokio::task::spawn_blocking(move || {
            let mut storage = db.connect()?;
            work(&mut storage)
        })
        .await
        .map_err(|e| Error::internal(format!("storage task failed: {e}")))?
    }
}

//! Connection management: write-serialized + read-pooled.

pub mod pool;
pub mod pragmas;
pub mod writer;

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use rusqlite::Connection;
use therapy_core::config::StorageConfig;
use therapy_core::errors::StorageError;

use self::pool::ReadPool;
use self::pragmas::apply_pragmas;
use crate::migrations;

/// Owns the single write connection and, for file databases, a read pool.
pub struct DatabaseManager {
    writer: Mutex<Connection>,
    readers: Option<ReadPool>,
    path: Option<PathBuf>,
}

impl DatabaseManager {
    /// Open a database at `path` with default settings, run migrations.
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        let config = StorageConfig {
            db_path: Some(path.display().to_string()),
            ..Default::default()
        };
        Self::open_with_config(&config)
    }

    /// Open the database named by `config`, apply pragmas, run migrations.
    pub fn open_with_config(config: &StorageConfig) -> Result<Self, StorageError> {
        let db = Self::open_unmigrated(config)?;
        db.with_writer(|conn| migrations::run_migrations(conn))?;
        Ok(db)
    }

    /// Open without running migrations, for inspecting or repairing a
    /// database whose pending migrations cannot be applied.
    pub fn open_unmigrated(config: &StorageConfig) -> Result<Self, StorageError> {
        let path = config.effective_db_path();
        let writer = Connection::open(&path)?;
        apply_pragmas(&writer, config.effective_busy_timeout_ms())?;

        let readers = ReadPool::open(
            &path,
            config.effective_read_pool_size(),
            config.effective_busy_timeout_ms(),
        )?;
        tracing::debug!(path = %path.display(), readers = readers.size(), "opened database");

        Ok(Self {
            writer: Mutex::new(writer),
            readers: Some(readers),
            path: Some(path),
        })
    }

    /// Open an in-memory database (for testing). Reads go through the writer.
    pub fn open_in_memory() -> Result<Self, StorageError> {
        let writer = Connection::open_in_memory()?;
        apply_pragmas(&writer, 5000)?;
        migrations::run_migrations(&writer)?;
        Ok(Self {
            writer: Mutex::new(writer),
            readers: None,
            path: None,
        })
    }

    /// Execute a write operation with the serialized writer connection.
    pub fn with_writer<F, T, E>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&Connection) -> Result<T, E>,
        E: From<StorageError>,
    {
        let guard = self.writer.lock().map_err(|_| StorageError::SqliteError {
            message: "write lock poisoned".to_string(),
        })?;
        f(&guard)
    }

    /// Execute a read operation with a pooled read connection.
    pub fn with_reader<F, T, E>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&Connection) -> Result<T, E>,
        E: From<StorageError>,
    {
        match &self.readers {
            Some(pool) => pool.with_conn(f),
            None => self.with_writer(f),
        }
    }

    /// Run a WAL checkpoint (TRUNCATE mode) after a bulk load.
    pub fn checkpoint(&self) -> Result<(), StorageError> {
        self.with_writer(|conn| {
            conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")
                .map_err(StorageError::from)
        })
    }

    /// Database file path (None for in-memory).
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

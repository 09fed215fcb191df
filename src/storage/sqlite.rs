//! SQLite-backed key-value store.
//!
//! Values are stored as JSON text in a single `kv` table. `rusqlite::Connection`
//! isn't Sync, so it sits behind a `Mutex`; every operation is a single short
//! statement.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use rusqlite::{Connection, OptionalExtension, params};

use super::KeyValueStore;
use crate::error::{Result, SchedulerError};

fn storage_err(e: impl std::fmt::Display) -> SchedulerError {
    SchedulerError::Storage(e.to_string())
}

/// Key-value store in a SQLite database file
pub struct SqliteStore {
    path: PathBuf,
    db: Mutex<Connection>,
}

impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore").field("path", &self.path).finish_non_exhaustive()
    }
}

impl SqliteStore {
    /// Open or create the database at `path`, creating parent directories.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let db = Connection::open(&path).map_err(storage_err)?;
        Self::init_schema(&db)?;

        Ok(Self {
            path,
            db: Mutex::new(db),
        })
    }

    /// Open a private in-memory database
    pub fn open_in_memory() -> Result<Self> {
        let db = Connection::open_in_memory().map_err(storage_err)?;
        Self::init_schema(&db)?;
        Ok(Self {
            path: PathBuf::from(":memory:"),
            db: Mutex::new(db),
        })
    }

    fn init_schema(db: &Connection) -> Result<()> {
        db.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at INTEGER NOT NULL
            );
            "#,
        )
        .map_err(storage_err)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<serde_json::Value>> {
        let db = self.db.lock().map_err(storage_err)?;
        let text: Option<String> = db
            .query_row("SELECT value FROM kv WHERE key = ?1", [key], |row| row.get(0))
            .optional()
            .map_err(storage_err)?;

        match text {
            Some(text) => Ok(Some(serde_json::from_str(&text)?)),
            None => Ok(None),
        }
    }

    fn set(&self, key: &str, value: &serde_json::Value) -> Result<()> {
        let text = serde_json::to_string(value)?;
        let now = chrono::Utc::now().timestamp_millis();
        let db = self.db.lock().map_err(storage_err)?;
        db.execute(
            "INSERT OR REPLACE INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)",
            params![key, text, now],
        )
        .map_err(storage_err)?;
        Ok(())
    }
}

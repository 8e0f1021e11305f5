// SQLite-backed key-value store

use crate::backend::Backend;
use eyre::{Context, Result};
use rusqlite::{Connection, OptionalExtension};
use std::path::Path;
use tracing::debug;

/// Key-value table in a SQLite database, the desktop analogue of browser local storage
pub struct SqliteBackend {
    db: Connection,
}

impl SqliteBackend {
    /// Open or create the database file at `path`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create database directory")?;
        }
        let db = Connection::open(path).context("Failed to open SQLite database")?;
        Self::with_connection(db)
    }

    /// Open a private in-memory database
    pub fn open_in_memory() -> Result<Self> {
        let db = Connection::open_in_memory().context("Failed to open in-memory SQLite database")?;
        Self::with_connection(db)
    }

    fn with_connection(db: Connection) -> Result<Self> {
        let backend = Self { db };
        backend.create_schema()?;
        Ok(backend)
    }

    /// Get a reference to the SQLite database connection
    pub fn db(&self) -> &Connection {
        &self.db
    }

    fn create_schema(&self) -> Result<()> {
        debug!("Creating kv schema");

        self.db.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at INTEGER NOT NULL
            );
            "#,
        )?;

        Ok(())
    }
}

impl Backend for SqliteBackend {
    fn read(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .db
            .query_row("SELECT value FROM kv WHERE key = ?1", [key], |row| row.get::<_, String>(0))
            .optional()
            .context("Failed to read from kv table")?;
        Ok(value)
    }

    fn write(&mut self, key: &str, value: &str) -> Result<()> {
        let updated_at = chrono::Utc::now().timestamp_millis();
        self.db
            .execute(
                "INSERT OR REPLACE INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)",
                rusqlite::params![key, value, updated_at],
            )
            .context("Failed to write to kv table")?;

        debug!(key, bytes = value.len(), "Wrote blob");
        Ok(())
    }
}

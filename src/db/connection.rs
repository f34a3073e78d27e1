use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::Connection;
use tracing::{debug, info};

use crate::error::Result as CatalogResult;
use crate::repository::{UnitOfWork, UnitOfWorkFactory};

use super::unit_of_work::SqliteUnitOfWork;

/// Owner of the SQLite connection and the factory for units of work.
///
/// Every unit of work runs as one transaction on this connection, so only one
/// can be open at a time; trying to open a second one while the first is alive
/// fails with a transaction error instead of silently nesting.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (or create) the database file, creating parent directories as
    /// needed, and make sure the schema exists.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).context("failed to create data directory")?;
            }
        }

        let conn = Connection::open(path).context("failed to open SQLite database")?;
        info!(path = %path.display(), "opened catalog database");
        Self::from_connection(conn)
    }

    /// Private in-memory database with the full schema. Used by tests.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("failed to open in-memory database")?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        ensure_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Raw access to the underlying connection, for diagnostics and tests.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl UnitOfWorkFactory for Database {
    fn unit_of_work(&self) -> CatalogResult<Box<dyn UnitOfWork + '_>> {
        Ok(Box::new(SqliteUnitOfWork::begin(&self.conn)?))
    }
}

/// Turn on referential integrity and create any missing tables. Safe to run on
/// every start: each statement is `IF NOT EXISTS`.
pub fn ensure_schema(conn: &Connection) -> Result<()> {
    conn.execute("PRAGMA foreign_keys = ON", [])
        .context("failed to enable foreign keys")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS authors (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL UNIQUE
        )",
        [],
    )
    .context("failed to create authors table")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS books (
            id TEXT PRIMARY KEY,
            author_id TEXT NOT NULL REFERENCES authors(id),
            title TEXT NOT NULL,
            publication_year INTEGER NOT NULL
        )",
        [],
    )
    .context("failed to create books table")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS book_tags (
            book_id TEXT NOT NULL REFERENCES books(id),
            tag TEXT NOT NULL
        )",
        [],
    )
    .context("failed to create book_tags table")?;

    debug!("catalog schema ready");
    Ok(())
}

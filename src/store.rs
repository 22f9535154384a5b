//! Store module for querycsv
//!
//! This module wraps the SQLite connection that holds imported tables and
//! runs queries. A store is either a transient in-memory database or a named
//! file on disk.
//!
//! Entry points that accept a store take a `StoreHandle`, which says
//! explicitly whether the call owns the store (and closes it when done) or
//! borrows one the caller keeps managing.

use std::ops::Deref;
use std::path::{Path, PathBuf};

use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

use crate::error::{QueryCsvError, QueryCsvResult};

/// Where a store keeps its data
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreLocation {
    /// Transient database that disappears when the store is closed
    Memory,
    /// Database file on disk
    File(PathBuf),
}

/// A SQLite database holding imported tables
pub struct Store {
    conn: Connection,
    location: StoreLocation,
}

impl Store {
    /// Open a store at the given location
    ///
    /// File stores are created if the file doesn't exist yet.
    pub fn open(location: StoreLocation) -> QueryCsvResult<Self> {
        let conn = match &location {
            StoreLocation::Memory => Connection::open_in_memory()?,
            StoreLocation::File(path) => Connection::open(path)?,
        };
        debug!("Opened store {:?}", location);
        Ok(Store { conn, location })
    }

    /// Open a transient in-memory store
    pub fn open_in_memory() -> QueryCsvResult<Self> {
        Self::open(StoreLocation::Memory)
    }

    /// Open (or create) a store backed by a file
    pub fn open_file<P: AsRef<Path>>(path: P) -> QueryCsvResult<Self> {
        Self::open(StoreLocation::File(path.as_ref().to_path_buf()))
    }

    /// Where this store keeps its data
    pub fn location(&self) -> &StoreLocation {
        &self.location
    }

    /// The underlying SQLite connection
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Check if a table exists
    ///
    /// # Arguments
    /// * `name` - Name of the table to check
    pub fn has_table(&self, name: &str) -> QueryCsvResult<bool> {
        let found = self
            .conn
            .query_row(
                "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1",
                params![name],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }

    /// Names of all tables in the store, sorted
    pub fn table_names(&self) -> QueryCsvResult<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name",
        )?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(names)
    }

    /// Close the store, reporting any error SQLite raises while closing
    pub fn close(self) -> QueryCsvResult<()> {
        let location = self.location;
        self.conn.close().map_err(|(_, err)| QueryCsvError::Store(err))?;
        debug!("Closed store {:?}", location);
        Ok(())
    }
}

/// A store passed into an entry point, either owned by the call or borrowed
pub enum StoreHandle<'a> {
    /// Opened for this call and closed before the call returns
    Owned(Store),
    /// Managed by the caller and left open
    Borrowed(&'a Store),
}

impl<'a> StoreHandle<'a> {
    /// Open a store that the receiving call will own
    pub fn open(location: StoreLocation) -> QueryCsvResult<Self> {
        Ok(StoreHandle::Owned(Store::open(location)?))
    }

    /// Borrow a store the caller keeps open
    pub fn borrowed(store: &'a Store) -> Self {
        StoreHandle::Borrowed(store)
    }

    /// Close an owned store; a borrowed store is left untouched
    pub fn finish(self) -> QueryCsvResult<()> {
        match self {
            StoreHandle::Owned(store) => store.close(),
            StoreHandle::Borrowed(_) => Ok(()),
        }
    }
}

impl Deref for StoreHandle<'_> {
    type Target = Store;

    fn deref(&self) -> &Store {
        match self {
            StoreHandle::Owned(store) => store,
            StoreHandle::Borrowed(store) => store,
        }
    }
}

/// Quote an identifier for use in SQLite statements
///
/// The name is wrapped in double quotes with embedded double quotes doubled,
/// so header text containing spaces, brackets or reserved words is accepted.
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

//! Store handle owning a single SQLite connection.
//!
//! Connection setup registers the custom scalar predicates, which is why
//! the handle holds its connection rather than reconnecting per
//! statement. The handle is request-scoped state, not a global: it is
//! constructed once at startup and passed to the operations that need it.

use std::path::Path;

use rusqlite::Connection;

use crate::error::Result;
use crate::functions::{register_functions, standard_functions, DbFunction};
use crate::schema::init_schema;

pub struct MetadataStore {
    pub(crate) conn: Connection,
}

impl MetadataStore {
    /// Open (creating if absent) the metadata database at `path`,
    /// registering the standard string-distance predicates.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path.as_ref())?;
        Self::setup(conn, &standard_functions())
    }

    /// In-memory store for tests.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::setup(conn, &standard_functions())
    }

    /// Open with an explicit predicate set.
    pub fn open_with_functions(path: impl AsRef<Path>, functions: &[DbFunction]) -> Result<Self> {
        let conn = Connection::open(path.as_ref())?;
        Self::setup(conn, functions)
    }

    fn setup(conn: Connection, functions: &[DbFunction]) -> Result<Self> {
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
        register_functions(&conn, functions)?;
        init_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Direct access for read-only statements that do not fit a
    /// dedicated operation.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

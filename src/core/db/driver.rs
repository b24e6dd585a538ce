//! Driver abstraction for the session layer.
//!
//! The session depends on exactly the capability set expressed here:
//! prepare a statement, bind values by 1-based position, execute, fetch all
//! rows as ordered column-name mappings, and probe liveness. Every backend
//! raises `DriverError` rather than returning silent error codes.

use crate::core::db::params::{BindType, Row, Value};
use crate::core::db::session::SessionConfig;
use crate::core::db::{pg, sqlite};
use thiserror::Error;

/// Errors raised by a concrete driver backend.
#[derive(Error, Debug)]
pub enum DriverError {
    #[error("{0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("{0}")]
    Postgres(#[from] postgres::Error),

    /// Bind-stage violations detected before the wire (bad position, failed coercion)
    #[error("{0}")]
    Bind(String),

    /// Backend-reported failures without a structured source
    #[error("{0}")]
    Other(String),
}

/// The closed set of supported driver backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverKind {
    /// PostgreSQL over the blocking `postgres` client (the default)
    Postgres,
    /// SQLite via `rusqlite`; the configured database name is the file path
    Sqlite,
}

impl DriverKind {
    /// Identifier assumed when the configuration names no driver.
    pub const DEFAULT_IDENT: &'static str = "pgsql";

    /// Parses a configuration driver identifier.
    pub fn from_ident(ident: &str) -> Option<Self> {
        match ident {
            "pgsql" | "postgres" | "postgresql" => Some(DriverKind::Postgres),
            "sqlite" | "sqlite3" => Some(DriverKind::Sqlite),
            _ => None,
        }
    }
}

/// A prepared statement ready for positional binding and execution.
pub trait DriverStatement {
    /// Binds one value at a 1-based placeholder position using the resolved
    /// bind mode. A failure discards the statement; the caller must not
    /// continue binding or execute.
    fn bind_value(&mut self, position: usize, value: &Value, ty: BindType) -> Result<(), DriverError>;

    /// Executes the statement. With `want_rows` the full result set is
    /// fetched as ordered rows; without it the statement is still run but
    /// no rows are collected.
    fn execute(&mut self, want_rows: bool) -> Result<Vec<Row>, DriverError>;
}

/// An open connection handle owned by exactly one session.
pub trait DriverConnection {
    /// Prepares a statement for later binding and execution.
    fn prepare<'c>(&'c mut self, sql: &str) -> Result<Box<dyn DriverStatement + 'c>, DriverError>;

    /// Liveness probe: a trivial `SELECT 1` round trip.
    fn ping(&mut self) -> Result<(), DriverError>;
}

/// Opens a fresh connection for the configured backend.
pub fn open(config: &SessionConfig) -> Result<Box<dyn DriverConnection>, DriverError> {
    match config.driver() {
        DriverKind::Postgres => Ok(Box::new(pg::PostgresDriver::open(config)?)),
        DriverKind::Sqlite => Ok(Box::new(sqlite::SqliteDriver::open(config)?)),
    }
}

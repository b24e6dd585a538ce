/// Session Error Module
///
/// This module defines the error types for the database session layer.
/// Every failure is scoped to the operation stage it occurred in, so the
/// session can render stage-specific diagnostics without letting driver
/// errors escape the public API.
use crate::core::db::driver::DriverError;
use std::fmt;
use thiserror::Error;

/// The stage of a query call a failure belongs to.
///
/// A query call proceeds connection -> prepare -> bind -> execute; once a
/// stage fails, all later stages are skipped for that call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryStage {
    /// Connection validation (including an optional reconnect attempt)
    Connection,
    /// Statement preparation
    Prepare,
    /// Positional parameter binding
    Bind,
    /// Statement execution and row fetching
    Execute,
}

impl fmt::Display for QueryStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            QueryStage::Connection => "connection",
            QueryStage::Prepare => "prepare",
            QueryStage::Bind => "bindValue",
            QueryStage::Execute => "execute",
        };
        write!(f, "{}", name)
    }
}

/// Error type for the database session layer.
///
/// Driver errors (`rusqlite::Error`, `postgres::Error`) are wrapped into
/// `DriverError` at the driver boundary and rendered into stage-scoped
/// messages here; callers of the session never see a raw driver error.
#[derive(Error, Debug)]
pub enum SessionError {
    /// Configuration validation errors (missing/empty required keys, unknown driver)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Connection establishment errors
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Operation attempted without a connection handle
    #[error("Bad or no connection")]
    NotConnected,

    /// Parameter descriptor violations (type-code string shorter than the value list)
    #[error("{0}")]
    Params(String),

    /// A query stage rejected by the underlying driver
    #[error("Request to DB failed on {stage}: {message}")]
    Query { stage: QueryStage, message: String },

    /// Errors surfaced directly from a driver outside a query call
    #[error("Driver error: {0}")]
    Driver(#[from] DriverError),

    /// File system and I/O errors (configuration loading)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Type alias for Result to use SessionError as the error type.
pub type Result<T> = std::result::Result<T, SessionError>;

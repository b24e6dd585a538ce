/// Core Module
///
/// This module contains the fundamental components of the session helper:
/// the database layer and the shared error infrastructure.

pub mod db;
pub mod error;

// Re-export commonly used types for convenience
pub use error::{QueryStage, Result, SessionError};

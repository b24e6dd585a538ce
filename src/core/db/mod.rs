/// Database Module
///
/// This module provides the database session layer, organized into focused
/// submodules for better maintainability and separation of concerns.
///
/// ## Architecture
///
/// The layer is split into three main concerns:
/// - **Session** (`session.rs`): One connection handle, the connect/check/query operations
/// - **Parameter Protocol** (`params.rs`): The type-code descriptor, values, and rows
/// - **Drivers** (`driver.rs`, `sqlite.rs`, `pg.rs`): The backend capability traits and
///   their PostgreSQL and SQLite implementations
///
/// ## Error Handling
///
/// All database operations use the standardized `SessionError` type; driver
/// errors never cross the session boundary unwrapped.
pub mod driver;
pub mod params;
pub mod pg;
pub mod session;
pub mod sqlite;

pub use driver::{DriverConnection, DriverError, DriverKind, DriverStatement};
pub use params::{BindType, Params, Row, Value};
pub use session::{QueryOutcome, Session, SessionConfig, Status};

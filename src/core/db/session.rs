//! Database session: one connection handle, three operations.
//!
//! A `Session` composes an immutable, eagerly validated `SessionConfig`
//! with an explicit tagged connection state. Public operations report
//! failure through their return value plus a readable `last_error` field;
//! the error field is cleared at the start of every public operation and
//! set only when that operation fails. Access is serialized by `&mut self`;
//! the handle is exclusively owned, replaced on reconnect, and dropped on
//! disconnect.

use crate::config::DatabaseSettings;
use crate::core::db::driver::{self, DriverConnection, DriverKind};
use crate::core::db::params::{Params, Row};
use crate::core::error::{QueryStage, Result, SessionError};
use std::fmt;
use tracing::{debug, error};

/// Session connection status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Disconnected,
    Connected,
}

/// Validated, immutable connection configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    host: String,
    port: u16,
    database: String,
    user: String,
    password: String,
    driver: DriverKind,
    auto_reconnect: bool,
}

impl SessionConfig {
    /// Validates raw settings into a usable configuration.
    ///
    /// Host, port, database name, and user are required; a missing or
    /// empty value fails validation. The driver defaults to the
    /// PostgreSQL-compatible backend, the password to empty, and
    /// auto-reconnect to off.
    pub fn from_settings(settings: &DatabaseSettings) -> Result<Self> {
        let host = required(settings.host.as_deref(), "host")?;
        let port = settings
            .port
            .ok_or_else(|| SessionError::Config("missing required key: port".to_string()))?;
        let database = required(settings.name.as_deref(), "name")?;
        let user = required(settings.user.as_deref(), "user")?;

        let driver = match settings.driver.as_deref() {
            None => DriverKind::from_ident(DriverKind::DEFAULT_IDENT)
                .ok_or_else(|| SessionError::Config("no default driver".to_string()))?,
            Some(ident) => DriverKind::from_ident(ident)
                .ok_or_else(|| SessionError::Config(format!("unknown driver: {}", ident)))?,
        };

        Ok(SessionConfig {
            host,
            port,
            database,
            user,
            password: settings.password.clone().unwrap_or_default(),
            driver,
            auto_reconnect: settings.auto_reconnect.unwrap_or(false),
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn driver(&self) -> DriverKind {
        self.driver
    }

    /// Whether `query()` may attempt a fresh connection when the session
    /// is disconnected. Off by default; never enabled implicitly.
    pub fn auto_reconnect(&self) -> bool {
        self.auto_reconnect
    }

    /// Keyword/value connection string for the PostgreSQL backend.
    pub fn dsn(&self) -> String {
        let mut dsn = format!(
            "host={} port={} dbname={} user={}",
            self.host, self.port, self.database, self.user
        );
        if !self.password.is_empty() {
            dsn.push_str(&format!(" password={}", self.password));
        }
        dsn
    }
}

fn required(value: Option<&str>, key: &str) -> Result<String> {
    match value {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(SessionError::Config(format!(
            "missing required key: {}",
            key
        ))),
    }
}

/// Explicit connection lifecycle state; only the session opens or closes
/// the handle.
enum ConnState {
    Disconnected,
    Connected(Box<dyn DriverConnection>),
}

/// Result of a `query()` call.
///
/// A successful SELECT that returns zero rows is indistinguishable from a
/// successful non-row statement at this boundary: both are `Success`.
/// Failure is a distinct variant, never an empty row sequence, so callers
/// must not use emptiness to detect errors.
#[derive(Debug)]
pub enum QueryOutcome {
    /// Statement ran; no rows requested or none returned
    Success,
    /// Rows were requested and at least one came back
    Rows(Vec<Row>),
    /// The call failed; the diagnostic is in `Session::last_error`
    Failed,
}

impl QueryOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, QueryOutcome::Failed)
    }

    pub fn rows(&self) -> Option<&[Row]> {
        match self {
            QueryOutcome::Rows(rows) => Some(rows),
            _ => None,
        }
    }
}

/// A database session owning a single connection handle.
pub struct Session {
    config: Option<SessionConfig>,
    state: ConnState,
    last_error: Option<String>,
}

impl Session {
    /// Constructs a session from raw settings.
    ///
    /// Never panics: invalid settings yield a session carrying the
    /// validation diagnostic in `last_error`, and every subsequent
    /// operation fails cleanly. No I/O happens at construction time.
    pub fn new(settings: &DatabaseSettings) -> Self {
        match SessionConfig::from_settings(settings) {
            Ok(config) => Session {
                config: Some(config),
                state: ConnState::Disconnected,
                last_error: None,
            },
            Err(e) => {
                error!("session construction failed: {}", e);
                Session {
                    config: None,
                    state: ConnState::Disconnected,
                    last_error: Some(e.to_string()),
                }
            }
        }
    }

    /// Constructs a session from an already validated configuration.
    pub fn with_config(config: SessionConfig) -> Self {
        Session {
            config: Some(config),
            state: ConnState::Disconnected,
            last_error: None,
        }
    }

    pub fn status(&self) -> Status {
        match self.state {
            ConnState::Disconnected => Status::Disconnected,
            ConnState::Connected(_) => Status::Connected,
        }
    }

    /// Diagnostic from the most recent failed operation, if any.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Opens a fresh connection from the stored configuration, replacing
    /// any prior handle. On failure any prior handle has been dropped, the
    /// session is disconnected, and `last_error` carries a "Connection
    /// failed" diagnostic.
    pub fn connect(&mut self) -> bool {
        self.last_error = None;
        match self.try_connect() {
            Ok(()) => {
                debug!("connection established");
                true
            }
            Err(e) => {
                let msg = e.to_string();
                error!("{}", msg);
                self.last_error = Some(msg);
                false
            }
        }
    }

    fn try_connect(&mut self) -> Result<()> {
        // A fresh attempt always replaces the prior handle: on failure the
        // session ends up disconnected, never holding a stale connection.
        self.state = ConnState::Disconnected;
        let config = self
            .config
            .as_ref()
            .ok_or_else(|| SessionError::Connection("no or bad configuration".to_string()))?;
        let handle =
            driver::open(config).map_err(|e| SessionError::Connection(e.to_string()))?;
        self.state = ConnState::Connected(handle);
        Ok(())
    }

    /// Probes the connection with a trivial round trip.
    ///
    /// With no handle this returns false without setting an error: a
    /// not-yet-connected session is a state, not a failure. A failed probe
    /// is treated as proof the connection is unusable: the error is set
    /// and the handle is dropped before returning false.
    pub fn check(&mut self) -> bool {
        self.last_error = None;
        let probe = match &mut self.state {
            ConnState::Disconnected => return false,
            ConnState::Connected(handle) => handle.ping(),
        };
        match probe {
            Ok(()) => true,
            Err(e) => {
                let msg = format!("Request to DB failed on execute, disconnected: {}", e);
                error!("{}", msg);
                self.last_error = Some(msg);
                self.state = ConnState::Disconnected;
                false
            }
        }
    }

    /// Drops the connection handle and resets the status. Idempotent.
    pub fn disconnect(&mut self) -> bool {
        self.last_error = None;
        debug!("closing connection handle");
        self.state = ConnState::Disconnected;
        true
    }

    /// Prepares, binds, and executes `text` against the open connection.
    ///
    /// Parameters are bound positionally from the descriptor's type-code
    /// string; the code count is validated against the value count before
    /// any binding starts. Any stage failure aborts the call, sets
    /// `last_error` to a diagnostic carrying the query text and the bound
    /// values so far, and returns `Failed`. With `want_rows` the full
    /// result set is fetched; otherwise the statement is executed and a
    /// plain `Success` is returned.
    ///
    /// When the configured auto-reconnect policy is on, a disconnected
    /// session attempts `connect()` first and the whole call fails if that
    /// attempt fails. With the policy off (the default) a disconnected
    /// session fails immediately.
    pub fn query(&mut self, text: &str, params: &Params, want_rows: bool) -> QueryOutcome {
        self.last_error = None;
        let mut prefix = format!("query: {},", text);
        debug!("executing query: {}", text);

        match self.run_query(text, params, want_rows, &mut prefix) {
            Ok(rows) => {
                if want_rows && !rows.is_empty() {
                    QueryOutcome::Rows(rows)
                } else {
                    QueryOutcome::Success
                }
            }
            Err(e) => {
                let msg = format!("{} {}", prefix, e);
                error!("{}", msg);
                self.last_error = Some(msg);
                QueryOutcome::Failed
            }
        }
    }

    fn run_query(
        &mut self,
        text: &str,
        params: &Params,
        want_rows: bool,
        prefix: &mut String,
    ) -> Result<Vec<Row>> {
        if matches!(self.state, ConnState::Disconnected) {
            let reconnect = self
                .config
                .as_ref()
                .map(|c| c.auto_reconnect())
                .unwrap_or(false);
            if !reconnect {
                return Err(SessionError::NotConnected);
            }
            debug!("session disconnected, attempting reconnect before query");
            self.try_connect().map_err(|e| SessionError::Query {
                stage: QueryStage::Connection,
                message: e.to_string(),
            })?;
        }

        let handle = match &mut self.state {
            ConnState::Connected(handle) => handle,
            ConnState::Disconnected => return Err(SessionError::NotConnected),
        };

        let mut stmt = handle.prepare(text).map_err(|e| SessionError::Query {
            stage: QueryStage::Prepare,
            message: e.to_string(),
        })?;

        if !params.is_empty() {
            let plan = params.bind_plan()?;
            for (i, (ty, value)) in plan.into_iter().enumerate() {
                let position = i + 1;
                stmt.bind_value(position, value, ty)
                    .map_err(|e| SessionError::Query {
                        stage: QueryStage::Bind,
                        message: e.to_string(),
                    })?;
                prefix.push_str(&format!(" {}=>{}", position, value));
            }
        }

        stmt.execute(want_rows).map_err(|e| SessionError::Query {
            stage: QueryStage::Execute,
            message: e.to_string(),
        })
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("config", &self.config)
            .field("status", &self.status())
            .field("last_error", &self.last_error)
            .finish()
    }
}

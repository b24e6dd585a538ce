//! SQLite backend over `rusqlite`.
//!
//! SQLite has no host or port; the configured database name is used as the
//! file path (`:memory:` included), which keeps the full session stack
//! exercisable without a server. The raw statement API keeps prepare, bind,
//! and execute as distinct failure stages.

use crate::core::db::driver::{DriverConnection, DriverError, DriverStatement};
use crate::core::db::params::{BindType, Row, Value};
use crate::core::db::session::SessionConfig;
use rusqlite::types::ValueRef;
use rusqlite::Connection;

pub struct SqliteDriver {
    conn: Connection,
}

impl SqliteDriver {
    pub fn open(config: &SessionConfig) -> Result<Self, DriverError> {
        let conn = Connection::open(config.database())?;
        Ok(SqliteDriver { conn })
    }
}

impl DriverConnection for SqliteDriver {
    fn prepare<'c>(&'c mut self, sql: &str) -> Result<Box<dyn DriverStatement + 'c>, DriverError> {
        let stmt = self.conn.prepare(sql)?;
        Ok(Box::new(SqliteStatement { stmt }))
    }

    fn ping(&mut self) -> Result<(), DriverError> {
        self.conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
        Ok(())
    }
}

pub struct SqliteStatement<'c> {
    stmt: rusqlite::Statement<'c>,
}

impl DriverStatement for SqliteStatement<'_> {
    fn bind_value(&mut self, position: usize, value: &Value, ty: BindType) -> Result<(), DriverError> {
        match (ty, value) {
            (_, Value::Null) => self
                .stmt
                .raw_bind_parameter(position, rusqlite::types::Null)?,
            (BindType::Integer, v) => {
                let n = v.as_integer().map_err(DriverError::Bind)?;
                self.stmt.raw_bind_parameter(position, n)?;
            }
            (BindType::Text, Value::Blob(b)) => {
                self.stmt.raw_bind_parameter(position, b.as_slice())?;
            }
            (BindType::Text, v) => self.stmt.raw_bind_parameter(position, v.as_text())?,
        }
        Ok(())
    }

    fn execute(&mut self, want_rows: bool) -> Result<Vec<Row>, DriverError> {
        let columns: Vec<String> = self
            .stmt
            .column_names()
            .into_iter()
            .map(String::from)
            .collect();

        let mut rows = self.stmt.raw_query();
        let mut fetched = Vec::new();
        while let Some(row) = rows.next()? {
            if !want_rows {
                // The first step has already run the statement.
                break;
            }
            let mut values = Vec::with_capacity(columns.len());
            for i in 0..columns.len() {
                values.push(from_value_ref(row.get_ref(i)?));
            }
            fetched.push(Row::new(columns.clone(), values));
        }
        Ok(fetched)
    }
}

fn from_value_ref(value: ValueRef) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(n) => Value::Integer(n),
        ValueRef::Real(r) => Value::Real(r),
        ValueRef::Text(t) => Value::Text(String::from_utf8_lossy(t).to_string()),
        ValueRef::Blob(b) => Value::Blob(b.to_vec()),
    }
}

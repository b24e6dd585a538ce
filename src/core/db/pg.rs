//! PostgreSQL backend over the blocking `postgres` client.
//!
//! Binding collects coerced parameters locally and ships them on execute;
//! position and coercion violations are still reported at the bind stage,
//! while wire-level type rejections surface at execute. Integer parameters
//! are sized to the placeholder's declared type so `int2`/`int4`/`int8`
//! columns all accept the `i` code; out-of-range values fail at the bind
//! stage instead of wrapping.

use crate::core::db::driver::{DriverConnection, DriverError, DriverStatement};
use crate::core::db::params::{BindType, Row, Value};
use crate::core::db::session::SessionConfig;
use postgres::types::{ToSql, Type};
use postgres::{Client, NoTls, Statement};

static SQL_NULL: Option<String> = None;

pub struct PostgresDriver {
    client: Client,
}

impl PostgresDriver {
    pub fn open(config: &SessionConfig) -> Result<Self, DriverError> {
        let client = Client::connect(&config.dsn(), NoTls)?;
        Ok(PostgresDriver { client })
    }
}

impl DriverConnection for PostgresDriver {
    fn prepare<'c>(&'c mut self, sql: &str) -> Result<Box<dyn DriverStatement + 'c>, DriverError> {
        let stmt = self.client.prepare(sql)?;
        Ok(Box::new(PostgresStatement {
            client: &mut self.client,
            stmt,
            bound: Vec::new(),
        }))
    }

    fn ping(&mut self) -> Result<(), DriverError> {
        self.client.simple_query("SELECT 1")?;
        Ok(())
    }
}

/// One coerced parameter, sized for its placeholder.
#[derive(Debug)]
enum Bound {
    Null,
    SmallInt(i16),
    Int(i32),
    BigInt(i64),
    Text(String),
    Bytes(Vec<u8>),
}

impl Bound {
    fn as_sql(&self) -> &(dyn ToSql + Sync) {
        match self {
            Bound::Null => &SQL_NULL,
            Bound::SmallInt(n) => n,
            Bound::Int(n) => n,
            Bound::BigInt(n) => n,
            Bound::Text(s) => s,
            Bound::Bytes(b) => b,
        }
    }
}

pub struct PostgresStatement<'c> {
    client: &'c mut Client,
    stmt: Statement,
    bound: Vec<(usize, Bound)>,
}

impl DriverStatement for PostgresStatement<'_> {
    fn bind_value(&mut self, position: usize, value: &Value, ty: BindType) -> Result<(), DriverError> {
        let declared = self.stmt.params();
        if position == 0 || position > declared.len() {
            return Err(DriverError::Bind(format!(
                "parameter index {} out of range (statement takes {})",
                position,
                declared.len()
            )));
        }

        let bound = match (ty, value) {
            (_, Value::Null) => Bound::Null,
            (BindType::Integer, v) => {
                let n = v.as_integer().map_err(DriverError::Bind)?;
                size_integer(n, &declared[position - 1])?
            }
            (BindType::Text, Value::Blob(b)) => Bound::Bytes(b.clone()),
            (BindType::Text, v) => Bound::Text(v.as_text()),
        };

        self.bound.push((position, bound));
        Ok(())
    }

    fn execute(&mut self, want_rows: bool) -> Result<Vec<Row>, DriverError> {
        let mut ordered: Vec<&(usize, Bound)> = self.bound.iter().collect();
        ordered.sort_by_key(|(position, _)| *position);
        let params: Vec<&(dyn ToSql + Sync)> =
            ordered.iter().map(|(_, bound)| bound.as_sql()).collect();

        if want_rows {
            let rows = self.client.query(&self.stmt, &params)?;
            rows.iter().map(from_pg_row).collect()
        } else {
            self.client.execute(&self.stmt, &params)?;
            Ok(Vec::new())
        }
    }
}

/// Sizes an integer parameter to its placeholder's declared type.
///
/// A value outside the declared type's range is a bind failure, never a
/// silent wrap.
fn size_integer(n: i64, declared: &Type) -> Result<Bound, DriverError> {
    if *declared == Type::INT2 {
        i16::try_from(n).map(Bound::SmallInt).map_err(|_| {
            DriverError::Bind(format!("value {} out of range for int2 parameter", n))
        })
    } else if *declared == Type::INT4 {
        i32::try_from(n).map(Bound::Int).map_err(|_| {
            DriverError::Bind(format!("value {} out of range for int4 parameter", n))
        })
    } else {
        Ok(Bound::BigInt(n))
    }
}

fn from_pg_row(row: &postgres::Row) -> Result<Row, DriverError> {
    let mut columns = Vec::with_capacity(row.len());
    let mut values = Vec::with_capacity(row.len());
    for (i, column) in row.columns().iter().enumerate() {
        columns.push(column.name().to_string());
        values.push(from_pg_value(row, i, column.type_())?);
    }
    Ok(Row::new(columns, values))
}

fn from_pg_value(row: &postgres::Row, idx: usize, ty: &Type) -> Result<Value, DriverError> {
    let value = if *ty == Type::INT2 {
        row.try_get::<_, Option<i16>>(idx)?.map(|n| Value::Integer(n as i64))
    } else if *ty == Type::INT4 {
        row.try_get::<_, Option<i32>>(idx)?.map(|n| Value::Integer(n as i64))
    } else if *ty == Type::INT8 {
        row.try_get::<_, Option<i64>>(idx)?.map(Value::Integer)
    } else if *ty == Type::FLOAT4 {
        row.try_get::<_, Option<f32>>(idx)?.map(|r| Value::Real(r as f64))
    } else if *ty == Type::FLOAT8 {
        row.try_get::<_, Option<f64>>(idx)?.map(Value::Real)
    } else if *ty == Type::BOOL {
        row.try_get::<_, Option<bool>>(idx)?.map(|b| Value::Integer(b as i64))
    } else if *ty == Type::BYTEA {
        row.try_get::<_, Option<Vec<u8>>>(idx)?.map(Value::Blob)
    } else {
        // TEXT, VARCHAR, BPCHAR, NAME and anything else textual
        row.try_get::<_, Option<String>>(idx)?.map(Value::Text)
    };
    Ok(value.unwrap_or(Value::Null))
}

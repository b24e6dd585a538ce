//! Parameter descriptor and the type-code binding protocol.
//!
//! A query carries its parameters as a compact descriptor: a type-code
//! string with one character per value (`i` = integer, `s` = string) and an
//! ordered value list. The type-code string itself is never bound. The code
//! count must cover the value count; this is validated before any binding
//! starts.

use crate::core::error::{Result, SessionError};
use std::fmt;

/// How a single parameter is bound at its positional placeholder.
///
/// Resolved from one character of the type-code string. Unrecognized codes
/// fall back to `Text`; the string type is the safe default and the
/// fallback is intentional, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindType {
    /// Bind as a signed 64-bit integer (`i`)
    Integer,
    /// Bind as a string (`s`, and every unrecognized code)
    Text,
}

impl BindType {
    /// Resolves a bind type from a single type-code character.
    pub fn from_code(code: char) -> Self {
        match code {
            'i' => BindType::Integer,
            's' => BindType::Text,
            _ => BindType::Text,
        }
    }
}

/// A scalar database value, both as bind input and as fetched output.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl Value {
    /// Coerces the value for integer-mode binding.
    ///
    /// Text is parsed and reals must be integral; nothing is silently
    /// cast, so a non-numeric text or a fractional real under the `i`
    /// code is a bind failure.
    pub fn as_integer(&self) -> std::result::Result<i64, String> {
        match self {
            Value::Integer(n) => Ok(*n),
            Value::Real(f) if f.is_finite() && f.fract() == 0.0 => Ok(*f as i64),
            Value::Real(f) => Err(format!("cannot bind {} as integer", f)),
            Value::Text(s) => s
                .trim()
                .parse::<i64>()
                .map_err(|_| format!("cannot bind {:?} as integer", s)),
            Value::Null => Err("cannot coerce NULL to integer".to_string()),
            Value::Blob(_) => Err("cannot coerce BLOB to integer".to_string()),
        }
    }

    /// Renders the value for string-mode binding.
    pub fn as_text(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Integer(n) => write!(f, "{}", n),
            Value::Real(r) => write!(f, "{}", r),
            Value::Text(s) => write!(f, "{}", s),
            Value::Blob(b) => write!(f, "<BLOB: {} bytes>", b.len()),
        }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Integer(n as i64)
    }
}

impl From<f64> for Value {
    fn from(r: f64) -> Self {
        Value::Real(r)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        Value::Blob(b)
    }
}

/// A parameter descriptor: the type-code string plus the ordered values.
///
/// An empty type-code string means the query is executed without binding,
/// regardless of the value list.
#[derive(Debug, Clone, Default)]
pub struct Params {
    codes: String,
    values: Vec<Value>,
}

impl Params {
    /// Creates a descriptor from a type-code string and its values.
    pub fn new(codes: impl Into<String>, values: Vec<Value>) -> Self {
        Params {
            codes: codes.into(),
            values,
        }
    }

    /// A descriptor that performs no binding.
    pub fn none() -> Self {
        Params::default()
    }

    pub fn codes(&self) -> &str {
        &self.codes
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// True when binding is skipped entirely (empty type-code string).
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Resolves the bind plan: one `(BindType, value)` pair per value, in
    /// positional order.
    ///
    /// Fails without touching the statement when the type-code string is
    /// shorter than the value list.
    pub fn bind_plan(&self) -> Result<Vec<(BindType, &Value)>> {
        let codes: Vec<char> = self.codes.chars().collect();
        if codes.len() < self.values.len() {
            return Err(SessionError::Params(
                "Not enough data types for values".to_string(),
            ));
        }
        Ok(self
            .values
            .iter()
            .enumerate()
            .map(|(i, value)| (BindType::from_code(codes[i]), value))
            .collect())
    }
}

/// One fetched row: ordered column-name to value associations.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    columns: Vec<String>,
    values: Vec<Value>,
}

impl Row {
    pub fn new(columns: Vec<String>, values: Vec<Value>) -> Self {
        Row { columns, values }
    }

    /// Looks a value up by column name (first match wins).
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.columns
            .iter()
            .position(|c| c == name)
            .and_then(|i| self.values.get(i))
    }

    /// Looks a value up by column position.
    pub fn get_index(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates the row in column order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.values.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_type_from_code() {
        assert_eq!(BindType::from_code('i'), BindType::Integer);
        assert_eq!(BindType::from_code('s'), BindType::Text);
        // Unknown codes default to string
        assert_eq!(BindType::from_code('x'), BindType::Text);
        assert_eq!(BindType::from_code('?'), BindType::Text);
    }

    #[test]
    fn test_bind_plan_aligns_codes_with_values() {
        let params = Params::new("is", vec![42.into(), "hello".into()]);
        let plan = params.bind_plan().unwrap();
        assert_eq!(plan.len(), 2);
        assert_eq!(plan[0], (BindType::Integer, &Value::Integer(42)));
        assert_eq!(plan[1], (BindType::Text, &Value::Text("hello".to_string())));
    }

    #[test]
    fn test_bind_plan_rejects_short_code_string() {
        let params = Params::new("i", vec![42.into(), "hello".into()]);
        let err = params.bind_plan().unwrap_err();
        assert!(err.to_string().contains("Not enough data types"));
    }

    #[test]
    fn test_bind_plan_allows_extra_codes() {
        let params = Params::new("iss", vec![42.into()]);
        let plan = params.bind_plan().unwrap();
        assert_eq!(plan.len(), 1);
    }

    #[test]
    fn test_empty_descriptor_skips_binding() {
        assert!(Params::none().is_empty());
        assert!(Params::new("", vec!["orphan".into()]).is_empty());
    }

    #[test]
    fn test_integer_coercion() {
        assert_eq!(Value::Integer(7).as_integer().unwrap(), 7);
        assert_eq!(Value::Text("42".to_string()).as_integer().unwrap(), 42);
        assert_eq!(Value::Text(" 42 ".to_string()).as_integer().unwrap(), 42);
        assert!(Value::Text("forty-two".to_string()).as_integer().is_err());
        assert!(Value::Null.as_integer().is_err());
    }

    #[test]
    fn test_integer_coercion_rejects_fractional_reals() {
        assert_eq!(Value::Real(3.0).as_integer().unwrap(), 3);
        assert_eq!(Value::Real(-2.0).as_integer().unwrap(), -2);
        assert!(Value::Real(3.5).as_integer().is_err());
        assert!(Value::Real(f64::NAN).as_integer().is_err());
        assert!(Value::Real(f64::INFINITY).as_integer().is_err());
    }

    #[test]
    fn test_row_lookup() {
        let row = Row::new(
            vec!["id".to_string(), "name".to_string()],
            vec![Value::Integer(1), Value::Text("Alice".to_string())],
        );
        assert_eq!(row.get("id"), Some(&Value::Integer(1)));
        assert_eq!(row.get("name"), Some(&Value::Text("Alice".to_string())));
        assert_eq!(row.get("missing"), None);
        assert_eq!(row.get_index(0), Some(&Value::Integer(1)));
        assert_eq!(row.len(), 2);

        let pairs: Vec<(&str, &Value)> = row.iter().collect();
        assert_eq!(pairs[0].0, "id");
        assert_eq!(pairs[1].0, "name");
    }
}

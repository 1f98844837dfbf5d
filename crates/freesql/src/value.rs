//! Bound parameter values.
//!
//! Builders never inline values into SQL text. Every placeholder that
//! survives a build is paired with one [`StatementParameter`] in the returned
//! [`StatementParameters`], in placeholder order.
//!
//! [`Value`] implements `tokio_postgres::types::ToSql`, so a built statement can
//! be handed to any executor that speaks `tokio-postgres`:
//!
//! ```ignore
//! let built = builder.build()?;
//! client.query(&built.sql, &built.parameters.params_ref()).await?;
//! ```

use bytes::BytesMut;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::error::Error;
use std::fmt;
use std::num::TryFromIntError;
use tokio_postgres::types::{IsNull, ToSql, Type, to_sql_checked};

/// A dynamically typed parameter value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
    Timestamp(DateTime<Utc>),
}

impl Value {
    /// Check if this is the SQL NULL value.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Integer view used by shard strategies.
    ///
    /// Integers convert directly; text converts when it holds an integral
    /// number (surrounding whitespace ignored). Everything else is `None`.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            Value::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Text(v) => write!(f, "'{v}'"),
            Value::Bytes(v) => write!(f, "<{} bytes>", v.len()),
            Value::Timestamp(v) => write!(f, "{}", v.to_rfc3339()),
        }
    }
}

macro_rules! impl_from_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::Int(i64::from(v))
                }
            }
        )*
    };
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32);

macro_rules! impl_try_from_unsigned {
    ($($ty:ty),*) => {
        $(
            /// Fails when the value does not fit an `i64`.
            impl TryFrom<$ty> for Value {
                type Error = TryFromIntError;

                fn try_from(v: $ty) -> Result<Self, Self::Error> {
                    i64::try_from(v).map(Value::Int)
                }
            }
        )*
    };
}

impl_try_from_unsigned!(u64, usize);

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(f64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::Timestamp(v)
    }
}

impl ToSql for Value {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
        // Each variant defers to the checked impl of its native type, so a
        // mismatch fails with `WrongType` instead of sending foreign bytes.
        match self {
            Value::Null => Ok(IsNull::Yes),
            Value::Bool(v) => v.to_sql_checked(ty, out),
            Value::Int(v) => match *ty {
                Type::INT2 => i16::try_from(*v)?.to_sql_checked(ty, out),
                Type::INT4 => i32::try_from(*v)?.to_sql_checked(ty, out),
                _ => v.to_sql_checked(ty, out),
            },
            Value::Float(v) => match *ty {
                Type::FLOAT4 => (*v as f32).to_sql_checked(ty, out),
                _ => v.to_sql_checked(ty, out),
            },
            Value::Text(v) => v.as_str().to_sql_checked(ty, out),
            Value::Bytes(v) => v.as_slice().to_sql_checked(ty, out),
            Value::Timestamp(v) => match *ty {
                Type::TIMESTAMP => v.naive_utc().to_sql_checked(ty, out),
                _ => v.to_sql_checked(ty, out),
            },
        }
    }

    // The accepted types depend on the variant and are checked in `to_sql`.
    fn accepts(_ty: &Type) -> bool {
        true
    }

    to_sql_checked!();
}

/// One bound parameter: its 1-based placeholder index, an optional name and
/// the value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatementParameter {
    pub index: usize,
    pub name: Option<String>,
    pub value: Value,
}

/// Ordered list of bound parameters.
///
/// Indices are assigned on push and always equal the position in the list
/// plus one.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct StatementParameters {
    params: Vec<StatementParameter>,
}

impl StatementParameters {
    /// Create a new empty parameter list.
    pub fn new() -> Self {
        Self { params: Vec::new() }
    }

    /// Add an unnamed parameter and return its 1-based index.
    pub fn push(&mut self, value: impl Into<Value>) -> usize {
        self.push_entry(None, value.into())
    }

    /// Add a named parameter and return its 1-based index.
    ///
    /// The name is used by hint-derived table sharding to find the value of a
    /// shard column.
    pub fn push_named(&mut self, name: impl Into<String>, value: impl Into<Value>) -> usize {
        self.push_entry(Some(name.into()), value.into())
    }

    pub(crate) fn push_entry(&mut self, name: Option<String>, value: Value) -> usize {
        let index = self.params.len() + 1;
        self.params.push(StatementParameter { index, name, value });
        index
    }

    /// Get the current parameter count.
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Check if the list is empty.
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Get a parameter by its 1-based index.
    pub fn get(&self, index: usize) -> Option<&StatementParameter> {
        index.checked_sub(1).and_then(|i| self.params.get(i))
    }

    /// Find the first parameter with the given name (case-insensitive).
    pub fn find(&self, name: &str) -> Option<&StatementParameter> {
        self.params.iter().find(|p| {
            p.name
                .as_deref()
                .is_some_and(|n| n.eq_ignore_ascii_case(name))
        })
    }

    /// Iterate the parameters in placeholder order.
    pub fn iter(&self) -> std::slice::Iter<'_, StatementParameter> {
        self.params.iter()
    }

    /// Iterate the values in placeholder order.
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.params.iter().map(|p| &p.value)
    }

    /// Parameter refs compatible with `tokio-postgres`.
    pub fn params_ref(&self) -> Vec<&(dyn ToSql + Sync)> {
        self.params
            .iter()
            .map(|p| &p.value as &(dyn ToSql + Sync))
            .collect()
    }
}

impl<'a> IntoIterator for &'a StatementParameters {
    type Item = &'a StatementParameter;
    type IntoIter = std::slice::Iter<'a, StatementParameter>;

    fn into_iter(self) -> Self::IntoIter {
        self.params.iter()
    }
}

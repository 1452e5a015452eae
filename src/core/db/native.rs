/// Native Client Seam
///
/// The adapter never talks to PostgreSQL itself. It drives a native client
/// library through the three traits below, which expose exactly the
/// primitives the adapter relies on: connect, cursor creation, statement
/// execution, commit, rollback and close. `PgDriver` in `pg.rs` is
/// the production implementation; `test_utils::ScriptedDriver` is the
/// in-memory one used by the tests.
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Error kinds the native client can raise
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeErrorKind {
    /// Constraint violation
    Integrity,
    /// Any other database failure
    Database,
}

impl fmt::Display for NativeErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NativeErrorKind::Integrity => write!(f, "IntegrityError"),
            NativeErrorKind::Database => write!(f, "DatabaseError"),
        }
    }
}

/// Error raised by the native client, carrying its positional arguments
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{kind}: {}", .args.join(", "))]
pub struct NativeError {
    pub kind: NativeErrorKind,
    pub args: Vec<String>,
}

impl NativeError {
    pub fn new<I, S>(kind: NativeErrorKind, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        NativeError {
            kind,
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    pub fn integrity<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        NativeError::new(NativeErrorKind::Integrity, args)
    }

    pub fn database<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        NativeError::new(NativeErrorKind::Database, args)
    }
}

/// Type-category tag the native client attaches to each result column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeCategory {
    Timestamp,
    Date,
    Time,
    Bool,
    Number,
    String,
    Binary,
    Other,
}

impl TypeCategory {
    /// Whether values in this category are coerced into structured date/time values
    pub fn is_temporal(self) -> bool {
        matches!(
            self,
            TypeCategory::Timestamp | TypeCategory::Date | TypeCategory::Time
        )
    }
}

/// One entry of a cursor's result description
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDescription {
    pub name: String,
    pub type_name: String,
    pub category: TypeCategory,
}

impl ColumnDescription {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>, category: TypeCategory) -> Self {
        ColumnDescription {
            name: name.into(),
            type_name: type_name.into(),
            category,
        }
    }
}

/// A single column value, either as produced by the native client or after coercion
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
    Timestamp(NaiveDateTime),
    TimestampTz(DateTime<FixedOffset>),
    Date(NaiveDate),
    Time(NaiveTime),
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
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

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

/// Ordered column values of one fetched row
pub type Row = Vec<Value>;

/// Discrete connect parameters; `host` may already carry a `:port` suffix
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectParams {
    pub database: String,
    pub user: Option<String>,
    pub password: Option<String>,
    pub host: Option<String>,
}

/// Cursor primitives of the native client
pub trait NativeCursor {
    fn execute(&mut self, query: &str, args: &[Value]) -> Result<(), NativeError>;

    fn executemany(&mut self, query: &str, seq_of_args: &[Vec<Value>]) -> Result<(), NativeError>;

    /// Column metadata of the last result set, `None` for statements without one
    fn description(&self) -> Option<&[ColumnDescription]>;

    /// Rows produced or affected by the last statement, -1 when unknown
    fn rowcount(&self) -> i64;

    /// Next raw row of the current result set
    fn fetch_raw(&mut self) -> Option<Row>;

    fn close(&mut self) {}
}

/// Connection primitives of the native client
pub trait NativeConnection: Send {
    type Cursor: NativeCursor;

    fn cursor(&self) -> Self::Cursor;

    fn commit(&mut self) -> Result<(), NativeError>;

    fn rollback(&mut self) -> Result<(), NativeError>;

    fn close(&mut self) -> Result<(), NativeError>;
}

/// Entry point of the native client
pub trait NativeDriver {
    type Connection: NativeConnection;

    fn connect(&self, dsn: Option<&str>, params: &ConnectParams) -> Result<Self::Connection, NativeError>;
}

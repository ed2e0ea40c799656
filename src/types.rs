use std::fmt;

use chrono::NaiveDateTime;
use sqlx::any::{Any, AnyArguments};
use sqlx::query::Query;

// Native types, re-exported as aliases so callers never import sqlx directly for them.

/// Summary of an `exec`: rows affected and, where the driver reports one, the last insert id.
pub type QueryResult = sqlx::any::AnyQueryResult;
/// One materialised native row.
pub type AnyRow = sqlx::any::AnyRow;
/// Connection-establishment options; the lowest-level driver object the pool is built from.
pub type Connector = sqlx::any::AnyConnectOptions;
/// The pooled native handle owned by [`SqlDb`](crate::SqlDb).
pub type NativePool = sqlx::AnyPool;
/// The reserved native connection owned by [`SqlConn`](crate::SqlConn).
pub type NativeConn = sqlx::pool::PoolConnection<Any>;
/// The native transaction owned by [`SqlTx`](crate::SqlTx).
pub type NativeTx<'c> = sqlx::Transaction<'c, Any>;
/// The native prepared statement owned by [`SqlStmt`](crate::SqlStmt).
pub type NativeStmt = sqlx::any::AnyStatement<'static>;

pub type RawBytes = Vec<u8>;
pub type NullBool = Option<bool>;
pub type NullInt32 = Option<i32>;
pub type NullInt64 = Option<i64>;
pub type NullFloat64 = Option<f64>;
pub type NullString = Option<String>;
/// A nullable timestamp argument.
///
/// `Any` has no date/time column kind, so timestamps travel as text in
/// [`TIMESTAMP_FORMAT`]. Read them back as [`NullString`] and parse with the same format.
pub type NullTime = Option<NaiveDateTime>;

/// `chrono` format used to bind [`Value::Timestamp`]; SQLite's own `datetime()` layout.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// Argument values accepted by `exec`, `query` and `query_row`.
///
/// ```rust
/// use sql_facade::Value;
///
/// let params = vec![Value::Int(1), Value::from("alice"), Value::from(None::<i64>)];
/// assert!(params[2].is_null());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// NULL value.
    ///
    /// Binds as a text-typed NULL: `Any` carries no column type for NULL. SQLite and MySQL
    /// accept it anywhere; Postgres rejects it for non-text columns unless the placeholder
    /// carries a cast (`$1::int8`).
    Null,
    Bool(bool),
    /// Integer value (64-bit)
    Int(i64),
    /// Floating point value (64-bit)
    Float(f64),
    Text(String),
    /// Binary data
    Blob(Vec<u8>),
    /// Bound as text in [`TIMESTAMP_FORMAT`].
    Timestamp(NaiveDateTime),
}

impl Value {
    /// Check if this value is NULL
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        if let Value::Int(value) = self {
            Some(*value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        if let Value::Text(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        if let Value::Bool(value) = self {
            Some(*value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        if let Value::Float(value) = self {
            Some(*value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_blob(&self) -> Option<&[u8]> {
        if let Value::Blob(bytes) = self {
            Some(bytes)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_timestamp(&self) -> Option<&NaiveDateTime> {
        if let Value::Timestamp(value) = self {
            Some(value)
        } else {
            None
        }
    }
}

macro_rules! impl_value_from {
    ($($ty:ty => |$v:ident| $conv:expr),+ $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from($v: $ty) -> Self {
                    $conv
                }
            }
        )+
    };
}

impl_value_from! {
    bool => |v| Value::Bool(v),
    i32 => |v| Value::Int(i64::from(v)),
    i64 => |v| Value::Int(v),
    u32 => |v| Value::Int(i64::from(v)),
    f32 => |v| Value::Float(f64::from(v)),
    f64 => |v| Value::Float(v),
    String => |v| Value::Text(v),
    &str => |v| Value::Text(v.to_owned()),
    Vec<u8> => |v| Value::Blob(v),
    &[u8] => |v| Value::Blob(v.to_vec()),
    NaiveDateTime => |v| Value::Timestamp(v),
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

/// A value tagged with a parameter name; build one with [`named`].
#[derive(Debug, Clone, PartialEq)]
pub struct NamedArg {
    pub name: String,
    pub value: Value,
}

/// Build a [`NamedArg`]. Nothing beyond pairing the name with the value happens here.
///
/// ```rust
/// use sql_facade::{Value, named};
///
/// let arg = named("x", 5);
/// assert_eq!(arg.name, "x");
/// assert_eq!(arg.value, Value::Int(5));
/// ```
pub fn named(name: impl Into<String>, value: impl Into<Value>) -> NamedArg {
    NamedArg {
        name: name.into(),
        value: value.into(),
    }
}

/// One argument passed to a query.
///
/// Arguments bind in list order. sqlx binds ordinally, so a named argument occupies the slot
/// given by its position in the list and its name is not sent to the driver. Write the
/// placeholders the driver expects (`?`, `?1`, `$1`).
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    Positional(Value),
    Named(NamedArg),
}

impl Arg {
    #[must_use]
    pub fn value(&self) -> &Value {
        match self {
            Arg::Positional(value) => value,
            Arg::Named(named) => &named.value,
        }
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Arg::Positional(_) => None,
            Arg::Named(named) => Some(&named.name),
        }
    }
}

impl<T: Into<Value>> From<T> for Arg {
    fn from(value: T) -> Self {
        Arg::Positional(value.into())
    }
}

impl From<NamedArg> for Arg {
    fn from(named: NamedArg) -> Self {
        Arg::Named(named)
    }
}

/// Build a `Vec<Arg>` from anything convertible into a [`Value`] or a [`NamedArg`].
///
/// ```rust
/// use sql_facade::{args, named, Arg};
///
/// let list: Vec<Arg> = args![1, "two", named("three", 3.0)];
/// assert_eq!(list.len(), 3);
/// assert_eq!(list[2].name(), Some("three"));
/// ```
#[macro_export]
macro_rules! args {
    () => {
        ::std::vec::Vec::<$crate::Arg>::new()
    };
    ($($arg:expr),+ $(,)?) => {
        ::std::vec![$($crate::Arg::from($arg)),+]
    };
}

/// Attach `args` to a native query, in order.
pub(crate) fn bind_args<'q>(
    mut query: Query<'q, Any, AnyArguments<'q>>,
    args: &[Arg],
) -> Query<'q, Any, AnyArguments<'q>> {
    for arg in args {
        query = match arg.value() {
            Value::Null => query.bind(None::<String>),
            Value::Bool(v) => query.bind(*v),
            Value::Int(v) => query.bind(*v),
            Value::Float(v) => query.bind(*v),
            Value::Text(v) => query.bind(v.clone()),
            Value::Blob(v) => query.bind(v.clone()),
            Value::Timestamp(v) => query.bind(v.format(TIMESTAMP_FORMAT).to_string()),
        };
    }
    query
}

/// Transaction isolation level, as understood by the target database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum IsolationLevel {
    /// Whatever the database uses when no level is requested.
    #[default]
    Default,
    ReadUncommitted,
    ReadCommitted,
    WriteCommitted,
    RepeatableRead,
    Snapshot,
    Serializable,
    Linearizable,
}

impl fmt::Display for IsolationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            IsolationLevel::Default => "Default",
            IsolationLevel::ReadUncommitted => "Read Uncommitted",
            IsolationLevel::ReadCommitted => "Read Committed",
            IsolationLevel::WriteCommitted => "Write Committed",
            IsolationLevel::RepeatableRead => "Repeatable Read",
            IsolationLevel::Snapshot => "Snapshot",
            IsolationLevel::Serializable => "Serializable",
            IsolationLevel::Linearizable => "Linearizable",
        };
        f.write_str(name)
    }
}

/// Options for `begin_tx`. `None` and `TxOptions::default()` both mean a plain `BEGIN`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TxOptions {
    pub isolation: IsolationLevel,
    pub read_only: bool,
}

impl TxOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_isolation(mut self, isolation: IsolationLevel) -> Self {
        self.isolation = isolation;
        self
    }

    #[must_use]
    pub fn with_read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    #[must_use]
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

/// Snapshot of pool statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DbStats {
    /// Configured upper bound on open connections.
    pub max_open_connections: u32,
    /// Connections currently open, idle or in use.
    pub open_connections: u32,
    pub in_use: u32,
    pub idle: u32,
}

//! Literal tree values for row normalization and rendering.
//!
//! Rows fetched from the source are held as [`RawRow`]s, normalized into
//! [`NormalizedRow`]s and finally rendered by [`crate::core::literal`].

use std::fmt;

use indexmap::IndexMap;

/// Key of a literal mapping.
///
/// Column names are `Str` keys. `Int` keys appear as positional duplicates
/// when rows are fetched in [`FetchMode::Both`](crate::config::FetchMode)
/// and as sparse sequence indices in literal maps.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LiteralKey {
    Int(i64),
    Str(String),
}

impl LiteralKey {
    /// The column name, if this is a string key.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            LiteralKey::Str(s) => Some(s),
            LiteralKey::Int(_) => None,
        }
    }
}

impl From<&str> for LiteralKey {
    fn from(v: &str) -> Self {
        LiteralKey::Str(v.to_string())
    }
}

impl From<String> for LiteralKey {
    fn from(v: String) -> Self {
        LiteralKey::Str(v)
    }
}

impl From<i64> for LiteralKey {
    fn from(v: i64) -> Self {
        LiteralKey::Int(v)
    }
}

impl fmt::Display for LiteralKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LiteralKey::Int(v) => write!(f, "{}", v),
            LiteralKey::Str(v) => f.write_str(v),
        }
    }
}

/// A value in the literal tree.
///
/// Scalars come straight from database columns; `List` and `Map` build the
/// nested structure that is rendered as one array literal per table.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    /// NULL.
    Null,

    /// Boolean value.
    Bool(bool),

    /// Any integer column that fits in 64 bits.
    Int(i64),

    /// Floating point column.
    Float(f64),

    /// Text, and everything the driver reads as text (dates, decimals, json).
    Text(String),

    /// Binary data that is not valid UTF-8.
    ///
    /// Carried through normalization but rejected by the literal renderer.
    Bytes(Vec<u8>),

    /// Ordered sequence with implicit `0..n` indices.
    List(Vec<SqlValue>),

    /// Ordered key/value mapping.
    Map(IndexMap<LiteralKey, SqlValue>),
}

impl SqlValue {
    /// The text content, if this is a text value.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            SqlValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Short name of the variant, used in error messages.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            SqlValue::Null => "null",
            SqlValue::Bool(_) => "bool",
            SqlValue::Int(_) => "int",
            SqlValue::Float(_) => "float",
            SqlValue::Text(_) => "text",
            SqlValue::Bytes(_) => "bytes",
            SqlValue::List(_) => "list",
            SqlValue::Map(_) => "map",
        }
    }
}

impl From<bool> for SqlValue {
    fn from(v: bool) -> Self {
        SqlValue::Bool(v)
    }
}

impl From<i32> for SqlValue {
    fn from(v: i32) -> Self {
        SqlValue::Int(i64::from(v))
    }
}

impl From<i64> for SqlValue {
    fn from(v: i64) -> Self {
        SqlValue::Int(v)
    }
}

impl From<f64> for SqlValue {
    fn from(v: f64) -> Self {
        SqlValue::Float(v)
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        SqlValue::Text(v)
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        SqlValue::Text(v.to_string())
    }
}

impl From<Vec<u8>> for SqlValue {
    fn from(v: Vec<u8>) -> Self {
        SqlValue::Bytes(v)
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(SqlValue::Null, Into::into)
    }
}

/// One fetched record, keyed as the driver returned it.
pub type RawRow = IndexMap<LiteralKey, SqlValue>;

/// One record after classification-driven transforms.
pub type NormalizedRow = IndexMap<String, SqlValue>;

/// Build the literal tree for a table's normalized rows.
pub fn rows_to_value(rows: Vec<NormalizedRow>) -> SqlValue {
    SqlValue::List(
        rows.into_iter()
            .map(|row| {
                SqlValue::Map(
                    row.into_iter()
                        .map(|(k, v)| (LiteralKey::Str(k), v))
                        .collect(),
                )
            })
            .collect(),
    )
}

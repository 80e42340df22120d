//! Table and column metadata read from the catalog.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Table metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Table {
    /// Database (schema) name.
    pub schema: String,

    /// Logical table name, without prefix/suffix.
    pub name: String,

    /// Column definitions in declared order.
    pub columns: Vec<Column>,
}

impl Table {
    /// Get the fully qualified table name.
    pub fn full_name(&self) -> String {
        format!("{}.{}", self.schema, self.name)
    }

    /// Column names in declared order.
    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    /// Column name to full column type, in declared order.
    pub fn column_types(&self) -> IndexMap<String, String> {
        self.columns
            .iter()
            .map(|c| (c.name.clone(), c.column_type.clone()))
            .collect()
    }
}

/// Column metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Column {
    /// Column name.
    pub name: String,

    /// Bare data type (e.g. `int`, `varchar`).
    pub data_type: String,

    /// Full column type (e.g. `int(10) unsigned`, `varchar(255)`).
    pub column_type: String,

    /// Whether the column is nullable.
    pub is_nullable: bool,

    /// Ordinal position (1-based).
    pub ordinal_pos: i32,
}

/// How a column's values are decoded from a result row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Signed,
    Unsigned,
    Float,
    Bool,
    /// Selected as `CHAR` so that zero dates and exact decimals survive.
    CastText,
    Text,
    Binary,
}

impl Column {
    /// Decoding strategy for this column.
    pub fn value_kind(&self) -> ValueKind {
        let data_type = self.data_type.to_lowercase();
        let unsigned = self.column_type.to_lowercase().contains("unsigned");

        match data_type.as_str() {
            "tinyint" | "smallint" | "mediumint" | "int" | "integer" | "bigint" | "year" => {
                if unsigned {
                    ValueKind::Unsigned
                } else {
                    ValueKind::Signed
                }
            }
            "float" | "double" | "real" => ValueKind::Float,
            "bit" | "bool" | "boolean" => ValueKind::Bool,
            "date" | "datetime" | "timestamp" | "time" | "decimal" | "numeric" => {
                ValueKind::CastText
            }
            "binary" | "varbinary" | "blob" | "tinyblob" | "mediumblob" | "longblob" => {
                ValueKind::Binary
            }
            _ => ValueKind::Text,
        }
    }
}

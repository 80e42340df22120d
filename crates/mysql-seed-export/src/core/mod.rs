//! Core abstractions for turning table rows into seeder literals.
//!
//! - [`schema`]: Table and column metadata
//! - [`value`]: The literal tree (`SqlValue`) and row types
//! - [`traits`]: Collaborator traits for catalog and row access
//! - [`normalize`]: Classification-driven row normalization
//! - [`literal`]: PHP array literal rendering
//!
//! Normalization and rendering are synchronous pure functions; everything
//! that touches a database sits behind [`traits`].

pub mod literal;
pub mod normalize;
pub mod schema;
pub mod traits;
pub mod value;

pub use literal::{to_literal, INDENT_UNIT};
pub use normalize::{
    coerce_bool, ensure_audit_columns, normalize_row, normalize_rows, ColumnClasses, Timestamp,
};
pub use schema::{Column, Table, ValueKind};
pub use traits::{RowSource, SchemaIntrospector};
pub use value::{rows_to_value, LiteralKey, NormalizedRow, RawRow, SqlValue};

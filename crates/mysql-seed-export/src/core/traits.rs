//! Collaborator traits for reading a source database.
//!
//! - [`SchemaIntrospector`]: lists tables and their columns
//! - [`RowSource`]: fetches a table's rows as [`RawRow`]s
//!
//! The export pipeline only depends on these traits, so it can be driven by
//! the MySQL reader or by an in-memory fixture in tests.

use async_trait::async_trait;
use indexmap::IndexMap;

use crate::error::Result;

use super::value::RawRow;

/// Catalog access for a source database.
#[async_trait]
pub trait SchemaIntrospector: Send + Sync {
    /// Names of all base tables, ordered by name.
    async fn table_names(&self) -> Result<Vec<String>>;

    /// Column names of `table` in declared order.
    ///
    /// Returns an empty list if the table has no columns and
    /// [`ExportError::Schema`](crate::error::ExportError::Schema) if it does
    /// not exist.
    async fn column_names(&self, table: &str) -> Result<Vec<String>>;

    /// Column name to full column type for `table`, in declared order.
    async fn column_types(&self, table: &str) -> Result<IndexMap<String, String>>;

    /// Column names for every table.
    async fn column_names_for_all_tables(&self) -> Result<IndexMap<String, Vec<String>>> {
        let mut result = IndexMap::new();
        for table in self.table_names().await? {
            let columns = self.column_names(&table).await?;
            result.insert(table, columns);
        }
        Ok(result)
    }
}

/// Row access for a source database.
#[async_trait]
pub trait RowSource: Send + Sync {
    /// Every row of `table` with every column.
    async fn fetch_rows(&self, table: &str) -> Result<Vec<RawRow>>;
}

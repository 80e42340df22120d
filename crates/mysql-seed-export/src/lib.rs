//! # mysql-seed-export
//!
//! Export MySQL/MariaDB tables as Laravel seeder classes.
//!
//! Each table's rows are normalized and rendered as a PHP array literal:
//!
//! - **Boolean columns** coerced to `true`/`false`
//! - **Timestamp columns** with NULL or zero values backfilled with the run's time
//! - **Date columns** with zero dates replaced by `null`
//! - **Table prefixes/suffixes** applied to every table name
//!
//! ## Example
//!
//! ```rust,no_run
//! use mysql_seed_export::{Config, Exporter};
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> mysql_seed_export::Result<()> {
//!     let config = Config::load("config.yaml")?;
//!     let exporter = Exporter::connect(config).await?;
//!     let result = exporter.run(CancellationToken::new()).await?;
//!     println!("Exported {} rows", result.rows_exported);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod core;
pub mod drivers;
pub mod error;
pub mod export;
pub mod seeder;

// Re-exports for convenient access
pub use config::{Config, ExportConfig, FetchMode, SourceConfig, Timezone};
pub use self::core::{
    normalize_rows, to_literal, ColumnClasses, LiteralKey, NormalizedRow, RawRow, RowSource,
    SchemaIntrospector, SqlValue, Timestamp,
};
pub use drivers::MysqlReader;
pub use error::{ExportError, Result};
pub use export::{ExportResult, Exporter, FailedTable, TableExport};
pub use seeder::SeederEmitter;

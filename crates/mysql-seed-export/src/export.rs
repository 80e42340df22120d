//! Export orchestration.
//!
//! For each table: read the valid column list, fetch the rows, normalize
//! them, render the literal and write the seeder file. One timestamp is
//! captured per run and shared by every table.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::{Config, ExportConfig};
use crate::core::{
    normalize_rows, rows_to_value, to_literal, ColumnClasses, RowSource, SchemaIntrospector,
    Timestamp, INDENT_UNIT,
};
use crate::drivers::MysqlReader;
use crate::error::{ExportError, Result};
use crate::seeder::{self, SeederEmitter};

/// A single table rendered as a seeder.
#[derive(Debug, Clone)]
pub struct TableExport {
    /// Logical table name.
    pub table: String,
    /// Seeder class name.
    pub class_name: String,
    /// Number of rows in the literal.
    pub rows: usize,
    /// The array literal alone.
    pub literal: String,
    /// Complete seeder source.
    pub contents: String,
}

/// A table that could not be exported.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailedTable {
    pub table: String,
    pub error: String,
}

/// Summary of an export run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportResult {
    pub run_id: String,
    /// Timestamp used for every backfilled value.
    pub now: String,
    pub tables_total: usize,
    pub tables_success: usize,
    pub failed_tables: Vec<FailedTable>,
    pub rows_exported: usize,
    pub files: Vec<PathBuf>,
    pub duration_seconds: f64,
}

impl ExportResult {
    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Drives the export of one or more tables from a source.
pub struct Exporter<S> {
    source: S,
    config: ExportConfig,
    classes: ColumnClasses,
    emitter: SeederEmitter,
}

impl Exporter<MysqlReader> {
    /// Connect to the configured MySQL source.
    pub async fn connect(config: Config) -> Result<Self> {
        let reader = MysqlReader::new(&config.source).await?;
        Ok(Self::with_source(reader, config.export))
    }
}

impl<S> Exporter<S>
where
    S: SchemaIntrospector + RowSource,
{
    pub fn with_source(source: S, config: ExportConfig) -> Self {
        let classes = config.classes();
        let emitter = SeederEmitter::new(config.output_dir.clone());
        Self {
            source,
            config,
            classes,
            emitter,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Render one table without writing it.
    pub async fn export_table(&self, table: &str, now: &Timestamp) -> Result<TableExport> {
        let columns = self.source.column_names(table).await?;
        let raw_rows = self.source.fetch_rows(table).await?;

        let rows = normalize_rows(&raw_rows, &columns, &self.classes, now)?;
        let row_count = rows.len();
        let literal = to_literal(&rows_to_value(rows), INDENT_UNIT)?;
        let contents = seeder::render(table, &literal);

        debug!("Rendered {} rows for table {}", row_count, table);

        Ok(TableExport {
            table: table.to_string(),
            class_name: seeder::class_name(table),
            rows: row_count,
            literal,
            contents,
        })
    }

    /// Export the configured tables (or every table) using the current time.
    pub async fn run(&self, cancel: CancellationToken) -> Result<ExportResult> {
        let now = self.config.now()?;
        self.run_at(now, cancel).await
    }

    /// Export with an explicit timestamp.
    ///
    /// A failing table is logged and recorded in
    /// [`ExportResult::failed_tables`]; the remaining tables still run.
    pub async fn run_at(&self, now: Timestamp, cancel: CancellationToken) -> Result<ExportResult> {
        let start = Instant::now();
        let run_id = Uuid::new_v4().to_string();

        let tables = match &self.config.tables {
            Some(tables) => tables.clone(),
            None => self.source.table_names().await?,
        };

        info!(
            "Exporting {} tables to {} (run {}, now {})",
            tables.len(),
            self.emitter.output_dir().display(),
            run_id,
            now
        );

        let mut result = ExportResult {
            run_id,
            now: now.to_string(),
            tables_total: tables.len(),
            tables_success: 0,
            failed_tables: Vec::new(),
            rows_exported: 0,
            files: Vec::new(),
            duration_seconds: 0.0,
        };

        // Lowercased class name -> table that wrote it.
        let mut claimed = HashMap::new();

        for table in &tables {
            if cancel.is_cancelled() {
                return Err(ExportError::Cancelled);
            }

            match self.write_table(table, &now, &mut claimed).await {
                Ok((rows, path)) => {
                    info!("Exported {} rows from {} to {}", rows, table, path.display());
                    result.tables_success += 1;
                    result.rows_exported += rows;
                    result.files.push(path);
                }
                Err(e) => {
                    warn!("Failed to export table {}: {}", table, e);
                    result.failed_tables.push(FailedTable {
                        table: table.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        result.duration_seconds = start.elapsed().as_secs_f64();
        info!(
            "Export finished: {}/{} tables, {} rows in {:.2}s",
            result.tables_success, result.tables_total, result.rows_exported, result.duration_seconds
        );

        Ok(result)
    }

    /// Export and write one table unless its seeder file is already taken
    /// by an earlier table in this run.
    async fn write_table(
        &self,
        table: &str,
        now: &Timestamp,
        claimed: &mut HashMap<String, String>,
    ) -> Result<(usize, PathBuf)> {
        // Case-insensitive filesystems fold these too.
        let key = seeder::class_name(table).to_lowercase();
        if let Some(previous) = claimed.get(&key) {
            return Err(ExportError::Output(format!(
                "seeder for '{}' would overwrite the one written for '{}'",
                table, previous
            )));
        }

        let export = self.export_table(table, now).await?;
        let path = self.emitter.write(&export.table, &export.contents)?;
        claimed.insert(key, table.to_string());
        Ok((export.rows, path))
    }
}

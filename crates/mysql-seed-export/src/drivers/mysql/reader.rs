//! MySQL/MariaDB source reader implementation.
//!
//! Implements [`SchemaIntrospector`] and [`RowSource`] on top of an SQLx
//! connection pool.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use indexmap::IndexMap;
use sqlx::mysql::{MySqlConnectOptions, MySqlPool, MySqlPoolOptions, MySqlRow, MySqlSslMode};
use sqlx::{Row, ValueRef};
use tracing::{debug, info};

use crate::config::{FetchMode, SourceConfig};
use crate::core::schema::{Column, Table, ValueKind};
use crate::core::traits::{RowSource, SchemaIntrospector};
use crate::core::value::{LiteralKey, RawRow, SqlValue};
use crate::error::{ExportError, Result};

use super::dialect::{MysqlDialect, TableAffixes};

/// Connection pool timeout.
const POOL_CONNECTION_TIMEOUT: Duration = Duration::from_secs(30);

/// Export reads one table at a time.
const MAX_CONNECTIONS: u32 = 2;

/// MySQL/MariaDB source reader implementation.
pub struct MysqlReader {
    pool: MySqlPool,
    database: String,
    dialect: MysqlDialect,
    fetch_mode: FetchMode,
}

impl MysqlReader {
    /// Create a new MySQL reader from configuration.
    pub async fn new(config: &SourceConfig) -> Result<Self> {
        let options = connect_options(config);

        let pool = MySqlPoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .acquire_timeout(POOL_CONNECTION_TIMEOUT)
            .connect_with(options)
            .await
            .map_err(|e| ExportError::pool(e, "creating MySQL source pool"))?;

        info!(
            "Connected to MySQL source: {}:{}/{}",
            config.host, config.port, config.database
        );

        let affixes = TableAffixes::new(
            config.table_prefix.as_deref(),
            config.table_suffix.as_deref(),
        );

        Ok(Self {
            pool,
            database: config.database.clone(),
            dialect: MysqlDialect::new(affixes),
            fetch_mode: config.fetch_mode,
        })
    }

    /// Test the database connection and return its round-trip latency.
    pub async fn health_check(&self) -> Result<Duration> {
        let start = Instant::now();
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| ExportError::pool(e, "testing MySQL connection"))?;
        Ok(start.elapsed())
    }

    /// Close the connection pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Load a table with its columns.
    ///
    /// Fails with [`ExportError::Schema`] if the table does not exist.
    pub async fn load_table(&self, table: &str) -> Result<Table> {
        let physical = self.dialect.affixes().physical_name(table);

        if !self.table_exists(&physical).await? {
            return Err(ExportError::Schema(table.to_string()));
        }

        Ok(Table {
            schema: self.database.clone(),
            name: table.to_string(),
            columns: self.load_columns(&physical).await?,
        })
    }

    async fn table_exists(&self, physical: &str) -> Result<bool> {
        let query = r#"
            SELECT COUNT(*) AS n
            FROM INFORMATION_SCHEMA.TABLES
            WHERE TABLE_SCHEMA = ? AND TABLE_NAME = ?
        "#;

        let row: MySqlRow = sqlx::query(query)
            .bind(&self.database)
            .bind(physical)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| ExportError::pool(e, "checking MySQL table existence"))?;

        Ok(row.try_get::<i64, _>("n")? > 0)
    }

    async fn load_columns(&self, physical: &str) -> Result<Vec<Column>> {
        // CAST to CHAR to handle collation differences where information_schema
        // may return VARBINARY instead of VARCHAR
        let query = r#"
            SELECT
                CAST(COLUMN_NAME AS CHAR(255)) AS COLUMN_NAME,
                CAST(DATA_TYPE AS CHAR(255)) AS DATA_TYPE,
                CAST(COLUMN_TYPE AS CHAR(1024)) AS COLUMN_TYPE,
                CAST(IF(IS_NULLABLE = 'YES', 1, 0) AS SIGNED) AS is_nullable,
                CAST(ORDINAL_POSITION AS SIGNED) AS ORDINAL_POSITION
            FROM INFORMATION_SCHEMA.COLUMNS
            WHERE TABLE_SCHEMA = ? AND TABLE_NAME = ?
            ORDER BY ORDINAL_POSITION
        "#;

        let rows: Vec<MySqlRow> = sqlx::query(query)
            .bind(&self.database)
            .bind(physical)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| ExportError::pool(e, "loading MySQL columns"))?;

        rows.iter()
            .map(|row| -> Result<Column> {
                Ok(Column {
                    name: row.try_get("COLUMN_NAME")?,
                    data_type: row.try_get("DATA_TYPE")?,
                    column_type: row.try_get("COLUMN_TYPE")?,
                    is_nullable: row.try_get::<i64, _>("is_nullable")? == 1,
                    ordinal_pos: i32::try_from(row.try_get::<i64, _>("ORDINAL_POSITION")?)
                        .unwrap_or(i32::MAX),
                })
            })
            .collect()
    }

    /// Convert a MySQL row to a raw row keyed per the fetch mode.
    fn decode_row(&self, row: &MySqlRow, columns: &[Column]) -> Result<RawRow> {
        let width = match self.fetch_mode {
            FetchMode::Named => columns.len(),
            FetchMode::Both => columns.len() * 2,
        };
        let mut raw = RawRow::with_capacity(width);

        for (i, col) in columns.iter().enumerate() {
            let value = decode_value(row, i, col.value_kind())?;
            if self.fetch_mode == FetchMode::Both {
                raw.insert(LiteralKey::Str(col.name.clone()), value.clone());
                raw.insert(LiteralKey::Int(i as i64), value);
            } else {
                raw.insert(LiteralKey::Str(col.name.clone()), value);
            }
        }

        Ok(raw)
    }
}

/// Connection options for `config`.
///
/// The session `time_zone` is left to the server so TIMESTAMP columns read
/// back in server time rather than the `+00:00` sqlx sets by default.
fn connect_options(config: &SourceConfig) -> MySqlConnectOptions {
    MySqlConnectOptions::new()
        .host(&config.host)
        .port(config.port)
        .database(&config.database)
        .username(&config.user)
        .password(&config.password)
        .charset("utf8mb4")
        .timezone(None::<String>)
        .ssl_mode(MySqlSslMode::Preferred)
}

/// Decode column `idx` according to its kind.
fn decode_value(row: &MySqlRow, idx: usize, kind: ValueKind) -> Result<SqlValue> {
    let is_null = row.try_get_raw(idx).map(|r| r.is_null()).unwrap_or(true);
    if is_null {
        return Ok(SqlValue::Null);
    }

    let value = match kind {
        ValueKind::Signed => row
            .try_get::<i64, _>(idx)
            .map(SqlValue::Int)
            .or_else(|_| row.try_get::<String, _>(idx).map(SqlValue::Text))?,
        ValueKind::Unsigned => unsigned_to_value(row.try_get::<u64, _>(idx)?),
        ValueKind::Float => row
            .try_get::<f64, _>(idx)
            .or_else(|_| row.try_get::<f32, _>(idx).map(f64::from))
            .map(SqlValue::Float)?,
        ValueKind::Bool => row
            .try_get::<bool, _>(idx)
            .map(SqlValue::Bool)
            .or_else(|_| row.try_get::<u64, _>(idx).map(unsigned_to_value))?,
        ValueKind::CastText | ValueKind::Text => row
            .try_get::<String, _>(idx)
            .map(SqlValue::Text)
            .or_else(|_| row.try_get::<Vec<u8>, _>(idx).map(bytes_to_value))?,
        ValueKind::Binary => bytes_to_value(row.try_get::<Vec<u8>, _>(idx)?),
    };

    Ok(value)
}

/// Values above `i64::MAX` are kept exact as text.
fn unsigned_to_value(v: u64) -> SqlValue {
    i64::try_from(v)
        .map(SqlValue::Int)
        .unwrap_or_else(|_| SqlValue::Text(v.to_string()))
}

/// Binary data that is valid UTF-8 is treated as text.
fn bytes_to_value(bytes: Vec<u8>) -> SqlValue {
    String::from_utf8(bytes)
        .map(SqlValue::Text)
        .unwrap_or_else(|e| SqlValue::Bytes(e.into_bytes()))
}

#[async_trait]
impl SchemaIntrospector for MysqlReader {
    async fn table_names(&self) -> Result<Vec<String>> {
        let query = r#"
            SELECT CAST(TABLE_NAME AS CHAR(255)) AS TABLE_NAME
            FROM INFORMATION_SCHEMA.TABLES
            WHERE TABLE_SCHEMA = ? AND TABLE_TYPE = 'BASE TABLE'
            ORDER BY TABLE_NAME
        "#;

        let rows: Vec<MySqlRow> = sqlx::query(query)
            .bind(&self.database)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| ExportError::pool(e, "listing MySQL tables"))?;

        let affixes = self.dialect.affixes();
        let mut tables = Vec::with_capacity(rows.len());
        for row in rows {
            let physical: String = row.try_get("TABLE_NAME")?;
            if let Some(name) = affixes.logical_name(&physical) {
                tables.push(name.to_string());
            }
        }

        debug!("Found {} tables in '{}'", tables.len(), self.database);
        Ok(tables)
    }

    async fn column_names(&self, table: &str) -> Result<Vec<String>> {
        Ok(self.load_table(table).await?.column_names())
    }

    async fn column_types(&self, table: &str) -> Result<IndexMap<String, String>> {
        Ok(self.load_table(table).await?.column_types())
    }
}

#[async_trait]
impl RowSource for MysqlReader {
    async fn fetch_rows(&self, table: &str) -> Result<Vec<RawRow>> {
        let table = self.load_table(table).await?;
        let sql = self.dialect.build_select_all(&table);
        debug!("Fetching rows: {}", sql);

        let rows: Vec<MySqlRow> = sqlx::query(&sql).fetch_all(&self.pool).await?;

        let raw = rows
            .iter()
            .map(|row| self.decode_row(row, &table.columns))
            .collect::<Result<Vec<_>>>()?;

        debug!("Fetched {} rows from {}", raw.len(), table.full_name());
        Ok(raw)
    }
}

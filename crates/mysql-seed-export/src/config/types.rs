//! Configuration type definitions.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset, Local, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::core::{ColumnClasses, Timestamp};
use crate::error::{ExportError, Result};

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Source database configuration (MySQL).
    pub source: SourceConfig,

    /// Export behavior configuration.
    #[serde(default)]
    pub export: ExportConfig,
}

/// Source database (MySQL/MariaDB) configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Database type (always "mysql" for now).
    #[serde(default = "default_mysql")]
    pub r#type: String,

    /// Database host.
    pub host: String,

    /// Database port (default: 3306).
    #[serde(default = "default_mysql_port")]
    pub port: u16,

    /// Database name.
    pub database: String,

    /// Username.
    pub user: String,

    /// Password.
    #[serde(default)]
    pub password: String,

    /// Prefix substituted for the first `%s` in SQL text and prepended to
    /// table names.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_prefix: Option<String>,

    /// Suffix substituted for the second `%s` in SQL text and appended to
    /// table names.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_suffix: Option<String>,

    /// How result rows are keyed (default: both).
    #[serde(default)]
    pub fetch_mode: FetchMode,
}

impl fmt::Debug for SourceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceConfig")
            .field("type", &self.r#type)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &"[REDACTED]")
            .field("table_prefix", &self.table_prefix)
            .field("table_suffix", &self.table_suffix)
            .field("fetch_mode", &self.fetch_mode)
            .finish()
    }
}

/// How fetched rows are keyed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchMode {
    /// Column names only.
    Named,
    /// Column names, each followed by its positional index.
    ///
    /// Positional keys are not columns, so every row gets its audit columns
    /// backfilled.
    #[default]
    Both,
}

/// Export behavior configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Tables to export. All base tables if not set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tables: Option<Vec<String>>,

    /// Directory the seeder files are written to.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Columns coerced to booleans.
    #[serde(default)]
    pub boolean_columns: Vec<String>,

    /// Columns whose missing values are replaced by the run's timestamp.
    #[serde(default = "default_timestamp_columns")]
    pub timestamp_columns: Vec<String>,

    /// Columns whose zero dates are replaced by NULL.
    #[serde(default = "default_date_columns")]
    pub date_columns: Vec<String>,

    /// Timezone for the run's timestamp: `local`, `utc`, an offset like `+01:00`
    /// or an IANA name like `Europe/Berlin`.
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            tables: None,
            output_dir: default_output_dir(),
            boolean_columns: Vec::new(),
            timestamp_columns: default_timestamp_columns(),
            date_columns: default_date_columns(),
            timezone: default_timezone(),
        }
    }
}

impl ExportConfig {
    /// Column classification for the normalizer.
    pub fn classes(&self) -> ColumnClasses {
        ColumnClasses::new(
            self.boolean_columns.iter().cloned(),
            self.timestamp_columns.iter().cloned(),
            self.date_columns.iter().cloned(),
        )
    }

    /// The current time in the configured timezone.
    pub fn now(&self) -> Result<Timestamp> {
        let tz: Timezone = self.timezone.parse()?;
        Ok(tz.now())
    }
}

/// Timezone used to capture a run's timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timezone {
    Local,
    Utc,
    Fixed(FixedOffset),
    Named(Tz),
}

impl Timezone {
    pub fn now(&self) -> Timestamp {
        self.at(Utc::now())
    }

    /// Wall-clock time of `instant` in this timezone.
    pub fn at(&self, instant: DateTime<Utc>) -> Timestamp {
        let naive = match self {
            Timezone::Local => instant.with_timezone(&Local).naive_local(),
            Timezone::Utc => instant.naive_utc(),
            Timezone::Fixed(offset) => instant.with_timezone(offset).naive_local(),
            Timezone::Named(tz) => instant.with_timezone(tz).naive_local(),
        };
        Timestamp::from_naive(naive)
    }
}

impl FromStr for Timezone {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "local" => Ok(Timezone::Local),
            "utc" | "z" => Ok(Timezone::Utc),
            _ => {
                if let Ok(tz) = s.parse::<Tz>() {
                    return Ok(Timezone::Named(tz));
                }
                s.parse::<FixedOffset>().map(Timezone::Fixed).map_err(|_| {
                    ExportError::Config(format!(
                        "export.timezone must be 'local', 'utc', an offset like '+01:00' \
                         or a zone like 'Europe/Berlin', got '{}'",
                        s
                    ))
                })
            }
        }
    }
}

fn default_mysql() -> String {
    "mysql".to_string()
}

fn default_mysql_port() -> u16 {
    3306
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./database/seeds")
}

fn default_timestamp_columns() -> Vec<String> {
    vec!["created_at".to_string(), "updated_at".to_string()]
}

fn default_date_columns() -> Vec<String> {
    vec!["birthday".to_string()]
}

fn default_timezone() -> String {
    "local".to_string()
}

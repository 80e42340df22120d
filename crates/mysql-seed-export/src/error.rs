//! Error types for the seeder export library.

use thiserror::Error;

/// Exit code for configuration errors (bad YAML, missing fields).
pub const EXIT_CONFIG_ERROR: u8 = 1;
/// Exit code for database connection or query errors.
pub const EXIT_SOURCE_ERROR: u8 = 2;
/// Exit code for unknown tables.
pub const EXIT_SCHEMA_ERROR: u8 = 3;
/// Exit code for values that cannot be rendered as literals.
pub const EXIT_VALUE_ERROR: u8 = 4;
/// Exit code for a cancelled export.
pub const EXIT_CANCELLED: u8 = 5;
/// Exit code for JSON output errors.
pub const EXIT_JSON_ERROR: u8 = 6;
/// Exit code for file system errors.
pub const EXIT_IO_ERROR: u8 = 7;

/// Main error type for export operations.
#[derive(Error, Debug)]
pub enum ExportError {
    /// Configuration error (invalid YAML, missing fields, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Source database connection or query error
    #[error("Source database error: {0}")]
    Source(#[from] sqlx::Error),

    /// Connection pool error with context
    #[error("Pool error: {message}\n  Context: {context}")]
    Pool { message: String, context: String },

    /// Table is unknown to the catalog
    #[error("Table '{0}' does not exist")]
    Schema(String),

    /// Value cannot be coerced or rendered as a literal
    #[error("Unsupported value type: {0}")]
    UnsupportedValueType(String),

    /// Seeder file cannot be written safely
    #[error("Output error: {0}")]
    Output(String),

    /// IO error (file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Export was cancelled (SIGINT, etc.)
    #[error("Export cancelled")]
    Cancelled,
}

impl ExportError {
    /// Create a Pool error with context about where it occurred
    pub fn pool(message: impl std::fmt::Display, context: impl Into<String>) -> Self {
        ExportError::Pool {
            message: message.to_string(),
            context: context.into(),
        }
    }

    /// Create an UnsupportedValueType error naming the offending variant
    pub fn unsupported(kind: impl Into<String>) -> Self {
        ExportError::UnsupportedValueType(kind.into())
    }

    /// Process exit code for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            ExportError::Config(_) | ExportError::Yaml(_) => EXIT_CONFIG_ERROR,
            ExportError::Source(_) | ExportError::Pool { .. } => EXIT_SOURCE_ERROR,
            ExportError::Schema(_) => EXIT_SCHEMA_ERROR,
            ExportError::UnsupportedValueType(_) => EXIT_VALUE_ERROR,
            ExportError::Cancelled => EXIT_CANCELLED,
            ExportError::Json(_) => EXIT_JSON_ERROR,
            ExportError::Io(_) | ExportError::Output(_) => EXIT_IO_ERROR,
        }
    }

    /// Format error with full details including error chain
    pub fn format_detailed(&self) -> String {
        let mut output = format!("Error: {}\n", self);

        let mut source = std::error::Error::source(self);
        let mut depth = 1;
        while let Some(err) = source {
            output.push_str(&format!("\nCaused by:\n  {}: {}", depth, err));
            source = err.source();
            depth += 1;
        }

        output
    }
}

/// Result type alias for export operations.
pub type Result<T> = std::result::Result<T, ExportError>;

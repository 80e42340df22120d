//! Configuration validation.

use tracing::warn;

use super::{Config, Timezone};
use crate::error::{ExportError, Result};

/// Validate the configuration.
pub fn validate(config: &Config) -> Result<()> {
    // Source validation
    if config.source.host.is_empty() {
        return Err(ExportError::Config("source.host is required".into()));
    }
    if config.source.database.is_empty() {
        return Err(ExportError::Config("source.database is required".into()));
    }
    if config.source.user.is_empty() {
        return Err(ExportError::Config("source.user is required".into()));
    }
    if config.source.r#type != "mysql" {
        return Err(ExportError::Config(format!(
            "source.type must be 'mysql', got '{}'",
            config.source.r#type
        )));
    }

    // Export validation
    if config.export.output_dir.as_os_str().is_empty() {
        return Err(ExportError::Config("export.output_dir is required".into()));
    }
    if let Some(tables) = &config.export.tables {
        if tables.iter().any(|t| t.trim().is_empty()) {
            return Err(ExportError::Config(
                "export.tables must not contain empty names".into(),
            ));
        }
    }
    config.export.timezone.parse::<Timezone>()?;

    // Overlaps are allowed; the first matching class wins.
    let overlapping = config.export.classes().overlapping();
    if !overlapping.is_empty() {
        warn!(
            "Columns listed in more than one classification (boolean > timestamp > date applies): {}",
            overlapping.join(", ")
        );
    }

    Ok(())
}

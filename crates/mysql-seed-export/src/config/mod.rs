//! Configuration loading and validation.

mod types;
mod validation;

pub use types::*;

use crate::error::Result;
use std::path::Path;

impl Config {
    /// Load configuration from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        validation::validate(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExportError;

    const MINIMAL: &str = r#"
source:
  host: localhost
  database: app
  user: root
"#;

    #[test]
    fn test_from_yaml_applies_defaults() {
        let config = Config::from_yaml(MINIMAL).unwrap();
        assert_eq!(config.source.r#type, "mysql");
        assert_eq!(config.source.port, 3306);
        assert_eq!(config.source.password, "");
        assert_eq!(config.source.fetch_mode, FetchMode::Both);
        assert_eq!(config.export.timezone, "local");
    }

    #[test]
    fn test_from_yaml_full() {
        let yaml = r#"
source:
  type: mysql
  host: db
  port: 3307
  database: shop
  user: app
  password: pw
  table_prefix: "wp_"
  fetch_mode: named
export:
  tables: [users, orders]
  output_dir: out/seeds
  boolean_columns: [active]
  timestamp_columns: [created_at]
  date_columns: []
  timezone: "+02:00"
"#;
        let config = Config::from_yaml(yaml).unwrap();
        assert_eq!(config.source.table_prefix.as_deref(), Some("wp_"));
        assert_eq!(config.source.fetch_mode, FetchMode::Named);
        assert_eq!(
            config.export.tables,
            Some(vec!["users".to_string(), "orders".to_string()])
        );
        assert!(config.export.date_columns.is_empty());
    }

    #[test]
    fn test_from_yaml_missing_fields() {
        let err = Config::from_yaml("source:\n  type: mysql\n").unwrap_err();
        assert!(matches!(err, ExportError::Yaml(_)));
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let err = Config::load("definitely/not/here.yaml").unwrap_err();
        assert!(matches!(err, ExportError::Io(_)));
    }
}

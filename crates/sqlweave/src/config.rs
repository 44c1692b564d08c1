//! Composer configuration: target dialect and foreign-key seed data.
//!
//! ```toml
//! dialect = "postgres"
//!
//! [[foreign_keys]]
//! from_table = "shopping_cart"
//! from_column = "owner_id"
//! to_table = "account"
//! to_column = "id"
//! ```

use crate::dialect::{Dialect, DialectKind};
use crate::error::{ConfigError, ConfigResult};
use crate::graph::{ForeignKey, JoinGraph};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Settings for composing queries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComposerConfig {
    /// Placeholder syntax to render with
    pub dialect: DialectKind,
    /// Foreign keys seeding the join graph
    pub foreign_keys: Vec<ForeignKey>,
}

impl ComposerConfig {
    /// Parse a TOML document
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Parse a JSON document
    pub fn from_json_str(content: &str) -> ConfigResult<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Load from a `.toml` or `.json` file
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let config = match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_str(&content)?,
            Some("json") => Self::from_json_str(&content)?,
            other => {
                return Err(ConfigError::UnsupportedFormat(
                    other.unwrap_or("<none>").to_string(),
                ))
            }
        };

        info!(
            path = %path.display(),
            dialect = %config.dialect,
            foreign_keys = config.foreign_keys.len(),
            "Loaded composer config"
        );
        Ok(config)
    }

    /// Dialect instance for the configured kind
    pub fn dialect(&self) -> &'static dyn Dialect {
        self.dialect.dialect()
    }

    /// Join graph built from the foreign-key seed
    pub fn join_graph(&self) -> JoinGraph {
        JoinGraph::from_foreign_keys(&self.foreign_keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::Table;
    use std::fs;
    use tempfile::TempDir;

    const TOML: &str = r#"
dialect = "postgres"

[[foreign_keys]]
from_table = "shopping_cart"
from_column = "owner_id"
to_table = "account"
to_column = "id"
"#;

    #[test]
    fn test_defaults() {
        let config = ComposerConfig::from_toml_str("").unwrap();
        assert_eq!(config.dialect, DialectKind::Standard);
        assert!(config.foreign_keys.is_empty());
        assert!(config.join_graph().is_empty());
    }

    #[test]
    fn test_toml_builds_graph() {
        let config = ComposerConfig::from_toml_str(TOML).unwrap();
        assert_eq!(config.dialect().name(), "postgres");
        let graph = config.join_graph();
        let items = graph
            .minimal_joins(&Table::new("account"), &[Table::new("shopping_cart")])
            .unwrap();
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn test_json_matches_toml() {
        let json = r#"{
            "dialect": "postgres",
            "foreign_keys": [
                {"from_table": "shopping_cart", "from_column": "owner_id", "to_table": "account", "to_column": "id"}
            ]
        }"#;
        assert_eq!(
            ComposerConfig::from_json_str(json).unwrap(),
            ComposerConfig::from_toml_str(TOML).unwrap()
        );
    }

    #[test]
    fn test_unknown_foreign_key_field_rejected() {
        let toml = r#"
[[foreign_keys]]
from_table = "a"
from_column = "id"
to_table = "b"
to_column = "a_id"
cascade = true
"#;
        assert!(matches!(
            ComposerConfig::from_toml_str(toml),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn test_load_by_extension() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("composer.toml");
        fs::write(&path, TOML).unwrap();

        let config = ComposerConfig::load(&path).unwrap();
        assert_eq!(config.dialect, DialectKind::Postgres);
        assert_eq!(config.foreign_keys.len(), 1);
    }

    #[test]
    fn test_load_errors() {
        let temp = TempDir::new().unwrap();

        let missing = ComposerConfig::load(temp.path().join("missing.toml"));
        assert!(matches!(missing, Err(ConfigError::Io { .. })));

        let yaml = temp.path().join("composer.yaml");
        fs::write(&yaml, "dialect: postgres").unwrap();
        let err = ComposerConfig::load(&yaml).unwrap_err();
        assert_eq!(err.to_string(), "Unsupported config format: yaml");
    }
}

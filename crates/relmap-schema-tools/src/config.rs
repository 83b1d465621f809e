//! Schema tool configuration
//!
//! Loaded from TOML:
//!
//! ```toml
//! dialect = "mysql"
//! max_identifier_length = 64
//!
//! [table_options]
//! charset = "utf8mb4"
//! collation = "utf8mb4_unicode_ci"
//! engine = "InnoDB"
//! ```
//!
//! Every key is optional. `table_options` only affects MySQL.

use std::path::Path;
use std::sync::Arc;

use relmap_core::{
    DialectAdapter, DialectFamily, MIN_IDENTIFIER_LENGTH, MySqlDialect, MySqlTableOptions,
    PostgresDialect, SqliteDialect,
};
use serde::{Deserialize, Serialize};

use crate::{SchemaToolError, SchemaToolResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaToolConfig {
    /// Target database family
    #[serde(default = "default_dialect")]
    pub dialect: DialectFamily,

    /// Override for the dialect's identifier length ceiling
    #[serde(default)]
    pub max_identifier_length: Option<usize>,

    #[serde(default)]
    pub table_options: MySqlTableOptions,
}

fn default_dialect() -> DialectFamily {
    DialectFamily::MySql
}

impl Default for SchemaToolConfig {
    fn default() -> Self {
        Self {
            dialect: default_dialect(),
            max_identifier_length: None,
            table_options: MySqlTableOptions::default(),
        }
    }
}

impl SchemaToolConfig {
    /// Config targeting `family` with default options
    pub fn for_family(family: DialectFamily) -> Self {
        Self {
            dialect: family,
            ..Self::default()
        }
    }

    pub fn from_toml_str(source: &str) -> SchemaToolResult<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject overrides no generated name could satisfy
    pub fn validate(&self) -> SchemaToolResult<()> {
        match self.max_identifier_length {
            Some(length) if length < MIN_IDENTIFIER_LENGTH => {
                Err(SchemaToolError::IdentifierLengthTooSmall {
                    length,
                    minimum: MIN_IDENTIFIER_LENGTH,
                })
            }
            _ => Ok(()),
        }
    }

    pub fn load(path: impl AsRef<Path>) -> SchemaToolResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| SchemaToolError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&source)?;
        tracing::debug!(
            path = %path.display(),
            dialect = %config.dialect,
            "loaded schema tool config"
        );
        Ok(config)
    }

    /// Build the adapter for the configured family, applying the overrides
    pub fn dialect(&self) -> Arc<dyn DialectAdapter> {
        match (self.dialect, self.max_identifier_length) {
            (DialectFamily::MySql, max) => {
                let dialect = MySqlDialect::with_options(self.table_options.clone());
                match max {
                    Some(length) => Arc::new(dialect.with_max_identifier_length(length)),
                    None => Arc::new(dialect),
                }
            }
            (DialectFamily::PostgreSql, Some(length)) => {
                Arc::new(PostgresDialect::new().with_max_identifier_length(length))
            }
            (DialectFamily::Sqlite, Some(length)) => {
                Arc::new(SqliteDialect::new().with_max_identifier_length(length))
            }
            (family, None) => family.adapter(),
        }
    }
}

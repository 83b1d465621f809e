use std::path::PathBuf;

use relmap_core::DialectError;
use thiserror::Error;

pub type SchemaToolResult<T> = Result<T, SchemaToolError>;

/// Errors raised while synthesizing a schema or loading its configuration
#[derive(Debug, Error)]
pub enum SchemaToolError {
    /// A mapping uses a feature the target dialect cannot express
    #[error("cannot generate DDL for table '{table}'")]
    Unsupported {
        table: String,
        #[source]
        source: DialectError,
    },

    /// Two mappings, or a mapping and a join table, claim one table name
    #[error("table '{table}' is defined more than once")]
    DuplicateTable { table: String },

    #[error(transparent)]
    Dialect(#[from] DialectError),

    #[error("invalid schema tool configuration")]
    Config(#[from] toml::de::Error),

    #[error("max_identifier_length {length} is below the minimum of {minimum}")]
    IdentifierLengthTooSmall { length: usize, minimum: usize },

    #[error("failed to read configuration from {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SchemaToolError {
    pub(crate) fn unsupported(table: impl Into<String>, source: DialectError) -> Self {
        SchemaToolError::Unsupported {
            table: table.into(),
            source,
        }
    }
}

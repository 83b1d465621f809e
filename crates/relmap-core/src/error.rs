//! Error types for relmap

use thiserror::Error;

/// Structural defects detected while building a `ClassMapping`.
///
/// These are raised at construction time only. Anything that consumes a built
/// mapping may assume none of these conditions hold.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MappingError {
    #[error("mapping has an empty table name")]
    EmptyTableName,

    #[error("mapping for table '{table}' declares no identifier columns")]
    NoIdentifier { table: String },

    #[error("identifier column '{column}' is not declared on table '{table}'")]
    MissingIdentifierColumn { table: String, column: String },

    #[error("column '{column}' is declared more than once on table '{table}'")]
    DuplicateColumn { table: String, column: String },

    #[error(
        "association '{association}' on table '{table}' references '{target}', which has no identifier columns"
    )]
    DanglingAssociationTarget {
        table: String,
        association: String,
        target: String,
    },

    #[error(
        "association '{association}' on table '{table}' has {found} join column(s) but its target identifier has {expected}"
    )]
    JoinColumnMismatch {
        table: String,
        association: String,
        expected: usize,
        found: usize,
    },

    #[error(
        "join column '{column}' of association '{association}' on table '{table}' references '{referenced}', which is not an identifier column of '{target}'"
    )]
    UnknownReferencedColumn {
        table: String,
        association: String,
        column: String,
        referenced: String,
        target: String,
    },

    #[error("constraint on table '{table}' references unknown column '{column}'")]
    UnknownConstraintColumn { table: String, column: String },
}

/// Errors raised by a dialect adapter.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DialectError {
    /// A mapping asked for something the target dialect cannot express.
    #[error("dialect '{dialect}' does not support {feature}")]
    UnsupportedFeature {
        dialect: &'static str,
        feature: String,
    },

    #[error("unknown dialect family: {0}")]
    UnknownDialect(String),
}

/// Core error type for relmap operations
#[derive(Error, Debug)]
pub enum RelmapError {
    #[error("invalid mapping")]
    InvalidMapping(#[from] MappingError),

    #[error(transparent)]
    Dialect(#[from] DialectError),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Result type alias for relmap operations
pub type Result<T> = std::result::Result<T, RelmapError>;

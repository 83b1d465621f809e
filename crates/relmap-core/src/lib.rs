//! relmap Core - Mapping metadata and SQL dialect rendering
//!
//! This crate provides the building blocks every other relmap crate depends
//! on. It defines:
//!
//! - `ClassMapping` - Validated description of a type's table, columns and associations
//! - `DialectAdapter` - Trait turning abstract column descriptions into dialect SQL
//! - `MySqlDialect`, `PostgresDialect`, `SqliteDialect` - Built-in adapters
//! - `IdentifierNamer` - Deterministic index and constraint names
//! - Common error types

mod dialect;
pub mod dialects;
mod error;
pub mod mapping;
pub mod naming;

pub use dialect::*;
pub use dialects::{
    DialectFamily, DialectRegistry, MySqlDialect, MySqlTableOptions, PostgresDialect, SqliteDialect,
    dialect_for,
};
pub use error::*;
pub use mapping::*;
pub use naming::{IdentifierKind, IdentifierNamer, MIN_IDENTIFIER_LENGTH};

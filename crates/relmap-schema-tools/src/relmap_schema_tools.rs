//! relmap Schema Tools - DDL synthesis from class mappings
//!
//! This crate provides functionality for:
//! - Generating ordered `CREATE` DDL for a set of mappings
//! - Generating the matching `DROP` DDL
//! - Loading synthesis settings from TOML

pub mod config;
mod error;
pub mod synthesis;

pub use config::SchemaToolConfig;
pub use error::{SchemaToolError, SchemaToolResult};
pub use synthesis::{DdlStatement, SchemaTool, render_script};

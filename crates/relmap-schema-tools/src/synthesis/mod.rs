//! Schema synthesis
//!
//! Turns a set of class mappings into the ordered DDL that creates (or drops)
//! their tables, indexes, join tables and foreign keys for one dialect.

mod engine;
mod join_table;
mod statement;


pub use engine::SchemaTool;
pub use statement::{DdlStatement, render_script};

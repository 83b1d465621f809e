//! SQL dialect adapters
//!
//! A `DialectAdapter` turns abstract column and constraint descriptions into
//! literal SQL fragments for one database family. Adapters are stateless
//! apart from construction-time options, so one instance can be shared
//! freely across threads.
//!
//! The required functions are the rendering contract. The provided methods
//! describe capabilities (schema support, where indexes and foreign keys
//! go) and carry the rendering that is common to most families.

use std::fmt;

use crate::{ColumnDef, DefaultValue, DialectError};

/// Where index clauses are emitted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexPlacement {
    /// `INDEX name (cols)` inside `CREATE TABLE`
    Inline,
    /// Separate `CREATE INDEX name ON table (cols)` statements
    Separate,
}

/// Where foreign-key constraints are emitted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForeignKeyPlacement {
    /// `ALTER TABLE ... ADD CONSTRAINT` after every table exists
    AlterTable,
    /// `CONSTRAINT name FOREIGN KEY ...` inside `CREATE TABLE`
    Inline,
}

/// Rendering rules for one SQL database family
pub trait DialectAdapter: Send + Sync + fmt::Debug {
    /// Family identifier (e.g. "mysql")
    fn id(&self) -> &'static str;

    /// Literal type declaration for a column, including any type-bound
    /// modifiers such as `UNSIGNED` or `AUTO_INCREMENT`.
    fn render_column_type(&self, column: &ColumnDef) -> Result<String, DialectError>;

    /// Options appended to every `CREATE TABLE`; empty when there are none
    fn render_table_options(&self) -> String;

    /// Final spelling of a generated index or constraint name
    fn render_index_name(&self, name: &str) -> String;

    /// Longest identifier the family accepts
    fn max_identifier_length(&self) -> usize;

    /// Opening and closing identifier quote characters
    fn identifier_quotes(&self) -> (char, char) {
        ('"', '"')
    }

    fn quote_identifier(&self, name: &str) -> String {
        let (open, close) = self.identifier_quotes();
        format!("{}{}{}", open, name, close)
    }

    /// Column name as it appears in DDL
    fn render_column_name(&self, column: &ColumnDef) -> String {
        if column.quoted {
            self.quote_identifier(&column.name)
        } else {
            column.name.clone()
        }
    }

    /// Whether `namespace.table` names are representable
    fn supports_schemas(&self) -> bool {
        false
    }

    fn index_placement(&self) -> IndexPlacement {
        IndexPlacement::Inline
    }

    fn foreign_key_placement(&self) -> ForeignKeyPlacement {
        ForeignKeyPlacement::AlterTable
    }

    /// Whether an auto-increment column carries its own PRIMARY KEY clause,
    /// so the table-level clause must be omitted
    fn inlines_auto_increment_primary_key(&self) -> bool {
        false
    }

    fn render_boolean(&self, value: bool) -> String {
        let literal = if value { "1" } else { "0" };
        literal.to_string()
    }

    fn render_default(&self, value: &DefaultValue) -> String {
        match value {
            DefaultValue::Null => "NULL".to_string(),
            DefaultValue::Integer(v) => v.to_string(),
            DefaultValue::Float(v) => v.to_string(),
            DefaultValue::Boolean(v) => self.render_boolean(*v),
            DefaultValue::Text(v) => format!("'{}'", v.replace('\'', "''")),
            DefaultValue::Expression(expr) => expr.clone(),
        }
    }

    /// Full column declaration: name, type, default and nullability.
    ///
    /// A nullable column without an explicit default is declared
    /// `DEFAULT NULL`.
    fn render_column_declaration(&self, column: &ColumnDef) -> Result<String, DialectError> {
        let mut declaration = format!(
            "{} {}",
            self.render_column_name(column),
            self.render_column_type(column)?
        );

        match &column.default {
            Some(value) => {
                declaration.push_str(" DEFAULT ");
                declaration.push_str(&self.render_default(value));
            }
            None if column.nullable => declaration.push_str(" DEFAULT NULL"),
            None => {}
        }

        if !column.nullable {
            declaration.push_str(" NOT NULL");
        }

        Ok(declaration)
    }

    /// Statement dropping a named foreign key, or `None` when the family
    /// cannot drop constraints in place
    fn drop_foreign_key_sql(&self, table: &str, name: &str) -> Option<String> {
        Some(format!("ALTER TABLE {} DROP CONSTRAINT {}", table, name))
    }
}

/// Error for an auto-increment flag on a column that cannot carry one
pub(crate) fn auto_increment_unsupported(
    dialect: &'static str,
    column: &ColumnDef,
) -> DialectError {
    DialectError::UnsupportedFeature {
        dialect,
        feature: format!("auto-increment on non-integer column '{}'", column.name),
    }
}

/// Error for an unsigned flag in a family without unsigned integers
pub(crate) fn unsigned_unsupported(dialect: &'static str, column: &ColumnDef) -> DialectError {
    DialectError::UnsupportedFeature {
        dialect,
        feature: format!("unsigned integer column '{}'", column.name),
    }
}

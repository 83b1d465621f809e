//! SQLite dialect

use crate::dialect::{
    DialectAdapter, ForeignKeyPlacement, IndexPlacement, auto_increment_unsupported,
    unsigned_unsupported,
};
use crate::{ColumnDef, ColumnType, DialectError};

const DIALECT_ID: &str = "sqlite";

/// SQLite adapter.
///
/// SQLite cannot add constraints to an existing table, so foreign keys are
/// declared inside `CREATE TABLE`. An auto-increment key must be spelled
/// `INTEGER PRIMARY KEY AUTOINCREMENT` on the column itself.
#[derive(Debug, Clone)]
pub struct SqliteDialect {
    max_identifier_length: usize,
}

impl SqliteDialect {
    pub const MAX_IDENTIFIER_LENGTH: usize = 63;

    pub fn new() -> Self {
        Self {
            max_identifier_length: Self::MAX_IDENTIFIER_LENGTH,
        }
    }

    /// Builder: override the identifier length ceiling
    pub fn with_max_identifier_length(mut self, length: usize) -> Self {
        self.max_identifier_length = length;
        self
    }
}

impl Default for SqliteDialect {
    fn default() -> Self {
        Self::new()
    }
}

impl DialectAdapter for SqliteDialect {
    fn id(&self) -> &'static str {
        DIALECT_ID
    }

    fn render_column_type(&self, column: &ColumnDef) -> Result<String, DialectError> {
        if column.unsigned {
            return Err(unsigned_unsupported(DIALECT_ID, column));
        }
        if column.auto_increment {
            if !column.column_type.is_integer() {
                return Err(auto_increment_unsupported(DIALECT_ID, column));
            }
            return Ok("INTEGER PRIMARY KEY AUTOINCREMENT".to_string());
        }

        let rendered = match column.column_type {
            ColumnType::Integer => "INTEGER".to_string(),
            ColumnType::SmallInt => "SMALLINT".to_string(),
            ColumnType::BigInt => "BIGINT".to_string(),
            ColumnType::String => format!("VARCHAR({})", column.length.unwrap_or(255)),
            ColumnType::FixedString => format!("CHAR({})", column.length.unwrap_or(255)),
            ColumnType::Text | ColumnType::Json => "CLOB".to_string(),
            ColumnType::Decimal => format!(
                "NUMERIC({}, {})",
                column.precision.unwrap_or(10),
                column.scale.unwrap_or(0)
            ),
            ColumnType::Boolean => "BOOLEAN".to_string(),
            ColumnType::Float => "DOUBLE PRECISION".to_string(),
            ColumnType::Date => "DATE".to_string(),
            ColumnType::DateTime => "DATETIME".to_string(),
            ColumnType::Time => "TIME".to_string(),
            ColumnType::Blob => "BLOB".to_string(),
            ColumnType::Guid => "CHAR(36)".to_string(),
        };

        Ok(rendered)
    }

    fn render_table_options(&self) -> String {
        String::new()
    }

    fn render_index_name(&self, name: &str) -> String {
        name.to_string()
    }

    fn max_identifier_length(&self) -> usize {
        self.max_identifier_length
    }

    fn index_placement(&self) -> IndexPlacement {
        IndexPlacement::Separate
    }

    fn foreign_key_placement(&self) -> ForeignKeyPlacement {
        ForeignKeyPlacement::Inline
    }

    fn inlines_auto_increment_primary_key(&self) -> bool {
        true
    }

    fn drop_foreign_key_sql(&self, _table: &str, _name: &str) -> Option<String> {
        None
    }
}

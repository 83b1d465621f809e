//! PostgreSQL dialect

use crate::dialect::{
    DialectAdapter, IndexPlacement, auto_increment_unsupported, unsigned_unsupported,
};
use crate::{ColumnDef, ColumnType, DialectError};

const DIALECT_ID: &str = "postgresql";

/// PostgreSQL adapter.
///
/// Auto-increment uses the SERIAL pseudo-types and indexes are emitted as
/// standalone statements, since `CREATE TABLE` has no inline index clause.
#[derive(Debug, Clone)]
pub struct PostgresDialect {
    max_identifier_length: usize,
}

impl PostgresDialect {
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

impl Default for PostgresDialect {
    fn default() -> Self {
        Self::new()
    }
}

impl DialectAdapter for PostgresDialect {
    fn id(&self) -> &'static str {
        DIALECT_ID
    }

    fn render_column_type(&self, column: &ColumnDef) -> Result<String, DialectError> {
        if column.unsigned {
            return Err(unsigned_unsupported(DIALECT_ID, column));
        }
        if column.auto_increment && !column.column_type.is_integer() {
            return Err(auto_increment_unsupported(DIALECT_ID, column));
        }

        let rendered = match (column.column_type, column.auto_increment) {
            (ColumnType::Integer, false) => "INT".to_string(),
            (ColumnType::Integer, true) => "SERIAL".to_string(),
            (ColumnType::SmallInt, false) => "SMALLINT".to_string(),
            (ColumnType::SmallInt, true) => "SMALLSERIAL".to_string(),
            (ColumnType::BigInt, false) => "BIGINT".to_string(),
            (ColumnType::BigInt, true) => "BIGSERIAL".to_string(),
            (ColumnType::String, _) => format!("VARCHAR({})", column.length.unwrap_or(255)),
            (ColumnType::FixedString, _) => format!("CHAR({})", column.length.unwrap_or(255)),
            (ColumnType::Text, _) => "TEXT".to_string(),
            (ColumnType::Decimal, _) => format!(
                "NUMERIC({}, {})",
                column.precision.unwrap_or(10),
                column.scale.unwrap_or(0)
            ),
            (ColumnType::Boolean, _) => "BOOLEAN".to_string(),
            (ColumnType::Float, _) => "DOUBLE PRECISION".to_string(),
            (ColumnType::Date, _) => "DATE".to_string(),
            (ColumnType::DateTime, _) => "TIMESTAMP(0) WITHOUT TIME ZONE".to_string(),
            (ColumnType::Time, _) => "TIME(0) WITHOUT TIME ZONE".to_string(),
            (ColumnType::Blob, _) => "BYTEA".to_string(),
            (ColumnType::Guid, _) => "UUID".to_string(),
            (ColumnType::Json, _) => "JSON".to_string(),
        };

        Ok(rendered)
    }

    fn render_table_options(&self) -> String {
        String::new()
    }

    /// Unquoted identifiers fold to lower case
    fn render_index_name(&self, name: &str) -> String {
        name.to_lowercase()
    }

    fn max_identifier_length(&self) -> usize {
        self.max_identifier_length
    }

    fn supports_schemas(&self) -> bool {
        true
    }

    fn index_placement(&self) -> IndexPlacement {
        IndexPlacement::Separate
    }

    fn render_boolean(&self, value: bool) -> String {
        let literal = if value { "true" } else { "false" };
        literal.to_string()
    }
}

//! MySQL / MariaDB dialect

use serde::{Deserialize, Serialize};

use crate::dialect::{DialectAdapter, auto_increment_unsupported};
use crate::{ColumnDef, ColumnType, DialectError};

const DIALECT_ID: &str = "mysql";

/// Table options appended to every MySQL `CREATE TABLE`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MySqlTableOptions {
    /// Default character set
    #[serde(default = "default_charset")]
    pub charset: String,
    /// Default collation
    #[serde(default = "default_collation")]
    pub collation: String,
    /// Storage engine
    #[serde(default = "default_engine")]
    pub engine: String,
}

fn default_charset() -> String {
    "utf8".to_string()
}
fn default_collation() -> String {
    "utf8_unicode_ci".to_string()
}
fn default_engine() -> String {
    "InnoDB".to_string()
}

impl Default for MySqlTableOptions {
    fn default() -> Self {
        Self {
            charset: default_charset(),
            collation: default_collation(),
            engine: default_engine(),
        }
    }
}

/// MySQL-family adapter
#[derive(Debug, Clone)]
pub struct MySqlDialect {
    options: MySqlTableOptions,
    max_identifier_length: usize,
}

impl MySqlDialect {
    pub const MAX_IDENTIFIER_LENGTH: usize = 64;

    pub fn new() -> Self {
        Self::with_options(MySqlTableOptions::default())
    }

    pub fn with_options(options: MySqlTableOptions) -> Self {
        Self {
            options,
            max_identifier_length: Self::MAX_IDENTIFIER_LENGTH,
        }
    }

    /// Builder: override the identifier length ceiling
    pub fn with_max_identifier_length(mut self, length: usize) -> Self {
        self.max_identifier_length = length;
        self
    }

    pub fn options(&self) -> &MySqlTableOptions {
        &self.options
    }
}

impl Default for MySqlDialect {
    fn default() -> Self {
        Self::new()
    }
}

impl DialectAdapter for MySqlDialect {
    fn id(&self) -> &'static str {
        DIALECT_ID
    }

    fn render_column_type(&self, column: &ColumnDef) -> Result<String, DialectError> {
        if column.auto_increment && !column.column_type.is_integer() {
            return Err(auto_increment_unsupported(DIALECT_ID, column));
        }

        let rendered = match column.column_type {
            ColumnType::Integer | ColumnType::SmallInt | ColumnType::BigInt => {
                let mut sql = match column.column_type {
                    ColumnType::SmallInt => "SMALLINT",
                    ColumnType::BigInt => "BIGINT",
                    _ => "INT",
                }
                .to_string();
                if column.unsigned {
                    sql.push_str(" UNSIGNED");
                }
                if column.auto_increment {
                    sql.push_str(" AUTO_INCREMENT");
                }
                sql
            }
            ColumnType::String => format!("VARCHAR({})", column.length.unwrap_or(255)),
            ColumnType::FixedString => format!("CHAR({})", column.length.unwrap_or(255)),
            ColumnType::Text => "LONGTEXT".to_string(),
            ColumnType::Decimal => format!(
                "NUMERIC({}, {})",
                column.precision.unwrap_or(10),
                column.scale.unwrap_or(0)
            ),
            // No native boolean: narrowest integer
            ColumnType::Boolean => "TINYINT(1)".to_string(),
            ColumnType::Float => "DOUBLE PRECISION".to_string(),
            ColumnType::Date => "DATE".to_string(),
            ColumnType::DateTime => "DATETIME".to_string(),
            ColumnType::Time => "TIME".to_string(),
            ColumnType::Blob => "LONGBLOB".to_string(),
            ColumnType::Guid => "CHAR(36)".to_string(),
            ColumnType::Json => "JSON".to_string(),
        };

        Ok(rendered)
    }

    fn render_table_options(&self) -> String {
        format!(
            "DEFAULT CHARACTER SET {} COLLATE {} ENGINE = {}",
            self.options.charset, self.options.collation, self.options.engine
        )
    }

    fn render_index_name(&self, name: &str) -> String {
        name.to_string()
    }

    fn max_identifier_length(&self) -> usize {
        self.max_identifier_length
    }

    fn identifier_quotes(&self) -> (char, char) {
        ('`', '`')
    }

    fn drop_foreign_key_sql(&self, table: &str, name: &str) -> Option<String> {
        Some(format!("ALTER TABLE {} DROP FOREIGN KEY {}", table, name))
    }
}

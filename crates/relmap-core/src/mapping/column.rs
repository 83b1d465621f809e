//! Column definitions

use serde::{Deserialize, Serialize};

/// Abstract column type, independent of any SQL dialect.
///
/// Dialect adapters turn these into literal type declarations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    Integer,
    SmallInt,
    BigInt,
    /// Variable-length string (VARCHAR)
    String,
    /// Fixed-length string (CHAR)
    FixedString,
    Text,
    /// Fixed-point numeric, rendered with explicit precision and scale
    Decimal,
    Boolean,
    Float,
    Date,
    DateTime,
    Time,
    Blob,
    Guid,
    Json,
}

impl ColumnType {
    /// Whether this type is one of the integer family
    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            ColumnType::Integer | ColumnType::SmallInt | ColumnType::BigInt
        )
    }
}

/// Literal default value for a column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DefaultValue {
    Null,
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Text(String),
    /// Raw SQL expression emitted verbatim (e.g. `CURRENT_TIMESTAMP`)
    Expression(String),
}

/// Referential action for foreign keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForeignKeyAction {
    Restrict,
    Cascade,
    SetNull,
    SetDefault,
}

impl ForeignKeyAction {
    pub fn as_sql(&self) -> &'static str {
        match self {
            ForeignKeyAction::Restrict => "RESTRICT",
            ForeignKeyAction::Cascade => "CASCADE",
            ForeignKeyAction::SetNull => "SET NULL",
            ForeignKeyAction::SetDefault => "SET DEFAULT",
        }
    }
}

/// One physical column of a mapped table
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDef {
    /// Column name, unquoted
    pub name: String,
    /// Render the name with the dialect's identifier quote
    pub quoted: bool,
    pub column_type: ColumnType,
    pub nullable: bool,
    /// Length for string types
    pub length: Option<u32>,
    /// Precision for decimal types
    pub precision: Option<u32>,
    /// Scale for decimal types
    pub scale: Option<u32>,
    pub unsigned: bool,
    pub auto_increment: bool,
    /// Column-level unique constraint
    pub unique: bool,
    pub default: Option<DefaultValue>,
}

impl ColumnDef {
    /// Create a NOT NULL column of the given type
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            quoted: false,
            column_type,
            nullable: false,
            length: None,
            precision: None,
            scale: None,
            unsigned: false,
            auto_increment: false,
            unique: false,
            default: None,
        }
    }

    /// Builder: integer column
    pub fn integer(name: impl Into<String>) -> Self {
        Self::new(name, ColumnType::Integer)
    }

    /// Builder: VARCHAR column with the given length
    pub fn string(name: impl Into<String>, length: u32) -> Self {
        Self::new(name, ColumnType::String).with_length(length)
    }

    /// Builder: fixed-point column
    pub fn decimal(name: impl Into<String>, precision: u32, scale: u32) -> Self {
        Self {
            precision: Some(precision),
            scale: Some(scale),
            ..Self::new(name, ColumnType::Decimal)
        }
    }

    /// Builder: boolean column
    pub fn boolean(name: impl Into<String>) -> Self {
        Self::new(name, ColumnType::Boolean)
    }

    /// Builder: set length
    pub fn with_length(mut self, length: u32) -> Self {
        self.length = Some(length);
        self
    }

    /// Builder: allow NULL
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Builder: quote the column name
    pub fn quoted(mut self) -> Self {
        self.quoted = true;
        self
    }

    /// Builder: auto-increment (identity) column
    pub fn auto_increment(mut self) -> Self {
        self.auto_increment = true;
        self
    }

    /// Builder: column-level unique constraint
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Builder: unsigned integer
    pub fn unsigned(mut self) -> Self {
        self.unsigned = true;
        self
    }

    /// Builder: set default value
    pub fn default_value(mut self, value: DefaultValue) -> Self {
        self.default = Some(value);
        self
    }
}

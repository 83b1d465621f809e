//! DDL statement model

use std::fmt;

/// One generated DDL statement.
///
/// `Display` renders the literal SQL without a trailing separator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DdlStatement {
    CreateSchema {
        name: String,
    },
    CreateTable {
        table: String,
        sql: String,
    },
    CreateIndex {
        table: String,
        name: String,
        sql: String,
    },
    AddForeignKey {
        table: String,
        name: String,
        sql: String,
    },
    DropForeignKey {
        table: String,
        name: String,
        sql: String,
    },
    DropTable {
        table: String,
    },
}

impl DdlStatement {
    /// Literal SQL of this statement
    pub fn sql(&self) -> String {
        match self {
            DdlStatement::CreateSchema { name } => format!("CREATE SCHEMA {}", name),
            DdlStatement::DropTable { table } => format!("DROP TABLE {}", table),
            DdlStatement::CreateTable { sql, .. }
            | DdlStatement::CreateIndex { sql, .. }
            | DdlStatement::AddForeignKey { sql, .. }
            | DdlStatement::DropForeignKey { sql, .. } => sql.clone(),
        }
    }

    /// Table the statement acts on; `None` for schema statements
    pub fn table(&self) -> Option<&str> {
        match self {
            DdlStatement::CreateSchema { .. } => None,
            DdlStatement::CreateTable { table, .. }
            | DdlStatement::CreateIndex { table, .. }
            | DdlStatement::AddForeignKey { table, .. }
            | DdlStatement::DropForeignKey { table, .. }
            | DdlStatement::DropTable { table } => Some(table),
        }
    }

    /// `CREATE ...` statement
    pub fn is_create(&self) -> bool {
        matches!(
            self,
            DdlStatement::CreateSchema { .. }
                | DdlStatement::CreateTable { .. }
                | DdlStatement::CreateIndex { .. }
        )
    }

    /// `ALTER TABLE ...` statement
    pub fn is_alter(&self) -> bool {
        matches!(
            self,
            DdlStatement::AddForeignKey { .. } | DdlStatement::DropForeignKey { .. }
        )
    }

    pub fn is_drop(&self) -> bool {
        matches!(self, DdlStatement::DropTable { .. })
    }
}

impl fmt::Display for DdlStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql())
    }
}

/// Join statements into a script, each terminated by `;`
pub fn render_script(statements: &[DdlStatement]) -> String {
    let mut script = statements
        .iter()
        .map(DdlStatement::sql)
        .collect::<Vec<_>>()
        .join(";\n");
    if !statements.is_empty() {
        script.push_str(";\n");
    }
    script
}

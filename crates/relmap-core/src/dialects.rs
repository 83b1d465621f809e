//! Built-in dialect adapters and the registry that looks them up by name

mod mysql;
mod postgres;
mod sqlite;


use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{DialectAdapter, DialectError};

pub use mysql::{MySqlDialect, MySqlTableOptions};
pub use postgres::PostgresDialect;
pub use sqlite::SqliteDialect;

/// The database families with a built-in adapter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DialectFamily {
    #[serde(alias = "mariadb")]
    MySql,
    #[serde(alias = "postgres", alias = "pg")]
    PostgreSql,
    #[serde(alias = "sqlite3")]
    Sqlite,
}

impl DialectFamily {
    pub const ALL: [DialectFamily; 3] = [
        DialectFamily::MySql,
        DialectFamily::PostgreSql,
        DialectFamily::Sqlite,
    ];

    /// Parse a family token, accepting common aliases (case-insensitive)
    pub fn parse(token: &str) -> Result<Self, DialectError> {
        match token.trim().to_lowercase().as_str() {
            "mysql" | "mariadb" => Ok(DialectFamily::MySql),
            "postgresql" | "postgres" | "pg" => Ok(DialectFamily::PostgreSql),
            "sqlite" | "sqlite3" => Ok(DialectFamily::Sqlite),
            _ => Err(DialectError::UnknownDialect(token.to_string())),
        }
    }

    /// Canonical token, also the adapter id
    pub fn as_str(&self) -> &'static str {
        match self {
            DialectFamily::MySql => "mysql",
            DialectFamily::PostgreSql => "postgresql",
            DialectFamily::Sqlite => "sqlite",
        }
    }

    /// Default-configured adapter for this family
    pub fn adapter(&self) -> Arc<dyn DialectAdapter> {
        match self {
            DialectFamily::MySql => Arc::new(MySqlDialect::new()),
            DialectFamily::PostgreSql => Arc::new(PostgresDialect::new()),
            DialectFamily::Sqlite => Arc::new(SqliteDialect::new()),
        }
    }
}

impl fmt::Display for DialectFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DialectFamily {
    type Err = DialectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Registry of dialect adapters keyed by family token
#[derive(Debug, Clone, Default)]
pub struct DialectRegistry {
    adapters: IndexMap<String, Arc<dyn DialectAdapter>>,
}

impl DialectRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with every built-in family registered
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for family in DialectFamily::ALL {
            registry.register(family.adapter());
        }
        registry
    }

    /// Register an adapter under its id, replacing any previous one
    pub fn register(&mut self, adapter: Arc<dyn DialectAdapter>) {
        let id = adapter.id().to_string();
        tracing::info!(dialect = %id, "registering dialect adapter");
        self.adapters.insert(id, adapter);
    }

    /// Look up an adapter by id or family alias
    pub fn get(&self, name: &str) -> Option<Arc<dyn DialectAdapter>> {
        let adapter = self.adapters.get(&Self::key_for(name)).cloned();
        if adapter.is_none() {
            tracing::warn!(dialect = %name, "dialect not found in registry");
        }
        adapter
    }

    /// Registered ids in registration order
    pub fn ids(&self) -> Vec<&str> {
        self.adapters.keys().map(|s| s.as_str()).collect()
    }

    pub fn has(&self, name: &str) -> bool {
        self.adapters.contains_key(&Self::key_for(name))
    }

    fn key_for(name: &str) -> String {
        DialectFamily::parse(name)
            .map(|family| family.as_str().to_string())
            .unwrap_or_else(|_| name.to_string())
    }
}

/// Default-configured adapter for a family token
pub fn dialect_for(token: &str) -> Result<Arc<dyn DialectAdapter>, DialectError> {
    DialectFamily::parse(token).map(|family| family.adapter())
}

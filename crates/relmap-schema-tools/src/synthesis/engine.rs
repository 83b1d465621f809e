//! Schema synthesis engine
//!
//! Synthesis runs in two phases. Planning walks the mappings in input order
//! and decides which tables, indexes and foreign keys exist and in which
//! order. Rendering then spells the plan in the target dialect. All dialect
//! errors surface during rendering, tagged with the table being rendered.

use std::collections::HashSet;
use std::sync::Arc;

use indexmap::IndexSet;
use relmap_core::{
    AssociationDef, ClassMapping, ColumnDef, DialectAdapter, DialectError, ForeignKeyAction,
    ForeignKeyPlacement, IdentifierKind, IdentifierNamer, IndexPlacement, ToOneAssociation,
};

use super::DdlStatement;
use super::join_table::{JoinTableKey, JoinTableLayout, has_owner_in};
use crate::{SchemaToolConfig, SchemaToolError, SchemaToolResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct IndexPlan {
    pub name: String,
    pub columns: Vec<String>,
    pub unique: bool,
    /// Derived from a to-one association rather than declared; replaced by
    /// any later declared index that covers it
    pub implicit: bool,
}

impl IndexPlan {
    /// Whether an index over `columns` is redundant next to this one
    fn fulfills(&self, columns: &[String], unique: bool) -> bool {
        self.columns == columns && (self.unique || !unique)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ForeignKeyPlan {
    pub name: String,
    pub columns: Vec<String>,
    pub referenced_table: String,
    pub referenced_columns: Vec<String>,
    pub on_delete: Option<ForeignKeyAction>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct TablePlan {
    pub name: String,
    pub columns: Vec<ColumnDef>,
    pub primary_key: Vec<String>,
    pub indexes: Vec<IndexPlan>,
    pub foreign_keys: Vec<ForeignKeyPlan>,
}

impl TablePlan {
    fn new(name: String, columns: Vec<ColumnDef>, primary_key: Vec<String>) -> Self {
        Self {
            name,
            columns,
            primary_key,
            indexes: Vec::new(),
            foreign_keys: Vec::new(),
        }
    }

    /// Add a declared index, dropping implicit indexes it covers
    pub(crate) fn add_index(&mut self, name: String, columns: Vec<String>, unique: bool) {
        self.indexes.retain(|existing| {
            !(existing.implicit && existing.columns == columns && (unique || !existing.unique))
        });
        self.indexes.push(IndexPlan {
            name,
            columns,
            unique,
            implicit: false,
        });
    }

    /// Add an association index unless the primary key or an existing index
    /// already covers the same columns
    pub(crate) fn add_implicit_index(&mut self, name: String, columns: Vec<String>, unique: bool) {
        if self.primary_key == columns
            || self.indexes.iter().any(|index| index.fulfills(&columns, unique))
        {
            return;
        }
        self.indexes.push(IndexPlan {
            name,
            columns,
            unique,
            implicit: true,
        });
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum PlanStep {
    Schema(String),
    Table(TablePlan),
}

/// Ordered outcome of the planning phase
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct SchemaPlan {
    pub steps: Vec<PlanStep>,
}

impl SchemaPlan {
    pub fn tables(&self) -> impl DoubleEndedIterator<Item = &TablePlan> {
        self.steps.iter().filter_map(|step| match step {
            PlanStep::Table(table) => Some(table),
            PlanStep::Schema(_) => None,
        })
    }
}

/// Generates ordered DDL for a set of class mappings.
///
/// The tool holds only the dialect adapter and a namer derived from it, so it
/// can be shared across threads and reused for any number of runs.
#[derive(Debug, Clone)]
pub struct SchemaTool {
    dialect: Arc<dyn DialectAdapter>,
    namer: IdentifierNamer,
}

impl SchemaTool {
    pub fn new(dialect: Arc<dyn DialectAdapter>) -> Self {
        let namer = IdentifierNamer::for_dialect(dialect.as_ref());
        Self { dialect, namer }
    }

    pub fn from_config(config: &SchemaToolConfig) -> Self {
        Self::new(config.dialect())
    }

    pub fn dialect(&self) -> &Arc<dyn DialectAdapter> {
        &self.dialect
    }

    /// DDL creating every table needed by `mappings`.
    ///
    /// Schemas, tables and separate indexes come first, in mapping order with
    /// each many-to-many join table right after the mapping that declares it.
    /// Foreign keys follow as `ALTER TABLE` statements in discovery order,
    /// unless the dialect declares them inside `CREATE TABLE`.
    pub fn create_schema(&self, mappings: &[ClassMapping]) -> SchemaToolResult<Vec<DdlStatement>> {
        let plan = self.plan(mappings)?;
        let mut creates = Vec::new();
        let mut alters = Vec::new();

        for step in &plan.steps {
            match step {
                PlanStep::Schema(name) => creates.push(DdlStatement::CreateSchema {
                    name: name.clone(),
                }),
                PlanStep::Table(table) => {
                    creates.push(self.render_create_table(table)?);
                    if self.dialect.index_placement() == IndexPlacement::Separate {
                        creates.extend(
                            table
                                .indexes
                                .iter()
                                .map(|index| self.render_create_index(table, index)),
                        );
                    }
                    if self.dialect.foreign_key_placement() == ForeignKeyPlacement::AlterTable {
                        alters.extend(
                            table
                                .foreign_keys
                                .iter()
                                .map(|fk| self.render_add_foreign_key(table, fk)),
                        );
                    }
                }
            }
        }

        tracing::info!(
            dialect = %self.dialect.id(),
            mappings = mappings.len(),
            tables = plan.tables().count(),
            creates = creates.len(),
            foreign_keys = alters.len(),
            "synthesized create schema"
        );

        creates.append(&mut alters);
        for statement in &creates {
            tracing::debug!(sql = %statement, "emitting statement");
        }
        Ok(creates)
    }

    /// Literal SQL of `create_schema`
    pub fn create_schema_sql(&self, mappings: &[ClassMapping]) -> SchemaToolResult<Vec<String>> {
        Ok(self
            .create_schema(mappings)?
            .iter()
            .map(DdlStatement::sql)
            .collect())
    }

    /// DDL dropping everything `create_schema` would create.
    ///
    /// Foreign keys are dropped first (where the dialect can drop them in
    /// place), then tables in reverse creation order. Schemas are left alone.
    pub fn drop_schema(&self, mappings: &[ClassMapping]) -> SchemaToolResult<Vec<DdlStatement>> {
        let plan = self.plan(mappings)?;
        let mut statements = Vec::new();

        // Rendering validates the tables against the dialect, so drop and
        // create fail on the same inputs.
        for table in plan.tables() {
            self.render_create_table(table)?;
        }

        if self.dialect.foreign_key_placement() == ForeignKeyPlacement::AlterTable {
            for table in plan.tables() {
                for fk in &table.foreign_keys {
                    if let Some(sql) = self.dialect.drop_foreign_key_sql(&table.name, &fk.name) {
                        statements.push(DdlStatement::DropForeignKey {
                            table: table.name.clone(),
                            name: fk.name.clone(),
                            sql,
                        });
                    }
                }
            }
        }

        statements.extend(plan.tables().rev().map(|table| DdlStatement::DropTable {
            table: table.name.clone(),
        }));

        tracing::info!(
            dialect = %self.dialect.id(),
            statements = statements.len(),
            "synthesized drop schema"
        );
        Ok(statements)
    }

    /// Literal SQL of `drop_schema`
    pub fn drop_schema_sql(&self, mappings: &[ClassMapping]) -> SchemaToolResult<Vec<String>> {
        Ok(self
            .drop_schema(mappings)?
            .iter()
            .map(DdlStatement::sql)
            .collect())
    }

    pub(crate) fn plan(&self, mappings: &[ClassMapping]) -> SchemaToolResult<SchemaPlan> {
        let mut plan = SchemaPlan::default();
        let mut namespaces = IndexSet::new();
        let mut join_tables: HashSet<JoinTableKey> = HashSet::new();
        let mut created: HashSet<String> = HashSet::new();

        for mapping in mappings {
            let table = mapping.qualified_name();
            if !self.admit(&table, &mut namespaces, &mut plan) {
                continue;
            }
            if !created.insert(table.clone()) {
                return Err(SchemaToolError::DuplicateTable { table });
            }
            plan.steps.push(PlanStep::Table(self.plan_mapping_table(mapping)));

            for association in mapping.associations() {
                let AssociationDef::ManyToMany(many) = association else {
                    continue;
                };
                if !many.is_owning() && has_owner_in(mappings, mapping, many) {
                    continue;
                }
                let Some(layout) = JoinTableLayout::of(mapping, many) else {
                    continue;
                };
                if !join_tables.insert(layout.key()) {
                    continue;
                }
                if !self.admit(&layout.name, &mut namespaces, &mut plan) {
                    continue;
                }
                if !created.insert(layout.name.clone()) {
                    return Err(SchemaToolError::DuplicateTable { table: layout.name });
                }
                plan.steps.push(PlanStep::Table(self.plan_join_table(&layout)));
            }
        }

        Ok(plan)
    }

    /// Decide whether `table` can be emitted; records its namespace on first
    /// sight when the dialect supports schemas
    fn admit(
        &self,
        table: &str,
        namespaces: &mut IndexSet<String>,
        plan: &mut SchemaPlan,
    ) -> bool {
        let Some((namespace, _)) = table.split_once('.') else {
            return true;
        };
        if !self.dialect.supports_schemas() {
            tracing::debug!(
                table = %table,
                dialect = %self.dialect.id(),
                "skipping namespaced table on dialect without schema support"
            );
            return false;
        }
        if namespaces.insert(namespace.to_string()) {
            plan.steps.push(PlanStep::Schema(namespace.to_string()));
        }
        true
    }

    /// Whether a foreign key may point at `table`
    fn can_reference(&self, table: &str) -> bool {
        self.dialect.supports_schemas() || !table.contains('.')
    }

    fn generated_name(&self, kind: IdentifierKind, table: &str, columns: &[String]) -> String {
        self.dialect
            .render_index_name(&self.namer.name(kind, table, columns))
    }

    fn plan_mapping_table(&self, mapping: &ClassMapping) -> TablePlan {
        let name = mapping.qualified_name();
        let mut table = TablePlan::new(
            name.clone(),
            mapping.table_columns(),
            mapping.identifier().to_vec(),
        );

        let unique_columns: Vec<String> = table
            .columns
            .iter()
            .filter(|column| column.unique)
            .map(|column| column.name.clone())
            .collect();
        for column in unique_columns {
            let columns = vec![column];
            let index_name = self.generated_name(IdentifierKind::UniqueIndex, &name, &columns);
            table.add_index(index_name, columns, true);
        }

        for association in mapping.associations() {
            let Some(to_one) = association.as_to_one() else {
                continue;
            };
            let columns = to_one.local_columns();
            let unique = association.is_unique();
            let kind = if unique {
                IdentifierKind::UniqueIndex
            } else {
                IdentifierKind::Index
            };
            let index_name = self.generated_name(kind, &name, &columns);
            table.add_implicit_index(index_name, columns, unique);

            if let Some(fk) = self.plan_to_one_foreign_key(&name, to_one) {
                table.foreign_keys.push(fk);
            }
        }

        for constraint in mapping.unique_constraints() {
            let index_name = constraint.name.clone().unwrap_or_else(|| {
                self.generated_name(IdentifierKind::UniqueIndex, &name, &constraint.columns)
            });
            table.add_index(index_name, constraint.columns.clone(), true);
        }

        for index in mapping.indexes() {
            let index_name = index.name.clone().unwrap_or_else(|| {
                self.generated_name(IdentifierKind::Index, &name, &index.columns)
            });
            table.add_index(index_name, index.columns.clone(), false);
        }

        table
    }

    fn plan_to_one_foreign_key(
        &self,
        table: &str,
        to_one: &ToOneAssociation,
    ) -> Option<ForeignKeyPlan> {
        if !self.can_reference(&to_one.target.table) {
            tracing::debug!(
                table = %table,
                target = %to_one.target.table,
                "skipping foreign key to unsupported namespaced table"
            );
            return None;
        }
        let columns = to_one.local_columns();
        Some(ForeignKeyPlan {
            name: self.generated_name(IdentifierKind::ForeignKey, table, &columns),
            columns,
            referenced_table: to_one.target.table.clone(),
            referenced_columns: to_one.referenced_columns(),
            on_delete: to_one.on_delete(),
        })
    }

    fn plan_join_table(&self, layout: &JoinTableLayout) -> TablePlan {
        let name = layout.name.clone();
        let sides = [&layout.owning, &layout.inverse];

        let columns: Vec<ColumnDef> = sides
            .iter()
            .flat_map(|side| {
                side.columns.iter().filter_map(|join| {
                    join.resolve(&side.target).map(|mut column| {
                        column.nullable = false;
                        column
                    })
                })
            })
            .collect();
        let primary_key = columns.iter().map(|column| column.name.clone()).collect();
        let mut table = TablePlan::new(name.clone(), columns, primary_key);

        for side in sides {
            let columns: Vec<String> = side.columns.iter().map(|c| c.name.clone()).collect();
            let index_name = self.generated_name(IdentifierKind::Index, &name, &columns);
            table.add_implicit_index(index_name, columns.clone(), false);

            if !self.can_reference(&side.target.table) {
                continue;
            }
            table.foreign_keys.push(ForeignKeyPlan {
                name: self.generated_name(IdentifierKind::ForeignKey, &name, &columns),
                columns,
                referenced_table: side.target.table.clone(),
                referenced_columns: side
                    .columns
                    .iter()
                    .map(|c| c.referenced_column.clone())
                    .collect(),
                on_delete: side.columns.first().and_then(|c| c.on_delete),
            });
        }

        table
    }

    fn render_column_list(&self, table: &TablePlan, columns: &[String]) -> String {
        columns
            .iter()
            .map(|name| match table.columns.iter().find(|c| &c.name == name) {
                Some(column) => self.dialect.render_column_name(column),
                None => name.clone(),
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn render_foreign_key_clause(&self, table: &TablePlan, fk: &ForeignKeyPlan) -> String {
        let mut clause = format!(
            "CONSTRAINT {} FOREIGN KEY ({}) REFERENCES {} ({})",
            fk.name,
            self.render_column_list(table, &fk.columns),
            fk.referenced_table,
            fk.referenced_columns.join(", ")
        );
        if let Some(action) = fk.on_delete {
            clause.push_str(" ON DELETE ");
            clause.push_str(action.as_sql());
        }
        clause
    }

    fn render_create_table(&self, table: &TablePlan) -> SchemaToolResult<DdlStatement> {
        let mut parts = Vec::with_capacity(table.columns.len() + table.indexes.len() + 1);
        for column in &table.columns {
            let declaration = self
                .dialect
                .render_column_declaration(column)
                .map_err(|source| SchemaToolError::unsupported(&table.name, source))?;
            parts.push(declaration);
        }

        if self.dialect.index_placement() == IndexPlacement::Inline {
            for index in &table.indexes {
                let keyword = if index.unique { "UNIQUE INDEX" } else { "INDEX" };
                parts.push(format!(
                    "{} {} ({})",
                    keyword,
                    index.name,
                    self.render_column_list(table, &index.columns)
                ));
            }
        }

        if !self.primary_key_is_inlined(table)? {
            parts.push(format!(
                "PRIMARY KEY({})",
                self.render_column_list(table, &table.primary_key)
            ));
        }

        if self.dialect.foreign_key_placement() == ForeignKeyPlacement::Inline {
            for fk in &table.foreign_keys {
                parts.push(self.render_foreign_key_clause(table, fk));
            }
        }

        let mut sql = format!("CREATE TABLE {} ({})", table.name, parts.join(", "));
        let options = self.dialect.render_table_options();
        if !options.is_empty() {
            sql.push(' ');
            sql.push_str(&options);
        }

        Ok(DdlStatement::CreateTable {
            table: table.name.clone(),
            sql,
        })
    }

    /// Whether an auto-increment column already declares the primary key.
    ///
    /// Dialects that inline the key can only do so for a single-column
    /// identifier made of that very column.
    fn primary_key_is_inlined(&self, table: &TablePlan) -> SchemaToolResult<bool> {
        if !self.dialect.inlines_auto_increment_primary_key() {
            return Ok(false);
        }
        let Some(column) = table.columns.iter().find(|c| c.auto_increment) else {
            return Ok(false);
        };
        if table.primary_key != [column.name.clone()] {
            return Err(SchemaToolError::unsupported(
                &table.name,
                DialectError::UnsupportedFeature {
                    dialect: self.dialect.id(),
                    feature: format!(
                        "auto-increment column '{}' outside a single-column primary key",
                        column.name
                    ),
                },
            ));
        }
        Ok(true)
    }

    fn render_create_index(&self, table: &TablePlan, index: &IndexPlan) -> DdlStatement {
        let keyword = if index.unique {
            "CREATE UNIQUE INDEX"
        } else {
            "CREATE INDEX"
        };
        DdlStatement::CreateIndex {
            table: table.name.clone(),
            name: index.name.clone(),
            sql: format!(
                "{} {} ON {} ({})",
                keyword,
                index.name,
                table.name,
                self.render_column_list(table, &index.columns)
            ),
        }
    }

    fn render_add_foreign_key(&self, table: &TablePlan, fk: &ForeignKeyPlan) -> DdlStatement {
        DdlStatement::AddForeignKey {
            table: table.name.clone(),
            name: fk.name.clone(),
            sql: format!(
                "ALTER TABLE {} ADD {}",
                table.name,
                self.render_foreign_key_clause(table, fk)
            ),
        }
    }
}

//! Class-to-table mapping and its validating builder

use std::collections::HashSet;

use super::{
    AssociationDef, ColumnDef, JoinColumn, ManyToManyAssociation, TargetRef, ToOneAssociation,
};
use crate::MappingError;

/// Table-level unique constraint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniqueConstraint {
    /// Explicit name; generated by the identifier namer when absent
    pub name: Option<String>,
    pub columns: Vec<String>,
}

/// Explicit secondary index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexDef {
    /// Explicit name; generated by the identifier namer when absent
    pub name: Option<String>,
    pub columns: Vec<String>,
}

/// Validated description of one persistable type and its table.
///
/// Only `ClassMappingBuilder::build` produces values of this type, so every
/// `ClassMapping` satisfies the structural checks listed on `MappingError`.
/// There are no mutators; clone it to derive an adapted copy.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassMapping {
    table_name: String,
    namespace: Option<String>,
    entity_name: String,
    columns: Vec<ColumnDef>,
    identifier: Vec<String>,
    unique_constraints: Vec<UniqueConstraint>,
    indexes: Vec<IndexDef>,
    associations: Vec<AssociationDef>,
}

impl ClassMapping {
    /// Start building a mapping.
    ///
    /// A dotted name such as `"audit.entries"` is split into a namespace
    /// qualifier (`audit`) and a table name (`entries`).
    pub fn builder(table: impl Into<String>) -> ClassMappingBuilder {
        ClassMappingBuilder::new(table)
    }

    /// Unqualified table name
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// Short entity name; the unqualified table name unless set with
    /// `ClassMappingBuilder::entity`
    pub fn entity_name(&self) -> &str {
        &self.entity_name
    }

    /// Namespace (schema) qualifier, if any
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// `namespace.table`, or just the table name when unqualified
    pub fn qualified_name(&self) -> String {
        qualify(self.namespace.as_deref(), &self.table_name)
    }

    /// Declared columns in declaration order
    pub fn columns(&self) -> &[ColumnDef] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Identifier (primary key) column names in key order
    pub fn identifier(&self) -> &[String] {
        &self.identifier
    }

    pub fn is_identifier(&self, column: &str) -> bool {
        self.identifier.iter().any(|c| c == column)
    }

    pub fn unique_constraints(&self) -> &[UniqueConstraint] {
        &self.unique_constraints
    }

    pub fn indexes(&self) -> &[IndexDef] {
        &self.indexes
    }

    pub fn associations(&self) -> &[AssociationDef] {
        &self.associations
    }

    /// Reference to this mapping for use as an association target
    pub fn as_target(&self) -> TargetRef {
        TargetRef::new(self.qualified_name(), self.identifier_columns())
            .with_entity(self.entity_name.clone())
    }

    fn identifier_columns(&self) -> Vec<ColumnDef> {
        self.identifier
            .iter()
            .filter_map(|name| self.column(name).cloned())
            .collect()
    }

    /// Physical columns of the table in emission order.
    ///
    /// Identifier columns come first, then the join columns of owning to-one
    /// associations, then every other declared column in declaration order.
    /// A name appears once; the first occurrence wins.
    pub fn table_columns(&self) -> Vec<ColumnDef> {
        let mut seen = HashSet::new();
        let mut ordered = Vec::with_capacity(self.columns.len());

        for column in self.identifier_columns() {
            if seen.insert(column.name.clone()) {
                ordered.push(column);
            }
        }

        for association in &self.associations {
            let Some(to_one) = association.as_to_one() else {
                continue;
            };
            for join in &to_one.join_columns {
                if !seen.insert(join.name.clone()) {
                    continue;
                }
                match self.column(&join.name) {
                    Some(declared) => ordered.push(declared.clone()),
                    None => ordered.extend(join.resolve(&to_one.target)),
                }
            }
        }

        for column in &self.columns {
            if seen.insert(column.name.clone()) {
                ordered.push(column.clone());
            }
        }

        ordered
    }
}

pub(crate) fn qualify(namespace: Option<&str>, table: &str) -> String {
    match namespace {
        Some(ns) => format!("{}.{}", ns, table),
        None => table.to_string(),
    }
}

/// Builder for `ClassMapping`; validation happens in `build`
#[derive(Debug, Clone)]
pub struct ClassMappingBuilder {
    table_name: String,
    namespace: Option<String>,
    entity_name: Option<String>,
    columns: Vec<ColumnDef>,
    identifier: Vec<String>,
    unique_constraints: Vec<UniqueConstraint>,
    indexes: Vec<IndexDef>,
    associations: Vec<AssociationDef>,
}

impl ClassMappingBuilder {
    fn new(table: impl Into<String>) -> Self {
        let table = table.into();
        let (namespace, table_name) = match table.split_once('.') {
            Some((ns, name)) => (Some(ns.to_string()), name.to_string()),
            None => (None, table),
        };
        Self {
            table_name,
            namespace,
            entity_name: None,
            columns: Vec::new(),
            identifier: Vec::new(),
            unique_constraints: Vec::new(),
            indexes: Vec::new(),
            associations: Vec::new(),
        }
    }

    /// Set the short entity name used for default join column names
    pub fn entity(mut self, name: impl Into<String>) -> Self {
        self.entity_name = Some(name.into());
        self
    }

    /// Add a column
    pub fn column(mut self, column: ColumnDef) -> Self {
        self.columns.push(column);
        self
    }

    /// Add a column and append it to the identifier
    pub fn id(mut self, column: ColumnDef) -> Self {
        self.identifier.push(column.name.clone());
        self.columns.push(column);
        self
    }

    /// Replace the identifier with the given column names
    pub fn identifier<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.identifier = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Add a table-level unique constraint
    pub fn unique_constraint<I, S>(mut self, name: Option<&str>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.unique_constraints.push(UniqueConstraint {
            name: name.map(str::to_string),
            columns: columns.into_iter().map(Into::into).collect(),
        });
        self
    }

    /// Add an explicit secondary index
    pub fn index<I, S>(mut self, name: Option<&str>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.indexes.push(IndexDef {
            name: name.map(str::to_string),
            columns: columns.into_iter().map(Into::into).collect(),
        });
        self
    }

    pub fn many_to_one(mut self, association: ToOneAssociation) -> Self {
        self.associations.push(AssociationDef::ManyToOne(association));
        self
    }

    pub fn one_to_one(mut self, association: ToOneAssociation) -> Self {
        self.associations.push(AssociationDef::OneToOne(association));
        self
    }

    pub fn many_to_many(mut self, association: ManyToManyAssociation) -> Self {
        self.associations.push(AssociationDef::ManyToMany(association));
        self
    }

    /// Target reference to the mapping under construction, for
    /// self-referencing associations. Call it after declaring the identifier.
    pub fn self_target(&self) -> TargetRef {
        let identifier = self
            .identifier
            .iter()
            .filter_map(|name| self.columns.iter().find(|c| &c.name == name).cloned())
            .collect();
        TargetRef::new(qualify(self.namespace.as_deref(), &self.table_name), identifier)
            .with_entity(self.entity_name.as_deref().unwrap_or(&self.table_name))
    }

    /// Validate and freeze the mapping
    pub fn build(mut self) -> Result<ClassMapping, MappingError> {
        let table = self.table_name.clone();
        if table.is_empty() {
            return Err(MappingError::EmptyTableName);
        }

        let mut seen = HashSet::new();
        for column in &self.columns {
            if !seen.insert(column.name.to_lowercase()) {
                return Err(MappingError::DuplicateColumn {
                    table,
                    column: column.name.clone(),
                });
            }
        }

        if self.identifier.is_empty() {
            return Err(MappingError::NoIdentifier { table });
        }
        for id in &self.identifier {
            if !self.columns.iter().any(|c| &c.name == id) {
                return Err(MappingError::MissingIdentifierColumn {
                    table,
                    column: id.clone(),
                });
            }
        }

        let source = self.self_target();
        let associations = std::mem::take(&mut self.associations);
        let mut resolved = Vec::with_capacity(associations.len());
        for association in associations {
            resolved.push(self.validate_association(association, &source)?);
        }
        self.associations = resolved;

        let mut physical: HashSet<String> = self.columns.iter().map(|c| c.name.clone()).collect();
        for association in &self.associations {
            if let Some(to_one) = association.as_to_one() {
                physical.extend(to_one.join_columns.iter().map(|j| j.name.clone()));
            }
        }
        let constrained = self
            .unique_constraints
            .iter()
            .flat_map(|u| u.columns.iter())
            .chain(self.indexes.iter().flat_map(|i| i.columns.iter()));
        for column in constrained {
            if !physical.contains(column) {
                return Err(MappingError::UnknownConstraintColumn {
                    table,
                    column: column.clone(),
                });
            }
        }

        tracing::trace!(
            table = %table,
            columns = self.columns.len(),
            associations = self.associations.len(),
            "built class mapping"
        );

        Ok(ClassMapping {
            entity_name: self.entity_name.unwrap_or_else(|| self.table_name.clone()),
            table_name: self.table_name,
            namespace: self.namespace,
            columns: self.columns,
            identifier: self.identifier,
            unique_constraints: self.unique_constraints,
            indexes: self.indexes,
            associations: self.associations,
        })
    }

    fn validate_association(
        &self,
        association: AssociationDef,
        source: &TargetRef,
    ) -> Result<AssociationDef, MappingError> {
        match association {
            AssociationDef::ManyToOne(to_one) => {
                self.check_to_one(&to_one)?;
                Ok(AssociationDef::ManyToOne(to_one))
            }
            AssociationDef::OneToOne(to_one) => {
                self.check_to_one(&to_one)?;
                Ok(AssociationDef::OneToOne(to_one))
            }
            AssociationDef::ManyToMany(many) => {
                let many = self.complete_many_to_many(many, source);
                self.check_join_columns(&many.field, &many.join_columns, source)?;
                self.check_join_columns(&many.field, &many.inverse_join_columns, &many.target)?;
                check_join_table_columns(&many)?;
                Ok(AssociationDef::ManyToMany(many))
            }
        }
    }

    fn check_to_one(&self, to_one: &ToOneAssociation) -> Result<(), MappingError> {
        self.check_join_columns(&to_one.field, &to_one.join_columns, &to_one.target)?;
        for join in &to_one.join_columns {
            let (Some(declared), Some(resolved)) = (
                self.columns.iter().find(|c| c.name == join.name),
                join.resolve(&to_one.target),
            ) else {
                continue;
            };
            if declared.column_type != resolved.column_type {
                return Err(MappingError::DuplicateColumn {
                    table: self.table_name.clone(),
                    column: join.name.clone(),
                });
            }
        }
        Ok(())
    }

    fn check_join_columns(
        &self,
        association: &str,
        join_columns: &[JoinColumn],
        target: &TargetRef,
    ) -> Result<(), MappingError> {
        if target.identifier.is_empty() {
            return Err(MappingError::DanglingAssociationTarget {
                table: self.table_name.clone(),
                association: association.to_string(),
                target: target.table.clone(),
            });
        }
        if join_columns.len() != target.identifier.len() {
            return Err(MappingError::JoinColumnMismatch {
                table: self.table_name.clone(),
                association: association.to_string(),
                expected: target.identifier.len(),
                found: join_columns.len(),
            });
        }
        for join in join_columns {
            if target.identifier_column(&join.referenced_column).is_none() {
                return Err(MappingError::UnknownReferencedColumn {
                    table: self.table_name.clone(),
                    association: association.to_string(),
                    column: join.name.clone(),
                    referenced: join.referenced_column.clone(),
                    target: target.table.clone(),
                });
            }
        }
        Ok(())
    }

    /// Fill in conventional join table and join column names
    fn complete_many_to_many(
        &self,
        mut many: ManyToManyAssociation,
        source: &TargetRef,
    ) -> ManyToManyAssociation {
        let local = self.table_name.as_str();
        let remote = many.target.base_table().to_string();

        let self_referencing = many.target.table == source.table
            && many.join_columns.is_empty()
            && many.inverse_join_columns.is_empty();
        if self_referencing {
            many.join_columns = source.self_join_columns("source");
            many.inverse_join_columns = source.self_join_columns("target");
        }
        if many.join_columns.is_empty() {
            many.join_columns = source.default_join_columns();
        }
        if many.inverse_join_columns.is_empty() {
            many.inverse_join_columns = many.target.default_join_columns();
        }
        if many.join_table.is_none() {
            let name = if many.is_owning() {
                format!("{}_{}", local, remote)
            } else {
                format!("{}_{}", remote, local)
            };
            many.join_table = Some(qualify(self.namespace.as_deref(), &name));
        }
        many
    }
}

/// Join and inverse join columns share one table and need distinct names
fn check_join_table_columns(many: &ManyToManyAssociation) -> Result<(), MappingError> {
    let mut seen = HashSet::new();
    for join in many.join_columns.iter().chain(&many.inverse_join_columns) {
        if !seen.insert(join.name.to_lowercase()) {
            return Err(MappingError::DuplicateColumn {
                table: many.join_table.clone().unwrap_or_default(),
                column: join.name.clone(),
            });
        }
    }
    Ok(())
}

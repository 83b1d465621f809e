//! Association descriptors
//!
//! Only the sides that carry DDL are modelled: owning to-one associations
//! (which put a foreign-key column on their own table) and both sides of a
//! many-to-many (which share a synthesized join table).

use super::{ColumnDef, ForeignKeyAction};

/// The table an association points at, together with its identifier columns.
///
/// The identifier columns are carried along so join columns can be typed
/// after the column they reference.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetRef {
    /// Qualified table name of the target
    pub table: String,
    /// Identifier column definitions of the target, in key order
    pub identifier: Vec<ColumnDef>,
    /// Short entity name, used to derive default join column names
    pub entity: String,
}

impl TargetRef {
    /// Target named after its table; the entity name defaults to the
    /// unqualified table name
    pub fn new(table: impl Into<String>, identifier: Vec<ColumnDef>) -> Self {
        let table = table.into();
        let entity = match table.rsplit_once('.') {
            Some((_, base)) => base.to_string(),
            None => table.clone(),
        };
        Self {
            table,
            identifier,
            entity,
        }
    }

    /// Builder: set the short entity name
    pub fn with_entity(mut self, entity: impl Into<String>) -> Self {
        self.entity = entity.into();
        self
    }

    /// Look up one of the target's identifier columns by name
    pub fn identifier_column(&self, name: &str) -> Option<&ColumnDef> {
        self.identifier.iter().find(|c| c.name == name)
    }

    /// Unqualified part of the target table name
    pub fn base_table(&self) -> &str {
        self.table
            .rsplit_once('.')
            .map(|(_, table)| table)
            .unwrap_or(&self.table)
    }

    /// Conventional join columns: `{entity}_{id}` for each identifier
    /// column, lowercased
    pub(crate) fn default_join_columns(&self) -> Vec<JoinColumn> {
        let mut columns = self.prefixed_join_columns(&self.entity);
        for column in &mut columns {
            column.name = column.name.to_lowercase();
        }
        columns
    }

    /// `{prefix}_{id}` for each identifier column
    pub(crate) fn prefixed_join_columns(&self, prefix: &str) -> Vec<JoinColumn> {
        self.identifier
            .iter()
            .map(|id| JoinColumn::new(format!("{}_{}", prefix, id.name), id.name.clone()))
            .collect()
    }

    /// Join columns for one side of a self-referencing many-to-many:
    /// `{entity}_{role}`, or `{entity}_{role}_{id}` for a composite identifier
    pub(crate) fn self_join_columns(&self, role: &str) -> Vec<JoinColumn> {
        let composite = self.identifier.len() > 1;
        self.identifier
            .iter()
            .map(|id| {
                let name = if composite {
                    format!("{}_{}_{}", self.entity, role, id.name)
                } else {
                    format!("{}_{}", self.entity, role)
                };
                JoinColumn::new(name.to_lowercase(), id.name.clone())
            })
            .collect()
    }
}

/// A local foreign-key column and the target column it references
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinColumn {
    /// Local column name
    pub name: String,
    /// Column on the target table
    pub referenced_column: String,
    pub nullable: bool,
    pub on_delete: Option<ForeignKeyAction>,
}

impl JoinColumn {
    /// Create a nullable join column
    pub fn new(name: impl Into<String>, referenced_column: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            referenced_column: referenced_column.into(),
            nullable: true,
            on_delete: None,
        }
    }

    /// Builder: disallow NULL
    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    /// Builder: set the ON DELETE action
    pub fn on_delete(mut self, action: ForeignKeyAction) -> Self {
        self.on_delete = Some(action);
        self
    }

    /// Physical definition of this column, typed after the referenced column.
    ///
    /// Returns `None` when `target` has no identifier column of that name.
    pub fn resolve(&self, target: &TargetRef) -> Option<ColumnDef> {
        target
            .identifier_column(&self.referenced_column)
            .map(|referenced| ColumnDef {
                name: self.name.clone(),
                quoted: false,
                column_type: referenced.column_type,
                nullable: self.nullable,
                length: referenced.length,
                precision: referenced.precision,
                scale: referenced.scale,
                unsigned: referenced.unsigned,
                auto_increment: false,
                unique: false,
                default: None,
            })
    }
}

/// Owning side of a many-to-one or one-to-one association
#[derive(Debug, Clone, PartialEq)]
pub struct ToOneAssociation {
    /// Name of the association on the owning type
    pub field: String,
    pub target: TargetRef,
    pub join_columns: Vec<JoinColumn>,
}

impl ToOneAssociation {
    /// Create an association with conventional `{field}_{id}` join columns
    pub fn new(field: impl Into<String>, target: TargetRef) -> Self {
        let field = field.into();
        let join_columns = target.prefixed_join_columns(&field);
        Self {
            field,
            target,
            join_columns,
        }
    }

    /// Builder: replace the join columns
    pub fn with_join_columns(mut self, join_columns: Vec<JoinColumn>) -> Self {
        self.join_columns = join_columns;
        self
    }

    /// Local foreign-key column names, in key order
    pub fn local_columns(&self) -> Vec<String> {
        self.join_columns.iter().map(|j| j.name.clone()).collect()
    }

    /// Referenced target column names, in key order
    pub fn referenced_columns(&self) -> Vec<String> {
        self.join_columns
            .iter()
            .map(|j| j.referenced_column.clone())
            .collect()
    }

    /// ON DELETE action; taken from the first join column
    pub fn on_delete(&self) -> Option<ForeignKeyAction> {
        self.join_columns.first().and_then(|j| j.on_delete)
    }
}

/// Which side of a many-to-many declaration this is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssociationSide {
    /// Owns the join table
    Owning,
    /// Mapped by the owning side of the target
    Inverse,
}

/// One side of a many-to-many association.
///
/// `join_columns` always reference the declaring type's identifier and
/// `inverse_join_columns` always reference the target's. On the inverse side
/// this means the two lists are swapped relative to the owning declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct ManyToManyAssociation {
    pub field: String,
    pub side: AssociationSide,
    pub target: TargetRef,
    /// Join table name; defaults to `{owning_table}_{inverse_table}`
    pub join_table: Option<String>,
    pub join_columns: Vec<JoinColumn>,
    pub inverse_join_columns: Vec<JoinColumn>,
}

impl ManyToManyAssociation {
    /// Owning side of a many-to-many association
    pub fn owning(field: impl Into<String>, target: TargetRef) -> Self {
        Self::with_side(field, target, AssociationSide::Owning)
    }

    /// Inverse (mapped-by) side of a many-to-many association
    pub fn inverse(field: impl Into<String>, target: TargetRef) -> Self {
        Self::with_side(field, target, AssociationSide::Inverse)
    }

    fn with_side(field: impl Into<String>, target: TargetRef, side: AssociationSide) -> Self {
        Self {
            field: field.into(),
            side,
            target,
            join_table: None,
            join_columns: Vec::new(),
            inverse_join_columns: Vec::new(),
        }
    }

    /// Builder: set the join table name
    pub fn join_table(mut self, name: impl Into<String>) -> Self {
        self.join_table = Some(name.into());
        self
    }

    /// Builder: columns referencing the declaring type's identifier
    pub fn join_columns(mut self, columns: Vec<JoinColumn>) -> Self {
        self.join_columns = columns;
        self
    }

    /// Builder: columns referencing the target's identifier
    pub fn inverse_join_columns(mut self, columns: Vec<JoinColumn>) -> Self {
        self.inverse_join_columns = columns;
        self
    }

    pub fn is_owning(&self) -> bool {
        self.side == AssociationSide::Owning
    }
}

/// An association that contributes to the physical schema
#[derive(Debug, Clone, PartialEq)]
pub enum AssociationDef {
    ManyToOne(ToOneAssociation),
    /// Owning one-to-one; its join columns are unique
    OneToOne(ToOneAssociation),
    ManyToMany(ManyToManyAssociation),
}

impl AssociationDef {
    pub fn field(&self) -> &str {
        match self {
            AssociationDef::ManyToOne(a) | AssociationDef::OneToOne(a) => &a.field,
            AssociationDef::ManyToMany(a) => &a.field,
        }
    }

    pub fn target(&self) -> &TargetRef {
        match self {
            AssociationDef::ManyToOne(a) | AssociationDef::OneToOne(a) => &a.target,
            AssociationDef::ManyToMany(a) => &a.target,
        }
    }

    /// The to-one descriptor, if this association puts a column on its own table
    pub fn as_to_one(&self) -> Option<&ToOneAssociation> {
        match self {
            AssociationDef::ManyToOne(a) | AssociationDef::OneToOne(a) => Some(a),
            AssociationDef::ManyToMany(_) => None,
        }
    }

    pub fn is_unique(&self) -> bool {
        matches!(self, AssociationDef::OneToOne(_))
    }
}

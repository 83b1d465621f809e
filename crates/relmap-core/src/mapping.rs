//! Mapping metadata model
//!
//! Read-only descriptions of how one persistable type corresponds to one
//! relational table: its columns, identifier, constraints and associations.
//! A `ClassMapping` can only be obtained through `ClassMappingBuilder::build`,
//! which rejects structurally invalid descriptions up front.

mod association;
mod class_mapping;
mod column;


pub use association::{
    AssociationDef, AssociationSide, JoinColumn, ManyToManyAssociation, TargetRef, ToOneAssociation,
};
pub use class_mapping::{ClassMapping, ClassMappingBuilder, IndexDef, UniqueConstraint};
pub use column::{ColumnDef, ColumnType, DefaultValue, ForeignKeyAction};

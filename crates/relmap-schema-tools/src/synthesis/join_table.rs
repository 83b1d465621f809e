//! Many-to-many join table layout and identity

use relmap_core::{AssociationDef, ClassMapping, JoinColumn, ManyToManyAssociation, TargetRef};

/// One foreign-key side of a join table
#[derive(Debug, Clone)]
pub(crate) struct JoinTableSide {
    /// Table the join columns reference
    pub target: TargetRef,
    pub columns: Vec<JoinColumn>,
}

impl JoinTableSide {
    fn identity(&self) -> (String, Vec<String>) {
        let mut columns: Vec<String> = self.columns.iter().map(|c| c.name.clone()).collect();
        columns.sort();
        (self.target.table.clone(), columns)
    }
}

/// Physical shape of a join table, oriented from the owning side
#[derive(Debug, Clone)]
pub(crate) struct JoinTableLayout {
    pub name: String,
    /// Columns referencing the owning type
    pub owning: JoinTableSide,
    /// Columns referencing the inverse type
    pub inverse: JoinTableSide,
}

/// Order-independent identity of a join table, so the owning and inverse
/// declarations of one association collapse to a single key
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct JoinTableKey {
    name: String,
    sides: [(String, Vec<String>); 2],
}

impl JoinTableLayout {
    /// Layout for a many-to-many declared on `mapping`.
    ///
    /// Returns `None` only for an association whose join table name was
    /// never completed, which a built mapping rules out.
    pub fn of(mapping: &ClassMapping, many: &ManyToManyAssociation) -> Option<Self> {
        let name = many.join_table.clone()?;
        let local = JoinTableSide {
            target: mapping.as_target(),
            columns: many.join_columns.clone(),
        };
        let remote = JoinTableSide {
            target: many.target.clone(),
            columns: many.inverse_join_columns.clone(),
        };

        let (owning, inverse) = if many.is_owning() {
            (local, remote)
        } else {
            (remote, local)
        };

        Some(Self {
            name,
            owning,
            inverse,
        })
    }

    pub fn key(&self) -> JoinTableKey {
        let mut sides = [self.owning.identity(), self.inverse.identity()];
        sides.sort();
        JoinTableKey {
            name: self.name.clone(),
            sides,
        }
    }
}

/// Whether some mapping in `mappings` owns the many-to-many that the inverse
/// declaration `many` on `mapping` refers to.
///
/// The owning declaration must describe the same join table, so an inverse
/// whose owner is a different association between the same two tables is
/// still reported as unowned.
pub(crate) fn has_owner_in(
    mappings: &[ClassMapping],
    mapping: &ClassMapping,
    many: &ManyToManyAssociation,
) -> bool {
    let Some(wanted) = JoinTableLayout::of(mapping, many).map(|layout| layout.key()) else {
        return false;
    };
    mappings
        .iter()
        .filter(|candidate| candidate.qualified_name() == many.target.table)
        .any(|candidate| {
            candidate.associations().iter().any(|association| match association {
                AssociationDef::ManyToMany(owner) if owner.is_owning() => {
                    JoinTableLayout::of(candidate, owner)
                        .is_some_and(|layout| layout.key() == wanted)
                }
                _ => false,
            })
        })
}

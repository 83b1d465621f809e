//! Event payloads passed to listeners alongside the entity

use std::collections::BTreeMap;

use crate::{FieldSnapshot, FieldValue, LifecyclePhase};

/// Context for phases that carry no extra data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifecycleEventArgs {
    pub entity_type: String,
    pub phase: LifecyclePhase,
}

impl LifecycleEventArgs {
    pub fn new(entity_type: impl Into<String>, phase: LifecyclePhase) -> Self {
        Self {
            entity_type: entity_type.into(),
            phase,
        }
    }
}

/// Work scheduled for the flush that is about to run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PendingChanges {
    pub inserts: usize,
    pub updates: usize,
    pub deletes: usize,
}

impl PendingChanges {
    pub fn is_empty(&self) -> bool {
        self.inserts == 0 && self.updates == 0 && self.deletes == 0
    }
}

/// Context for `preFlush`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreFlushEventArgs {
    pub entity_type: String,
    pub pending: PendingChanges,
}

/// Old and new value of one changed field
#[derive(Debug, Clone, PartialEq)]
pub struct FieldChange {
    pub old: FieldValue,
    pub new: FieldValue,
}

/// Changed fields keyed by field name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangeSet {
    changes: BTreeMap<String, FieldChange>,
}

impl ChangeSet {
    /// Fields whose value differs between two snapshots. A field present on
    /// one side only is compared against `Null`.
    pub fn between(before: &FieldSnapshot, after: &FieldSnapshot) -> Self {
        let mut changes = BTreeMap::new();
        for (field, old) in before {
            let new = after.get(field).cloned().unwrap_or(FieldValue::Null);
            if *old != new {
                changes.insert(
                    field.clone(),
                    FieldChange {
                        old: old.clone(),
                        new,
                    },
                );
            }
        }
        for (field, new) in after {
            if !before.contains_key(field) && *new != FieldValue::Null {
                changes.insert(
                    field.clone(),
                    FieldChange {
                        old: FieldValue::Null,
                        new: new.clone(),
                    },
                );
            }
        }
        Self { changes }
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn get(&self, field: &str) -> Option<&FieldChange> {
        self.changes.get(field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldChange)> {
        self.changes.iter().map(|(field, change)| (field.as_str(), change))
    }
}

/// Context for `preUpdate`: the fields about to be written
#[derive(Debug, Clone, PartialEq)]
pub struct PreUpdateEventArgs {
    pub entity_type: String,
    change_set: ChangeSet,
}

impl PreUpdateEventArgs {
    pub fn new(entity_type: impl Into<String>, change_set: ChangeSet) -> Self {
        Self {
            entity_type: entity_type.into(),
            change_set,
        }
    }

    pub fn change_set(&self) -> &ChangeSet {
        &self.change_set
    }

    pub fn has_changed_field(&self, field: &str) -> bool {
        self.change_set.get(field).is_some()
    }

    pub fn old_value(&self, field: &str) -> Option<&FieldValue> {
        self.change_set.get(field).map(|change| &change.old)
    }

    pub fn new_value(&self, field: &str) -> Option<&FieldValue> {
        self.change_set.get(field).map(|change| &change.new)
    }

    /// Changed field names in name order
    pub fn changed_fields(&self) -> Vec<&str> {
        self.change_set.iter().map(|(field, _)| field).collect()
    }
}

/// A lifecycle event: the phase together with its payload
#[derive(Debug, Clone, PartialEq)]
pub enum LifecycleEvent {
    PrePersist(LifecycleEventArgs),
    PostPersist(LifecycleEventArgs),
    PreFlush(PreFlushEventArgs),
    PreUpdate(PreUpdateEventArgs),
    PostUpdate(LifecycleEventArgs),
    PreRemove(LifecycleEventArgs),
    PostRemove(LifecycleEventArgs),
    PostLoad(LifecycleEventArgs),
}

impl LifecycleEvent {
    /// Event for one of the phases whose payload is `LifecycleEventArgs`.
    ///
    /// Returns `None` for `PreFlush` and `PreUpdate`, which need their own
    /// payloads.
    pub fn lifecycle(entity_type: &str, phase: LifecyclePhase) -> Option<Self> {
        let args = LifecycleEventArgs::new(entity_type, phase);
        let event = match phase {
            LifecyclePhase::PrePersist => LifecycleEvent::PrePersist(args),
            LifecyclePhase::PostPersist => LifecycleEvent::PostPersist(args),
            LifecyclePhase::PostUpdate => LifecycleEvent::PostUpdate(args),
            LifecyclePhase::PreRemove => LifecycleEvent::PreRemove(args),
            LifecyclePhase::PostRemove => LifecycleEvent::PostRemove(args),
            LifecyclePhase::PostLoad => LifecycleEvent::PostLoad(args),
            LifecyclePhase::PreFlush | LifecyclePhase::PreUpdate => return None,
        };
        Some(event)
    }

    pub fn pre_flush(entity_type: &str, pending: PendingChanges) -> Self {
        LifecycleEvent::PreFlush(PreFlushEventArgs {
            entity_type: entity_type.to_string(),
            pending,
        })
    }

    pub fn pre_update(entity_type: &str, change_set: ChangeSet) -> Self {
        LifecycleEvent::PreUpdate(PreUpdateEventArgs::new(entity_type, change_set))
    }

    pub fn phase(&self) -> LifecyclePhase {
        match self {
            LifecycleEvent::PrePersist(_) => LifecyclePhase::PrePersist,
            LifecycleEvent::PostPersist(_) => LifecyclePhase::PostPersist,
            LifecycleEvent::PreFlush(_) => LifecyclePhase::PreFlush,
            LifecycleEvent::PreUpdate(_) => LifecyclePhase::PreUpdate,
            LifecycleEvent::PostUpdate(_) => LifecyclePhase::PostUpdate,
            LifecycleEvent::PreRemove(_) => LifecyclePhase::PreRemove,
            LifecycleEvent::PostRemove(_) => LifecyclePhase::PostRemove,
            LifecycleEvent::PostLoad(_) => LifecyclePhase::PostLoad,
        }
    }
}

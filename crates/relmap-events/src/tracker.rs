//! Entity state tracking
//!
//! `LifecycleTracker` moves entities through
//! new → pendingPersist → managed → pendingRemove → removed and fires the
//! lifecycle events attached to each transition. Writing to storage is left to
//! an `EntityWriter`.

use std::sync::Arc;

use indexmap::IndexMap;

use crate::{
    ChangeSet, DispatchError, EntityHandle, FieldSnapshot, FlushError, LifecycleEvent,
    LifecycleEventArgs, LifecyclePhase, ListenerRegistry, PendingChanges,
};

#[cfg(test)]
mod tests;

/// Where a tracked entity is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityState {
    /// Scheduled for insertion by the next flush
    PendingPersist,
    /// Persisted; updates are detected against the last snapshot
    Managed,
    /// Scheduled for deletion by the next flush
    PendingRemove,
}

/// Storage side of a flush
#[allow(unused_variables)]
pub trait EntityWriter: Send + Sync {
    fn insert(&self, entity: &EntityHandle) -> anyhow::Result<()> {
        Ok(())
    }

    fn update(&self, entity: &EntityHandle, changes: &ChangeSet) -> anyhow::Result<()> {
        Ok(())
    }

    fn delete(&self, entity: &EntityHandle) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Writer that accepts every operation and stores nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopWriter;

impl EntityWriter for NoopWriter {}

/// Counts of the writes performed by one flush
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushSummary {
    pub inserted: usize,
    pub updated: usize,
    pub deleted: usize,
}

struct TrackedEntity {
    entity: EntityHandle,
    state: EntityState,
    snapshot: Option<FieldSnapshot>,
}

/// Identity of an entity: the address of its shared allocation
fn identity(entity: &EntityHandle) -> usize {
    Arc::as_ptr(entity) as *const () as usize
}

/// Minimal driver of entity lifecycle transitions.
///
/// Entities are tracked in the order they were first seen, and every flush
/// stage processes them in that order.
pub struct LifecycleTracker {
    registry: Arc<ListenerRegistry>,
    writer: Box<dyn EntityWriter>,
    entities: IndexMap<usize, TrackedEntity>,
}

impl LifecycleTracker {
    pub fn new(registry: Arc<ListenerRegistry>) -> Self {
        Self::with_writer(registry, NoopWriter)
    }

    pub fn with_writer(
        registry: Arc<ListenerRegistry>,
        writer: impl EntityWriter + 'static,
    ) -> Self {
        Self {
            registry,
            writer: Box::new(writer),
            entities: IndexMap::new(),
        }
    }

    pub fn registry(&self) -> &Arc<ListenerRegistry> {
        &self.registry
    }

    pub fn state_of(&self, entity: &EntityHandle) -> Option<EntityState> {
        self.entities.get(&identity(entity)).map(|tracked| tracked.state)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Schedule a new entity for insertion, firing `prePersist`.
    ///
    /// A pending or managed entity is left as is. A pending removal is
    /// cancelled without dispatch. If a listener fails the entity stays
    /// untracked.
    pub fn persist(&mut self, entity: &EntityHandle) -> Result<(), DispatchError> {
        let key = identity(entity);
        if let Some(tracked) = self.entities.get_mut(&key) {
            if tracked.state == EntityState::PendingRemove {
                tracked.state = EntityState::Managed;
            }
            return Ok(());
        }

        self.fire(entity, LifecyclePhase::PrePersist, LifecycleEvent::PrePersist)?;
        self.entities.insert(
            key,
            TrackedEntity {
                entity: entity.clone(),
                state: EntityState::PendingPersist,
                snapshot: None,
            },
        );
        tracing::debug!(entity_type = entity.entity_type(), "entity scheduled for insert");
        Ok(())
    }

    /// Schedule a managed entity for deletion, firing `preRemove`.
    ///
    /// A pending insert is cancelled without dispatch. Untracked entities and
    /// pending removals are ignored.
    pub fn remove(&mut self, entity: &EntityHandle) -> Result<(), DispatchError> {
        let key = identity(entity);
        match self.entities.get(&key).map(|tracked| tracked.state) {
            None | Some(EntityState::PendingRemove) => Ok(()),
            Some(EntityState::PendingPersist) => {
                self.entities.shift_remove(&key);
                tracing::debug!(
                    entity_type = entity.entity_type(),
                    "pending insert cancelled"
                );
                Ok(())
            }
            Some(EntityState::Managed) => {
                self.fire(entity, LifecyclePhase::PreRemove, LifecycleEvent::PreRemove)?;
                if let Some(tracked) = self.entities.get_mut(&key) {
                    tracked.state = EntityState::PendingRemove;
                }
                Ok(())
            }
        }
    }

    /// Track an entity hydrated from storage, firing `postLoad`.
    ///
    /// An entity that is already tracked keeps its state, so a scheduled
    /// removal survives a reload; only its snapshot is refreshed.
    pub fn load(&mut self, entity: &EntityHandle) -> Result<(), DispatchError> {
        let snapshot = Some(entity.snapshot());
        match self.entities.get_mut(&identity(entity)) {
            Some(tracked) => {
                tracing::trace!(
                    entity_type = %entity.entity_type(),
                    state = ?tracked.state,
                    "reloaded tracked entity"
                );
                tracked.snapshot = snapshot;
            }
            None => {
                self.entities.insert(
                    identity(entity),
                    TrackedEntity {
                        entity: entity.clone(),
                        state: EntityState::Managed,
                        snapshot,
                    },
                );
            }
        }
        self.fire(entity, LifecyclePhase::PostLoad, LifecycleEvent::PostLoad)
    }

    /// Write every scheduled change, firing the flush-time events.
    ///
    /// Stages run in order: `preFlush`, inserts with `postPersist`, updates
    /// with `preUpdate`/`postUpdate`, deletes with `postRemove`. The first
    /// error aborts the flush; stages already completed stay applied.
    pub fn flush(&mut self) -> Result<FlushSummary, FlushError> {
        let pending = self.pending_changes();
        tracing::debug!(
            inserts = pending.inserts,
            updates = pending.updates,
            deletes = pending.deletes,
            "flushing tracked entities"
        );

        for entity in self.handles_where(|state| state != EntityState::PendingRemove) {
            let event = LifecycleEvent::pre_flush(entity.entity_type(), pending);
            self.registry.dispatch(&entity, &event)?;
        }

        // Only entities managed before this flush are checked for updates.
        let managed = self.handles_where(|state| state == EntityState::Managed);
        let mut summary = FlushSummary::default();

        for entity in self.handles_where(|state| state == EntityState::PendingPersist) {
            self.writer
                .insert(&entity)
                .map_err(|source| write_error("insert", &entity, source))?;
            self.mark_written(&entity, EntityState::Managed);
            summary.inserted += 1;
            self.fire(&entity, LifecyclePhase::PostPersist, LifecycleEvent::PostPersist)?;
        }

        for entity in managed {
            let changes = self.changes_of(&entity);
            if changes.is_empty() {
                continue;
            }
            self.registry
                .dispatch(&entity, &LifecycleEvent::pre_update(entity.entity_type(), changes))?;

            // Pick up values assigned by preUpdate listeners.
            let changes = self.changes_of(&entity);
            self.writer
                .update(&entity, &changes)
                .map_err(|source| write_error("update", &entity, source))?;
            self.mark_written(&entity, EntityState::Managed);
            summary.updated += 1;
            self.fire(&entity, LifecyclePhase::PostUpdate, LifecycleEvent::PostUpdate)?;
        }

        for entity in self.handles_where(|state| state == EntityState::PendingRemove) {
            self.writer
                .delete(&entity)
                .map_err(|source| write_error("delete", &entity, source))?;
            self.entities.shift_remove(&identity(&entity));
            summary.deleted += 1;
            self.fire(&entity, LifecyclePhase::PostRemove, LifecycleEvent::PostRemove)?;
        }

        tracing::debug!(
            inserted = summary.inserted,
            updated = summary.updated,
            deleted = summary.deleted,
            "flush complete"
        );
        Ok(summary)
    }

    fn fire(
        &self,
        entity: &EntityHandle,
        phase: LifecyclePhase,
        wrap: fn(LifecycleEventArgs) -> LifecycleEvent,
    ) -> Result<(), DispatchError> {
        let event = wrap(LifecycleEventArgs::new(entity.entity_type(), phase));
        self.registry.dispatch(entity, &event)
    }

    fn pending_changes(&self) -> PendingChanges {
        let mut pending = PendingChanges::default();
        for tracked in self.entities.values() {
            match tracked.state {
                EntityState::PendingPersist => pending.inserts += 1,
                EntityState::PendingRemove => pending.deletes += 1,
                EntityState::Managed => {
                    if !self.changes_of(&tracked.entity).is_empty() {
                        pending.updates += 1;
                    }
                }
            }
        }
        pending
    }

    fn handles_where(&self, predicate: impl Fn(EntityState) -> bool) -> Vec<EntityHandle> {
        self.entities
            .values()
            .filter(|tracked| predicate(tracked.state))
            .map(|tracked| tracked.entity.clone())
            .collect()
    }

    fn changes_of(&self, entity: &EntityHandle) -> ChangeSet {
        match self
            .entities
            .get(&identity(entity))
            .and_then(|tracked| tracked.snapshot.as_ref())
        {
            Some(snapshot) => ChangeSet::between(snapshot, &entity.snapshot()),
            None => ChangeSet::default(),
        }
    }

    fn mark_written(&mut self, entity: &EntityHandle, state: EntityState) {
        if let Some(tracked) = self.entities.get_mut(&identity(entity)) {
            tracked.state = state;
            tracked.snapshot = Some(entity.snapshot());
        }
    }
}

fn write_error(
    operation: &'static str,
    entity: &EntityHandle,
    source: anyhow::Error,
) -> FlushError {
    FlushError::Write {
        operation,
        entity_type: entity.entity_type().to_string(),
        source,
    }
}

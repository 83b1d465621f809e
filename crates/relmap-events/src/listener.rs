//! Entity listener trait

use crate::{
    EntityHandle, LifecycleEvent, LifecycleEventArgs, PreFlushEventArgs, PreUpdateEventArgs,
};

/// Callbacks invoked at lifecycle phases of the entity types a listener is
/// registered for.
///
/// Every method defaults to doing nothing, so a listener only implements the
/// phases it cares about. Returning an error aborts the remaining listeners
/// for that phase and the operation that triggered it.
#[allow(unused_variables)]
pub trait EntityListener: Send + Sync {
    fn pre_persist(&self, entity: &EntityHandle, args: &LifecycleEventArgs) -> anyhow::Result<()> {
        Ok(())
    }

    fn post_persist(&self, entity: &EntityHandle, args: &LifecycleEventArgs) -> anyhow::Result<()> {
        Ok(())
    }

    fn pre_flush(&self, entity: &EntityHandle, args: &PreFlushEventArgs) -> anyhow::Result<()> {
        Ok(())
    }

    fn pre_update(&self, entity: &EntityHandle, args: &PreUpdateEventArgs) -> anyhow::Result<()> {
        Ok(())
    }

    fn post_update(&self, entity: &EntityHandle, args: &LifecycleEventArgs) -> anyhow::Result<()> {
        Ok(())
    }

    fn pre_remove(&self, entity: &EntityHandle, args: &LifecycleEventArgs) -> anyhow::Result<()> {
        Ok(())
    }

    fn post_remove(&self, entity: &EntityHandle, args: &LifecycleEventArgs) -> anyhow::Result<()> {
        Ok(())
    }

    fn post_load(&self, entity: &EntityHandle, args: &LifecycleEventArgs) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Route `event` to the matching method of `listener`
pub(crate) fn invoke(
    listener: &dyn EntityListener,
    entity: &EntityHandle,
    event: &LifecycleEvent,
) -> anyhow::Result<()> {
    match event {
        LifecycleEvent::PrePersist(args) => listener.pre_persist(entity, args),
        LifecycleEvent::PostPersist(args) => listener.post_persist(entity, args),
        LifecycleEvent::PreFlush(args) => listener.pre_flush(entity, args),
        LifecycleEvent::PreUpdate(args) => listener.pre_update(entity, args),
        LifecycleEvent::PostUpdate(args) => listener.post_update(entity, args),
        LifecycleEvent::PreRemove(args) => listener.pre_remove(entity, args),
        LifecycleEvent::PostRemove(args) => listener.post_remove(entity, args),
        LifecycleEvent::PostLoad(args) => listener.post_load(entity, args),
    }
}

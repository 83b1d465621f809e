//! Listener registry: maps (entity type, phase) to resolved listeners

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::listener::invoke;
use crate::{
    DispatchError, EntityHandle, EntityListener, LifecycleEvent, LifecyclePhase, ListenerRef,
    ListenerResolver, ResolveError,
};


/// A listener instance together with the reference it was resolved from
#[derive(Clone)]
pub struct ResolvedListener {
    pub reference: ListenerRef,
    pub listener: Arc<dyn EntityListener>,
}

impl fmt::Debug for ResolvedListener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedListener")
            .field("reference", &self.reference)
            .finish_non_exhaustive()
    }
}

type RegistryKey = (String, LifecyclePhase);

/// Collects listener declarations before they are resolved
#[derive(Debug, Default, Clone)]
pub struct ListenerRegistryBuilder {
    declarations: IndexMap<RegistryKey, Vec<ListenerRef>>,
}

impl ListenerRegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare `reference` as a listener for `phase` of `entity_type`
    pub fn register(
        mut self,
        entity_type: impl Into<String>,
        phase: LifecyclePhase,
        reference: impl Into<ListenerRef>,
    ) -> Self {
        self.declarations
            .entry((entity_type.into(), phase))
            .or_default()
            .push(reference.into());
        self
    }

    /// Declare `reference` for several phases of the same entity type
    pub fn register_phases(
        mut self,
        entity_type: impl Into<String>,
        phases: &[LifecyclePhase],
        reference: impl Into<ListenerRef>,
    ) -> Self {
        let entity_type = entity_type.into();
        let reference = reference.into();
        for phase in phases {
            self = self.register(entity_type.clone(), *phase, reference.clone());
        }
        self
    }

    /// Resolve every declared reference and freeze the registry.
    ///
    /// Each distinct reference is resolved once; all declarations naming it
    /// share that instance.
    pub fn build(self, resolver: &dyn ListenerResolver) -> Result<ListenerRegistry, ResolveError> {
        let mut resolved: HashMap<ListenerRef, Arc<dyn EntityListener>> = HashMap::new();
        let mut listeners = IndexMap::with_capacity(self.declarations.len());

        for (key, references) in self.declarations {
            let mut bound = Vec::with_capacity(references.len());
            for reference in references {
                let listener = match resolved.get(&reference) {
                    Some(listener) => listener.clone(),
                    None => {
                        let listener = resolver.resolve(&reference)?;
                        resolved.insert(reference.clone(), listener.clone());
                        listener
                    }
                };
                bound.push(ResolvedListener {
                    reference,
                    listener,
                });
            }
            listeners.insert(key, bound);
        }

        tracing::info!(
            bindings = listeners.len(),
            listeners = resolved.len(),
            "entity listener registry built"
        );
        Ok(ListenerRegistry { listeners })
    }
}

/// Immutable mapping from (entity type, phase) to listeners in declaration
/// order. Share it behind an `Arc`.
#[derive(Debug, Default)]
pub struct ListenerRegistry {
    listeners: IndexMap<RegistryKey, Vec<ResolvedListener>>,
}

impl ListenerRegistry {
    pub fn builder() -> ListenerRegistryBuilder {
        ListenerRegistryBuilder::new()
    }

    /// Registry with no listeners
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn listeners_for(&self, entity_type: &str, phase: LifecyclePhase) -> &[ResolvedListener] {
        self.listeners
            .get(&(entity_type.to_string(), phase))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn has_listeners(&self, entity_type: &str, phase: LifecyclePhase) -> bool {
        !self.listeners_for(entity_type, phase).is_empty()
    }

    /// Invoke the listeners registered for the entity's type and the event's
    /// phase, in order. The first failure stops dispatch.
    pub fn dispatch(
        &self,
        entity: &EntityHandle,
        event: &LifecycleEvent,
    ) -> Result<(), DispatchError> {
        let phase = event.phase();
        let entity_type = entity.entity_type();

        for resolved in self.listeners_for(entity_type, phase) {
            tracing::trace!(
                listener = %resolved.reference,
                entity_type,
                %phase,
                "dispatching lifecycle event"
            );
            invoke(resolved.listener.as_ref(), entity, event).map_err(|source| DispatchError {
                phase,
                entity_type: entity_type.to_string(),
                listener: resolved.reference.clone(),
                source,
            })?;
        }
        Ok(())
    }

    /// Release all listener instances held by the registry
    pub fn teardown(self) {
        tracing::debug!(bindings = self.listeners.len(), "tearing down entity listener registry");
        drop(self.listeners);
    }
}

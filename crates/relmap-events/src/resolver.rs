//! Listener resolution
//!
//! Registrations name listeners by reference. A resolver turns a reference
//! into the instance to invoke and must hand out the same instance for the
//! same reference for as long as it lives.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::{EntityListener, ResolveError};

/// Declared name of a listener
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerRef(String);

impl ListenerRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ListenerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ListenerRef {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for ListenerRef {
    fn from(name: String) -> Self {
        Self(name)
    }
}

pub trait ListenerResolver: Send + Sync {
    fn resolve(&self, reference: &ListenerRef) -> Result<Arc<dyn EntityListener>, ResolveError>;
}

type ListenerFactory = Box<dyn Fn() -> Arc<dyn EntityListener> + Send + Sync>;

/// Resolver backed by registered instances and lazily-invoked factories.
///
/// A factory runs at most once per reference; its product is cached and
/// returned for every later resolution until `clear` is called.
#[derive(Default)]
pub struct DefaultListenerResolver {
    instances: RwLock<HashMap<ListenerRef, Arc<dyn EntityListener>>>,
    factories: HashMap<ListenerRef, ListenerFactory>,
}

impl DefaultListenerResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a ready-made instance
    pub fn register(
        &mut self,
        reference: impl Into<ListenerRef>,
        listener: Arc<dyn EntityListener>,
    ) -> &mut Self {
        self.instances.write().insert(reference.into(), listener);
        self
    }

    /// Register a factory invoked on first resolution
    pub fn register_factory<F>(
        &mut self,
        reference: impl Into<ListenerRef>,
        factory: F,
    ) -> &mut Self
    where
        F: Fn() -> Arc<dyn EntityListener> + Send + Sync + 'static,
    {
        self.factories.insert(reference.into(), Box::new(factory));
        self
    }

    /// Forget cached instances; all of them when `reference` is `None`
    pub fn clear(&self, reference: Option<&ListenerRef>) {
        let mut instances = self.instances.write();
        match reference {
            Some(reference) => {
                instances.remove(reference);
            }
            None => instances.clear(),
        }
    }
}

impl ListenerResolver for DefaultListenerResolver {
    fn resolve(&self, reference: &ListenerRef) -> Result<Arc<dyn EntityListener>, ResolveError> {
        if let Some(listener) = self.instances.read().get(reference) {
            return Ok(listener.clone());
        }

        let factory = self
            .factories
            .get(reference)
            .ok_or_else(|| ResolveError::UnknownListener(reference.clone()))?;

        let mut instances = self.instances.write();
        let listener = instances
            .entry(reference.clone())
            .or_insert_with(|| {
                tracing::debug!(listener = %reference, "instantiating entity listener");
                factory()
            })
            .clone();
        Ok(listener)
    }
}

impl fmt::Debug for DefaultListenerResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DefaultListenerResolver")
            .field("instances", &self.instances.read().keys().collect::<Vec<_>>())
            .field("factories", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}

//! relmap Events - entity lifecycle event dispatch
//!
//! This crate provides:
//! - Lifecycle phases and their event payloads
//! - The `EntityListener` trait and listener resolution by reference
//! - A build-once `ListenerRegistry` that dispatches events in declaration order
//! - `LifecycleTracker`, which fires events as entities are persisted,
//!   updated, removed and loaded

mod args;
mod entity;
mod error;
mod listener;
mod phase;
pub mod registry;
pub mod resolver;
pub mod tracker;

pub use args::{
    ChangeSet, FieldChange, LifecycleEvent, LifecycleEventArgs, PendingChanges, PreFlushEventArgs,
    PreUpdateEventArgs,
};
pub use entity::{Entity, EntityHandle, FieldSnapshot, FieldValue, downcast};
pub use error::{DispatchError, FlushError, ResolveError};
pub use listener::EntityListener;
pub use phase::LifecyclePhase;
pub use registry::{ListenerRegistry, ListenerRegistryBuilder, ResolvedListener};
pub use resolver::{DefaultListenerResolver, ListenerRef, ListenerResolver};
pub use tracker::{EntityState, EntityWriter, FlushSummary, LifecycleTracker, NoopWriter};

use thiserror::Error;

use crate::{LifecyclePhase, ListenerRef};

/// A listener failed while handling a lifecycle phase
#[derive(Debug, Error)]
#[error("listener '{listener}' failed during {phase} of entity type '{entity_type}'")]
pub struct DispatchError {
    pub phase: LifecyclePhase,
    pub entity_type: String,
    pub listener: ListenerRef,
    #[source]
    pub source: anyhow::Error,
}

/// A listener reference could not be turned into an instance
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("no listener registered under '{0}'")]
    UnknownListener(ListenerRef),
}

/// Errors surfaced by `LifecycleTracker::flush`
#[derive(Debug, Error)]
pub enum FlushError {
    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    /// The entity writer rejected an operation
    #[error("{operation} of entity type '{entity_type}' failed")]
    Write {
        operation: &'static str,
        entity_type: String,
        #[source]
        source: anyhow::Error,
    },
}

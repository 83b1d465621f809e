//! Shared entity and listener fixtures
//!
//! `FixContract` is a fixed-price contract; `ContractListener` records every
//! callback it receives so tests can check what was dispatched and with which
//! entity.

#![allow(dead_code)]

use std::any::Any;
use std::sync::Arc;

use parking_lot::Mutex;
use relmap_events::{
    DefaultListenerResolver, Entity, EntityHandle, EntityListener, FieldSnapshot, FieldValue,
    LifecycleEvent, LifecycleEventArgs, LifecyclePhase, LifecycleTracker, ListenerRef,
    ListenerRegistry, ListenerResolver, PreFlushEventArgs, PreUpdateEventArgs,
};

pub const CONTRACT: &str = "FixContract";
pub const CONTRACT_LISTENER: &str = "contract_listener";

/// Route tracing output through the test harness
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("relmap_events=trace")
        .with_test_writer()
        .try_init();
}

pub struct FixContract {
    pub fix_price: Mutex<i64>,
    pub completed: Mutex<bool>,
}

impl FixContract {
    pub fn handle(fix_price: i64) -> EntityHandle {
        Arc::new(FixContract {
            fix_price: Mutex::new(fix_price),
            completed: Mutex::new(false),
        })
    }

    pub fn set_fix_price(entity: &EntityHandle, fix_price: i64) {
        let contract = relmap_events::downcast::<FixContract>(entity).unwrap();
        *contract.fix_price.lock() = fix_price;
    }
}

impl Entity for FixContract {
    fn entity_type(&self) -> &str {
        CONTRACT
    }

    fn snapshot(&self) -> FieldSnapshot {
        FieldSnapshot::from([
            ("completed".to_string(), FieldValue::from(*self.completed.lock())),
            ("fix_price".to_string(), FieldValue::from(*self.fix_price.lock())),
        ])
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// One callback received by `ContractListener`
#[derive(Clone)]
pub struct RecordedCall {
    pub entity: EntityHandle,
    pub event: LifecycleEvent,
}

#[derive(Default)]
pub struct ContractListener {
    calls: Mutex<Vec<RecordedCall>>,
    failing: Mutex<Option<LifecyclePhase>>,
}

impl ContractListener {
    pub fn calls(&self, phase: LifecyclePhase) -> Vec<RecordedCall> {
        self.calls
            .lock()
            .iter()
            .filter(|call| call.event.phase() == phase)
            .cloned()
            .collect()
    }

    /// Phases in the order they were received
    pub fn phases(&self) -> Vec<LifecyclePhase> {
        self.calls.lock().iter().map(|call| call.event.phase()).collect()
    }

    pub fn reset(&self) {
        self.calls.lock().clear();
    }

    pub fn fail_on(&self, phase: LifecyclePhase) {
        *self.failing.lock() = Some(phase);
    }

    fn record(&self, entity: &EntityHandle, event: LifecycleEvent) -> anyhow::Result<()> {
        let phase = event.phase();
        self.calls.lock().push(RecordedCall {
            entity: entity.clone(),
            event,
        });
        if *self.failing.lock() == Some(phase) {
            anyhow::bail!("contract listener rejected {phase}");
        }
        Ok(())
    }
}

impl EntityListener for ContractListener {
    fn pre_persist(&self, entity: &EntityHandle, args: &LifecycleEventArgs) -> anyhow::Result<()> {
        self.record(entity, LifecycleEvent::PrePersist(args.clone()))
    }

    fn post_persist(&self, entity: &EntityHandle, args: &LifecycleEventArgs) -> anyhow::Result<()> {
        self.record(entity, LifecycleEvent::PostPersist(args.clone()))
    }

    fn pre_flush(&self, entity: &EntityHandle, args: &PreFlushEventArgs) -> anyhow::Result<()> {
        self.record(entity, LifecycleEvent::PreFlush(args.clone()))
    }

    fn pre_update(&self, entity: &EntityHandle, args: &PreUpdateEventArgs) -> anyhow::Result<()> {
        self.record(entity, LifecycleEvent::PreUpdate(args.clone()))
    }

    fn post_update(&self, entity: &EntityHandle, args: &LifecycleEventArgs) -> anyhow::Result<()> {
        self.record(entity, LifecycleEvent::PostUpdate(args.clone()))
    }

    fn pre_remove(&self, entity: &EntityHandle, args: &LifecycleEventArgs) -> anyhow::Result<()> {
        self.record(entity, LifecycleEvent::PreRemove(args.clone()))
    }

    fn post_remove(&self, entity: &EntityHandle, args: &LifecycleEventArgs) -> anyhow::Result<()> {
        self.record(entity, LifecycleEvent::PostRemove(args.clone()))
    }

    fn post_load(&self, entity: &EntityHandle, args: &LifecycleEventArgs) -> anyhow::Result<()> {
        self.record(entity, LifecycleEvent::PostLoad(args.clone()))
    }
}

/// A tracker whose registry binds `ContractListener` to every phase of
/// `FixContract`, plus the listener instance the registry resolved.
pub struct Harness {
    pub tracker: LifecycleTracker,
    pub listener: Arc<ContractListener>,
    pub resolver: DefaultListenerResolver,
}

pub fn harness() -> Harness {
    init_tracing();

    let listener = Arc::new(ContractListener::default());
    let mut resolver = DefaultListenerResolver::new();
    resolver.register(CONTRACT_LISTENER, listener.clone());

    let registry = ListenerRegistry::builder()
        .register_phases(CONTRACT, &LifecyclePhase::ALL, CONTRACT_LISTENER)
        .build(&resolver)
        .unwrap();

    Harness {
        tracker: LifecycleTracker::new(Arc::new(registry)),
        listener,
        resolver,
    }
}

impl Harness {
    /// The listener instance as the resolver hands it out
    pub fn resolved_listener(&self) -> Arc<dyn EntityListener> {
        self.resolver
            .resolve(&ListenerRef::new(CONTRACT_LISTENER))
            .unwrap()
    }
}

use std::any::Any;

use parking_lot::Mutex;
use pretty_assertions::assert_eq;

use super::*;
use crate::{Entity, FieldValue};

struct Ticket {
    title: Mutex<String>,
}

impl Ticket {
    fn handle(title: &str) -> EntityHandle {
        Arc::new(Ticket {
            title: Mutex::new(title.to_string()),
        })
    }
}

impl Entity for Ticket {
    fn entity_type(&self) -> &str {
        "Ticket"
    }

    fn snapshot(&self) -> FieldSnapshot {
        FieldSnapshot::from([(
            "title".to_string(),
            FieldValue::from(self.title.lock().clone()),
        )])
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

fn retitle(entity: &EntityHandle, title: &str) {
    let ticket = crate::downcast::<Ticket>(entity).unwrap();
    *ticket.title.lock() = title.to_string();
}

/// Records writes; fails any operation named in `failing`
#[derive(Default)]
struct RecordingWriter {
    writes: Arc<Mutex<Vec<String>>>,
    failing: Option<&'static str>,
}

impl RecordingWriter {
    fn record(&self, operation: &'static str) -> anyhow::Result<()> {
        if self.failing == Some(operation) {
            anyhow::bail!("storage rejected {operation}");
        }
        self.writes.lock().push(operation.to_string());
        Ok(())
    }
}

impl EntityWriter for RecordingWriter {
    fn insert(&self, _entity: &EntityHandle) -> anyhow::Result<()> {
        self.record("insert")
    }

    fn update(&self, _entity: &EntityHandle, changes: &ChangeSet) -> anyhow::Result<()> {
        self.record("update")?;
        for (field, change) in changes.iter() {
            self.writes
                .lock()
                .push(format!("{field}: {} -> {}", change.old, change.new));
        }
        Ok(())
    }

    fn delete(&self, _entity: &EntityHandle) -> anyhow::Result<()> {
        self.record("delete")
    }
}

fn tracker() -> LifecycleTracker {
    LifecycleTracker::new(Arc::new(ListenerRegistry::empty()))
}

#[test]
fn test_persist_then_flush_makes_entity_managed() {
    let mut tracker = tracker();
    let ticket = Ticket::handle("Broken build");

    tracker.persist(&ticket).unwrap();
    assert_eq!(tracker.state_of(&ticket), Some(EntityState::PendingPersist));

    let summary = tracker.flush().unwrap();
    assert_eq!(
        summary,
        FlushSummary {
            inserted: 1,
            updated: 0,
            deleted: 0
        }
    );
    assert_eq!(tracker.state_of(&ticket), Some(EntityState::Managed));

    // Nothing changed since the insert.
    assert_eq!(tracker.flush().unwrap(), FlushSummary::default());
}

#[test]
fn test_remove_pending_insert_forgets_entity() {
    let mut tracker = tracker();
    let ticket = Ticket::handle("Typo");

    tracker.persist(&ticket).unwrap();
    tracker.remove(&ticket).unwrap();

    assert_eq!(tracker.state_of(&ticket), None);
    assert!(tracker.is_empty());
    assert_eq!(tracker.flush().unwrap(), FlushSummary::default());
}

#[test]
fn test_persist_cancels_pending_remove() {
    let mut tracker = tracker();
    let ticket = Ticket::handle("Flaky test");

    tracker.load(&ticket).unwrap();
    tracker.remove(&ticket).unwrap();
    assert_eq!(tracker.state_of(&ticket), Some(EntityState::PendingRemove));

    tracker.persist(&ticket).unwrap();
    assert_eq!(tracker.state_of(&ticket), Some(EntityState::Managed));
    assert_eq!(tracker.flush().unwrap(), FlushSummary::default());
}

#[test]
fn test_reload_keeps_scheduled_removal() {
    let writes = Arc::new(Mutex::new(Vec::new()));
    let writer = RecordingWriter {
        writes: writes.clone(),
        failing: None,
    };
    let mut tracker = LifecycleTracker::with_writer(Arc::new(ListenerRegistry::empty()), writer);
    let ticket = Ticket::handle("Stale");

    tracker.load(&ticket).unwrap();
    tracker.remove(&ticket).unwrap();
    tracker.load(&ticket).unwrap();
    assert_eq!(tracker.state_of(&ticket), Some(EntityState::PendingRemove));

    let summary = tracker.flush().unwrap();
    assert_eq!(summary.deleted, 1);
    assert_eq!(*writes.lock(), vec!["delete"]);
    assert_eq!(tracker.state_of(&ticket), None);
}

#[test]
fn test_identity_is_per_allocation() {
    let mut tracker = tracker();
    let first = Ticket::handle("Same title");
    let second = Ticket::handle("Same title");

    tracker.persist(&first).unwrap();
    tracker.persist(&first.clone()).unwrap();

    assert_eq!(tracker.len(), 1);
    assert_eq!(tracker.state_of(&second), None);
}

#[test]
fn test_writer_sees_changed_fields() {
    let writes = Arc::new(Mutex::new(Vec::new()));
    let writer = RecordingWriter {
        writes: writes.clone(),
        failing: None,
    };
    let mut tracker = LifecycleTracker::with_writer(Arc::new(ListenerRegistry::empty()), writer);
    let ticket = Ticket::handle("Draft");

    tracker.persist(&ticket).unwrap();
    tracker.flush().unwrap();
    retitle(&ticket, "Final");
    let summary = tracker.flush().unwrap();
    tracker.remove(&ticket).unwrap();
    tracker.flush().unwrap();

    assert_eq!(summary.updated, 1);
    assert_eq!(
        *writes.lock(),
        vec!["insert", "update", "title: 'Draft' -> 'Final'", "delete"]
    );
    assert_eq!(tracker.state_of(&ticket), None);
}

#[test]
fn test_writer_failure_aborts_flush() {
    let writer = RecordingWriter {
        writes: Arc::default(),
        failing: Some("insert"),
    };
    let mut tracker = LifecycleTracker::with_writer(Arc::new(ListenerRegistry::empty()), writer);
    let ticket = Ticket::handle("Outage");

    tracker.persist(&ticket).unwrap();
    let err = tracker.flush().unwrap_err();

    match err {
        FlushError::Write {
            operation,
            entity_type,
            source,
        } => {
            assert_eq!(operation, "insert");
            assert_eq!(entity_type, "Ticket");
            assert_eq!(source.to_string(), "storage rejected insert");
        }
        other => panic!("expected write error, got {other:?}"),
    }
    assert_eq!(tracker.state_of(&ticket), Some(EntityState::PendingPersist));
}

#[test]
fn test_change_set_between_snapshots() {
    let before = FieldSnapshot::from([
        ("status".to_string(), FieldValue::from("open")),
        ("priority".to_string(), FieldValue::from(2_i64)),
        ("assignee".to_string(), FieldValue::from("ana")),
    ]);
    let after = FieldSnapshot::from([
        ("status".to_string(), FieldValue::from("closed")),
        ("priority".to_string(), FieldValue::from(2_i64)),
        ("resolution".to_string(), FieldValue::from("fixed")),
    ]);

    let changes = ChangeSet::between(&before, &after);
    let fields: Vec<&str> = changes.iter().map(|(field, _)| field).collect();

    assert_eq!(fields, vec!["assignee", "resolution", "status"]);
    assert_eq!(changes.get("assignee").unwrap().new, FieldValue::Null);
    assert_eq!(changes.get("resolution").unwrap().old, FieldValue::Null);
    assert!(changes.get("priority").is_none());
}

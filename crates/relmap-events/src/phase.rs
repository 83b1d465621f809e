use std::fmt;

/// A named point in an entity's save, update, delete or load flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LifecyclePhase {
    PrePersist,
    PostPersist,
    PreFlush,
    PreUpdate,
    PostUpdate,
    PreRemove,
    PostRemove,
    PostLoad,
}

impl LifecyclePhase {
    pub const ALL: [LifecyclePhase; 8] = [
        LifecyclePhase::PrePersist,
        LifecyclePhase::PostPersist,
        LifecyclePhase::PreFlush,
        LifecyclePhase::PreUpdate,
        LifecyclePhase::PostUpdate,
        LifecyclePhase::PreRemove,
        LifecyclePhase::PostRemove,
        LifecyclePhase::PostLoad,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LifecyclePhase::PrePersist => "prePersist",
            LifecyclePhase::PostPersist => "postPersist",
            LifecyclePhase::PreFlush => "preFlush",
            LifecyclePhase::PreUpdate => "preUpdate",
            LifecyclePhase::PostUpdate => "postUpdate",
            LifecyclePhase::PreRemove => "preRemove",
            LifecyclePhase::PostRemove => "postRemove",
            LifecyclePhase::PostLoad => "postLoad",
        }
    }
}

impl fmt::Display for LifecyclePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

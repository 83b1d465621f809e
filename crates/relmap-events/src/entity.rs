//! Managed entity abstraction

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Persistent field value, as seen by change detection
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Null => f.write_str("NULL"),
            FieldValue::Bool(v) => write!(f, "{}", v),
            FieldValue::Integer(v) => write!(f, "{}", v),
            FieldValue::Float(v) => write!(f, "{}", v),
            FieldValue::Text(v) => write!(f, "'{}'", v),
        }
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Float(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(FieldValue::Null, Into::into)
    }
}

/// Field values keyed by field name, in name order
pub type FieldSnapshot = BTreeMap<String, FieldValue>;

/// An object whose lifecycle is tracked and announced to listeners.
///
/// Entities are shared as `EntityHandle`s; two handles denote the same entity
/// exactly when they point at the same allocation. Mutable state lives behind
/// interior mutability so handles can be shared with listeners.
pub trait Entity: Any + Send + Sync {
    /// Name under which listeners are registered for this entity
    fn entity_type(&self) -> &str;

    /// Current persistent field values.
    ///
    /// Compared against the snapshot taken at the last write to detect
    /// updates. The default reports no fields, so such entities never update.
    fn snapshot(&self) -> FieldSnapshot {
        FieldSnapshot::new()
    }

    fn as_any(&self) -> &dyn Any;
}

pub type EntityHandle = Arc<dyn Entity>;

/// Downcast a handle to its concrete entity type
pub fn downcast<T: Entity>(entity: &EntityHandle) -> Option<&T> {
    entity.as_any().downcast_ref::<T>()
}

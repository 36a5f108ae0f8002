use std::cmp::Ordering;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::BackendResult;

/// Immutable copy of the data at a database location.
#[derive(Clone, Debug, PartialEq)]
pub struct DataSnapshot {
    key: Option<String>,
    value: Value,
}

impl DataSnapshot {
    pub fn new(key: Option<String>, value: Value) -> Self {
        Self { key, value }
    }

    /// Last path segment of the location; `None` at the root.
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn into_value(self) -> Value {
        self.value
    }

    pub fn exists(&self) -> bool {
        !self.value.is_null()
    }

    pub fn children_count(&self) -> usize {
        match &self.value {
            Value::Object(map) => map.len(),
            Value::Array(items) => items.iter().filter(|item| !item.is_null()).count(),
            _ => 0,
        }
    }

    pub fn has_children(&self) -> bool {
        self.children_count() > 0
    }

    /// Direct children in database key order: integer-like keys first in
    /// numeric order, then the remaining keys lexicographically.
    pub fn children(&self) -> Vec<DataSnapshot> {
        children_of(&self.value)
            .into_iter()
            .map(|(key, value)| DataSnapshot::new(Some(key), value))
            .collect()
    }

    /// Serialized JSON of the value, `"null"` when nothing exists here.
    pub fn raw_json_value(&self) -> String {
        self.value.to_string()
    }
}

/// Orders keys the way the realtime database does.
pub(crate) fn compare_keys(left: &str, right: &str) -> Ordering {
    match (integer_key(left), integer_key(right)) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => left.cmp(right),
    }
}

fn integer_key(key: &str) -> Option<i32> {
    key.parse::<i32>()
        .ok()
        .filter(|parsed| parsed.to_string() == key)
}

pub(crate) fn children_of(value: &Value) -> Vec<(String, Value)> {
    let mut children: Vec<(String, Value)> = match value {
        Value::Object(map) => map
            .iter()
            .map(|(key, child)| (key.clone(), child.clone()))
            .collect(),
        Value::Array(items) => items
            .iter()
            .enumerate()
            .filter(|(_, child)| !child.is_null())
            .map(|(index, child)| (index.to_string(), child.clone()))
            .collect(),
        _ => Vec::new(),
    };
    children.sort_by(|(left, _), (right, _)| compare_keys(left, right));
    children
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    ChildAdded,
    ChildRemoved,
    ChildMoved,
    ChildChanged,
    ValueChanged,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChildListenerType {
    Added,
    Removed,
    Moved,
    Changed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ValueListenerType {
    Changed,
}

impl From<ChildListenerType> for EventType {
    fn from(kind: ChildListenerType) -> Self {
        match kind {
            ChildListenerType::Added => EventType::ChildAdded,
            ChildListenerType::Removed => EventType::ChildRemoved,
            ChildListenerType::Moved => EventType::ChildMoved,
            ChildListenerType::Changed => EventType::ChildChanged,
        }
    }
}

impl From<ValueListenerType> for EventType {
    fn from(kind: ValueListenerType) -> Self {
        match kind {
            ValueListenerType::Changed => EventType::ValueChanged,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ChildEvent {
    pub snapshot: DataSnapshot,
    /// Key of the sibling ordered immediately before this child, if any.
    pub previous_child_name: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ValueEvent {
    pub snapshot: DataSnapshot,
}

#[derive(Clone, Debug, PartialEq)]
pub enum DatabaseEvent {
    ChildAdded(ChildEvent),
    ChildRemoved(ChildEvent),
    ChildMoved(ChildEvent),
    ChildChanged(ChildEvent),
    ValueChanged(ValueEvent),
}

impl DatabaseEvent {
    pub fn event_type(&self) -> EventType {
        match self {
            DatabaseEvent::ChildAdded(_) => EventType::ChildAdded,
            DatabaseEvent::ChildRemoved(_) => EventType::ChildRemoved,
            DatabaseEvent::ChildMoved(_) => EventType::ChildMoved,
            DatabaseEvent::ChildChanged(_) => EventType::ChildChanged,
            DatabaseEvent::ValueChanged(_) => EventType::ValueChanged,
        }
    }

    pub fn snapshot(&self) -> &DataSnapshot {
        match self {
            DatabaseEvent::ChildAdded(event)
            | DatabaseEvent::ChildRemoved(event)
            | DatabaseEvent::ChildMoved(event)
            | DatabaseEvent::ChildChanged(event) => &event.snapshot,
            DatabaseEvent::ValueChanged(event) => &event.snapshot,
        }
    }
}

pub type DatabaseListener = Arc<dyn Fn(&DatabaseEvent) + Send + Sync>;

/// Handle to one database location.
#[async_trait]
pub trait DatabaseReference: Send + Sync {
    /// Canonical slash-separated path, empty at the root.
    fn path(&self) -> String;

    fn key(&self) -> Option<String>;

    async fn get_value(&self) -> BackendResult<DataSnapshot>;

    /// Writing `null` deletes the location.
    async fn set_value(&self, value: Value) -> BackendResult<()>;

    async fn set_raw_json_value(&self, raw: &str) -> BackendResult<()>;

    /// Multi-location update; keys are paths relative to this location.
    async fn update_children(&self, updates: Map<String, Value>) -> BackendResult<()>;

    async fn remove_value(&self) -> BackendResult<()>;

    /// Reference to a new child under a generated, chronologically ordered key.
    /// Nothing is written.
    fn push(&self) -> BackendResult<Arc<dyn DatabaseReference>>;

    fn add_listener(&self, event_type: EventType, listener: DatabaseListener);

    /// Drops one registration of `listener` for `event_type`, matched by
    /// identity. Returns whether one was found.
    fn remove_listener(&self, event_type: EventType, listener: &DatabaseListener) -> bool;

    fn listener_count(&self, event_type: EventType) -> usize;
}

pub trait DatabaseBackend: Send + Sync {
    fn reference(&self, path: &str) -> BackendResult<Arc<dyn DatabaseReference>>;

    /// Must be called before the first reference is resolved.
    fn set_persistence_enabled(&self, enabled: bool) -> BackendResult<()>;
}

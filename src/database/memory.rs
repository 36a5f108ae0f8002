use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Map, Value};

use crate::database::backend::{
    children_of, ChildEvent, DataSnapshot, DatabaseBackend, DatabaseEvent, DatabaseListener,
    DatabaseReference, EventType, ValueEvent,
};
use crate::database::push_id::next_push_id;
use crate::error::{invalid_argument, BackendError, BackendResult};
use crate::util::{segments, FaultQueue, ListenerSet};

type Callback = dyn Fn(&DatabaseEvent) + Send + Sync;
type ListenerKey = (String, EventType);

const FORBIDDEN_KEY_CHARS: &[char] = &['.', '#', '$', '[', ']'];

/// JSON tree store with value and child listeners.
///
/// Writes of `null` delete, and empty objects are pruned so that a location
/// exists exactly when it holds data. Listeners run synchronously after the
/// write has been applied and every lock released.
#[derive(Clone, Default)]
pub struct MemoryDatabase {
    inner: Arc<StoreInner>,
}

#[derive(Default)]
struct StoreInner {
    root: Mutex<Value>,
    listeners: Mutex<BTreeMap<ListenerKey, Arc<ListenerSet<Callback>>>>,
    persistence_enabled: AtomicBool,
    in_use: AtomicBool,
    faults: FaultQueue,
}

impl MemoryDatabase {
    pub fn persistence_enabled(&self) -> bool {
        self.inner.persistence_enabled.load(Ordering::SeqCst)
    }

    /// Current value at `path`, `Value::Null` when absent.
    pub fn value_at(&self, path: &str) -> Value {
        value_at_path(&self.inner.root(), &segments(path))
    }

    pub fn inject_fault(&self, error: BackendError) {
        self.inner.faults.push(error);
    }
}

impl DatabaseBackend for MemoryDatabase {
    fn reference(&self, path: &str) -> BackendResult<Arc<dyn DatabaseReference>> {
        let path = validate_path(path)?;
        self.inner.in_use.store(true, Ordering::SeqCst);
        Ok(Arc::new(MemoryReference {
            store: self.inner.clone(),
            path,
        }))
    }

    fn set_persistence_enabled(&self, enabled: bool) -> BackendResult<()> {
        if self.inner.in_use.load(Ordering::SeqCst) && self.persistence_enabled() != enabled {
            return Err(invalid_argument(
                "Persistence must be configured before the database is first used",
            ));
        }
        self.inner
            .persistence_enabled
            .store(enabled, Ordering::SeqCst);
        Ok(())
    }
}

impl StoreInner {
    fn root(&self) -> MutexGuard<'_, Value> {
        self.root
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn listeners(&self) -> MutexGuard<'_, BTreeMap<ListenerKey, Arc<ListenerSet<Callback>>>> {
        self.listeners
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn listener_set(&self, key: ListenerKey) -> Arc<ListenerSet<Callback>> {
        self.listeners().entry(key).or_default().clone()
    }

    fn registered_set(&self, key: &ListenerKey) -> Option<Arc<ListenerSet<Callback>>> {
        self.listeners().get(key).cloned()
    }

    #[cfg(test)]
    fn listener_slots(&self) -> usize {
        self.listeners().len()
    }

    /// Applies every write in order, then notifies listeners whose location
    /// changed.
    fn write(&self, writes: Vec<(Vec<String>, Value)>) {
        let changed: Vec<Vec<String>> = writes.iter().map(|(path, _)| path.clone()).collect();
        let (old_root, new_root) = {
            let mut root = self.root();
            let old_root = root.clone();
            for (path, value) in writes {
                write_at_path(&mut root, &path, value);
            }
            (old_root, root.clone())
        };
        self.dispatch(&changed, &old_root, &new_root);
    }

    fn dispatch(&self, changed: &[Vec<String>], old_root: &Value, new_root: &Value) {
        let affected: Vec<(Vec<String>, EventType, Vec<DatabaseListener>)> = self
            .listeners()
            .iter()
            .filter_map(|((path, event_type), set)| {
                let path = segments(path);
                if !changed.iter().any(|candidate| paths_related(&path, candidate)) {
                    return None;
                }
                let listeners = set.snapshot();
                (!listeners.is_empty()).then_some((path, *event_type, listeners))
            })
            .collect();

        for (path, event_type, listeners) in affected {
            let old_value = value_at_path(old_root, &path);
            let new_value = value_at_path(new_root, &path);
            if old_value == new_value {
                continue;
            }
            let events = events_for(&path, event_type, &old_value, &new_value);
            for listener in &listeners {
                for event in &events {
                    listener(event);
                }
            }
        }
    }
}

struct MemoryReference {
    store: Arc<StoreInner>,
    path: Vec<String>,
}

impl MemoryReference {
    fn listener_key(&self, event_type: EventType) -> ListenerKey {
        (self.path.join("/"), event_type)
    }
}

#[async_trait]
impl DatabaseReference for MemoryReference {
    fn path(&self) -> String {
        self.path.join("/")
    }

    fn key(&self) -> Option<String> {
        self.path.last().cloned()
    }

    async fn get_value(&self) -> BackendResult<DataSnapshot> {
        self.store.faults.check()?;
        let value = value_at_path(&self.store.root(), &self.path);
        Ok(DataSnapshot::new(self.key(), value))
    }

    async fn set_value(&self, value: Value) -> BackendResult<()> {
        self.store.faults.check()?;
        self.store.write(vec![(self.path.clone(), value)]);
        Ok(())
    }

    async fn set_raw_json_value(&self, raw: &str) -> BackendResult<()> {
        self.store.faults.check()?;
        let value: Value = serde_json::from_str(raw)?;
        self.store.write(vec![(self.path.clone(), value)]);
        Ok(())
    }

    async fn update_children(&self, updates: Map<String, Value>) -> BackendResult<()> {
        self.store.faults.check()?;
        let mut writes = Vec::with_capacity(updates.len());
        for (relative, value) in updates {
            let relative = validate_path(&relative)?;
            if relative.is_empty() {
                return Err(invalid_argument("Update keys must name a child location"));
            }
            let mut path = self.path.clone();
            path.extend(relative);
            writes.push((path, value));
        }
        self.store.write(writes);
        Ok(())
    }

    async fn remove_value(&self) -> BackendResult<()> {
        self.store.faults.check()?;
        self.store.write(vec![(self.path.clone(), Value::Null)]);
        Ok(())
    }

    fn push(&self) -> BackendResult<Arc<dyn DatabaseReference>> {
        let key = next_push_id(Utc::now().timestamp_millis().max(0) as u64);
        let mut path = self.path.clone();
        path.push(key);
        Ok(Arc::new(MemoryReference {
            store: self.store.clone(),
            path,
        }))
    }

    fn add_listener(&self, event_type: EventType, listener: DatabaseListener) {
        self.store
            .listener_set(self.listener_key(event_type))
            .add(listener.clone());

        // Initial state is delivered like a write from nothing.
        let current = value_at_path(&self.store.root(), &self.path);
        let events = match event_type {
            EventType::ValueChanged => vec![DatabaseEvent::ValueChanged(ValueEvent {
                snapshot: DataSnapshot::new(self.key(), current),
            })],
            EventType::ChildAdded => events_for(&self.path, event_type, &Value::Null, &current),
            _ => Vec::new(),
        };
        for event in &events {
            listener(event);
        }
    }

    fn remove_listener(&self, event_type: EventType, listener: &DatabaseListener) -> bool {
        self.store
            .registered_set(&self.listener_key(event_type))
            .is_some_and(|set| set.remove(listener))
    }

    fn listener_count(&self, event_type: EventType) -> usize {
        self.store
            .registered_set(&self.listener_key(event_type))
            .map_or(0, |set| set.len())
    }
}

fn validate_path(path: &str) -> BackendResult<Vec<String>> {
    let parts = segments(path);
    if let Some(bad) = parts
        .iter()
        .find(|part| part.contains(FORBIDDEN_KEY_CHARS) || part.chars().any(char::is_control))
    {
        return Err(invalid_argument(format!(
            "Invalid database path segment '{bad}' in '{path}'"
        )));
    }
    Ok(parts)
}

fn events_for(
    path: &[String],
    event_type: EventType,
    old_value: &Value,
    new_value: &Value,
) -> Vec<DatabaseEvent> {
    let key = path.last().cloned();
    match event_type {
        EventType::ValueChanged => vec![DatabaseEvent::ValueChanged(ValueEvent {
            snapshot: DataSnapshot::new(key, new_value.clone()),
        })],
        EventType::ChildAdded | EventType::ChildChanged | EventType::ChildRemoved => {
            child_events(event_type, old_value, new_value)
        }
        // Key order never changes on write, so nothing moves.
        EventType::ChildMoved => Vec::new(),
    }
}

fn child_events(event_type: EventType, old_value: &Value, new_value: &Value) -> Vec<DatabaseEvent> {
    let old_children = children_of(old_value);
    let new_children = children_of(new_value);
    let lookup = |children: &[(String, Value)], key: &str| {
        children
            .iter()
            .find(|(candidate, _)| candidate == key)
            .map(|(_, value)| value.clone())
    };

    let mut events = Vec::new();
    match event_type {
        EventType::ChildAdded => {
            for (index, (key, value)) in new_children.iter().enumerate() {
                if lookup(&old_children, key).is_none() {
                    events.push(DatabaseEvent::ChildAdded(child_event(
                        key,
                        value,
                        previous_key(&new_children, index),
                    )));
                }
            }
        }
        EventType::ChildChanged => {
            for (index, (key, value)) in new_children.iter().enumerate() {
                if matches!(lookup(&old_children, key), Some(old) if &old != value) {
                    events.push(DatabaseEvent::ChildChanged(child_event(
                        key,
                        value,
                        previous_key(&new_children, index),
                    )));
                }
            }
        }
        EventType::ChildRemoved => {
            for (index, (key, value)) in old_children.iter().enumerate() {
                if lookup(&new_children, key).is_none() {
                    events.push(DatabaseEvent::ChildRemoved(child_event(
                        key,
                        value,
                        previous_key(&old_children, index),
                    )));
                }
            }
        }
        _ => {}
    }
    events
}

fn child_event(key: &str, value: &Value, previous_child_name: Option<String>) -> ChildEvent {
    ChildEvent {
        snapshot: DataSnapshot::new(Some(key.to_string()), value.clone()),
        previous_child_name,
    }
}

fn previous_key(children: &[(String, Value)], index: usize) -> Option<String> {
    index
        .checked_sub(1)
        .and_then(|previous| children.get(previous))
        .map(|(key, _)| key.clone())
}

fn paths_related(a: &[String], b: &[String]) -> bool {
    is_prefix(a, b) || is_prefix(b, a)
}

fn is_prefix(prefix: &[String], path: &[String]) -> bool {
    if prefix.len() > path.len() {
        return false;
    }
    prefix
        .iter()
        .zip(path.iter())
        .all(|(left, right)| left == right)
}

/// Drops `null` members and empty containers, so a stored value never holds
/// an empty location. Arrays are stored as objects keyed by index.
fn normalize(value: Value) -> Value {
    let children: Vec<(String, Value)> = match value {
        Value::Object(map) => map.into_iter().collect(),
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(index, child)| (index.to_string(), child))
            .collect(),
        other => return other,
    };
    let pruned: Map<String, Value> = children
        .into_iter()
        .map(|(key, child)| (key, normalize(child)))
        .filter(|(_, child)| !child.is_null())
        .collect();
    if pruned.is_empty() {
        Value::Null
    } else {
        Value::Object(pruned)
    }
}

/// Read form of a stored value: objects whose keys are all indices, with
/// fewer than half of the slots up to the largest index empty, come back as
/// arrays with `null` in the gaps.
fn exported(value: Value) -> Value {
    let map = match value {
        Value::Object(map) => map,
        other => return other,
    };
    let children: Map<String, Value> = map
        .into_iter()
        .map(|(key, child)| (key, exported(child)))
        .collect();

    let mut indexed = Vec::with_capacity(children.len());
    for key in children.keys() {
        match key.parse::<usize>() {
            Ok(index) if index.to_string() == *key => indexed.push(index),
            _ => return Value::Object(children),
        }
    }
    let Some(&largest) = indexed.iter().max() else {
        return Value::Object(children);
    };
    if largest >= indexed.len() * 2 {
        return Value::Object(children);
    }

    let mut items = vec![Value::Null; largest + 1];
    for (index, (_, child)) in indexed.into_iter().zip(children) {
        items[index] = child;
    }
    Value::Array(items)
}

fn write_at_path(root: &mut Value, path: &[String], value: Value) {
    let value = normalize(value);
    if value.is_null() {
        delete_at_path(root, path);
    } else {
        set_at_path(root, path, value);
    }
}

fn set_at_path(node: &mut Value, path: &[String], value: Value) {
    let Some((first, rest)) = path.split_first() else {
        *node = value;
        return;
    };
    if !node.is_object() {
        *node = Value::Object(Map::new());
    }
    if let Value::Object(children) = node {
        let child = children.entry(first.clone()).or_insert(Value::Null);
        set_at_path(child, rest, value);
    }
}

fn delete_at_path(node: &mut Value, path: &[String]) {
    let Some((first, rest)) = path.split_first() else {
        *node = Value::Null;
        return;
    };
    let emptied = match node {
        Value::Object(children) => {
            if rest.is_empty() {
                children.remove(first);
            } else if let Some(child) = children.get_mut(first) {
                delete_at_path(child, rest);
                if child.is_null() {
                    children.remove(first);
                }
            }
            children.is_empty()
        }
        _ => false,
    };
    if emptied {
        *node = Value::Null;
    }
}

fn value_at_path(root: &Value, path: &[String]) -> Value {
    let mut current = root;
    for segment in path {
        match current.get(segment.as_str()) {
            Some(value) => current = value,
            None => return Value::Null,
        }
    }
    exported(current.clone())
}

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::config::Area;
use crate::database::backend::{DataSnapshot, DatabaseListener, DatabaseReference, EventType};
use crate::error::{internal_error, BackendResult};
use crate::extension::FirebaseExtension;
use crate::result::FirebaseResult;

const ROOT_PATH: &str = "/";

impl FirebaseExtension {
    /// Cached handle for `path`, resolved through the backend on first use.
    pub fn database_reference(&self, path: &str) -> FirebaseResult<Arc<dyn DatabaseReference>> {
        let outcome = self.reference(path);
        self.settle(Area::Database, "database_reference", path, outcome)
    }

    /// Registers `listener` for `event_type` at `path`. Accepts either a
    /// [`crate::database::ChildListenerType`] or a
    /// [`crate::database::ValueListenerType`].
    pub fn add_listener(
        &self,
        event_type: impl Into<EventType>,
        path: &str,
        listener: DatabaseListener,
    ) -> FirebaseResult {
        let event_type = event_type.into();
        let outcome = self
            .reference(path)
            .map(|reference| reference.add_listener(event_type, listener));
        self.settle(Area::Database, "add_listener", path, outcome)
    }

    /// Removes one registration of the same `Arc`. The payload reports
    /// whether a registration was found.
    pub fn remove_listener(
        &self,
        event_type: impl Into<EventType>,
        path: &str,
        listener: &DatabaseListener,
    ) -> FirebaseResult<bool> {
        let event_type = event_type.into();
        let outcome = self
            .reference(path)
            .map(|reference| reference.remove_listener(event_type, listener));
        self.settle(Area::Database, "remove_listener", path, outcome)
    }

    /// Whether data exists at `path`. Absence is a successful `false`.
    pub async fn check(&self, path: &str) -> FirebaseResult<bool> {
        let outcome = self.snapshot(path).await.map(|snapshot| snapshot.exists());
        self.settle(Area::Database, "check", path, outcome)
    }

    /// Key of a new child under `path`. Nothing is written.
    pub fn generate_instance_id(&self, path: &str) -> FirebaseResult<String> {
        let outcome = self.reference(path).and_then(|reference| {
            reference
                .push()?
                .key()
                .ok_or_else(|| internal_error("Pushed reference has no key"))
        });
        self.settle(Area::Database, "generate_instance_id", path, outcome)
    }

    pub async fn get_count(&self, path: &str) -> FirebaseResult<u64> {
        let outcome = self
            .snapshot(path)
            .await
            .map(|snapshot| snapshot.children_count() as u64);
        self.settle(Area::Database, "get_count", path, outcome)
    }

    /// Decodes the raw JSON at `path`. Absence is an empty success.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> FirebaseResult<T> {
        let outcome = self.snapshot(path).await.and_then(|snapshot| {
            if !snapshot.exists() {
                return Ok(None);
            }
            Ok(Some(serde_json::from_str::<T>(&snapshot.raw_json_value())?))
        });
        self.settle_optional(Area::Database, "get_json", path, outcome)
    }

    /// Decodes the raw JSON of every child in key order.
    pub async fn get_jsons<T: DeserializeOwned>(&self, path: &str) -> FirebaseResult<Vec<T>> {
        let outcome = self.snapshot(path).await.and_then(|snapshot| {
            collect_children(&snapshot, |child| {
                Ok(serde_json::from_str::<T>(&child.raw_json_value())?)
            })
        });
        self.settle_optional(Area::Database, "get_jsons", path, outcome)
    }

    pub async fn get_keys(&self, path: &str) -> FirebaseResult<Vec<String>> {
        let outcome = self.snapshot(path).await.and_then(|snapshot| {
            collect_children(&snapshot, |child| Ok(child.key().unwrap_or_default().to_string()))
        });
        self.settle_optional(Area::Database, "get_keys", path, outcome)
    }

    pub async fn get_key_jsons<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> FirebaseResult<BTreeMap<String, T>> {
        let outcome = self.snapshot(path).await.and_then(|snapshot| {
            let entries = collect_children(&snapshot, |child| {
                let key = child.key().unwrap_or_default().to_string();
                Ok((key, serde_json::from_str::<T>(&child.raw_json_value())?))
            })?;
            Ok(entries.map(|entries| entries.into_iter().collect::<BTreeMap<_, _>>()))
        });
        self.settle_optional(Area::Database, "get_key_jsons", path, outcome)
    }

    pub async fn get_key_values<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> FirebaseResult<BTreeMap<String, T>> {
        let outcome = self.snapshot(path).await.and_then(|snapshot| {
            let entries = collect_children(&snapshot, |child| {
                let key = child.key().unwrap_or_default().to_string();
                Ok((key, serde_json::from_value::<T>(child.into_value())?))
            })?;
            Ok(entries.map(|entries| entries.into_iter().collect::<BTreeMap<_, _>>()))
        });
        self.settle_optional(Area::Database, "get_key_values", path, outcome)
    }

    /// Converts the value at `path`. Absence is an empty success.
    pub async fn get_value<T: DeserializeOwned>(&self, path: &str) -> FirebaseResult<T> {
        let outcome = self.snapshot(path).await.and_then(|snapshot| {
            if !snapshot.exists() {
                return Ok(None);
            }
            Ok(Some(serde_json::from_value::<T>(snapshot.into_value())?))
        });
        self.settle_optional(Area::Database, "get_value", path, outcome)
    }

    pub async fn get_values<T: DeserializeOwned>(&self, path: &str) -> FirebaseResult<Vec<T>> {
        let outcome = self.snapshot(path).await.and_then(|snapshot| {
            collect_children(&snapshot, |child| {
                Ok(serde_json::from_value::<T>(child.into_value())?)
            })
        });
        self.settle_optional(Area::Database, "get_values", path, outcome)
    }

    pub async fn remove(&self, path: &str) -> FirebaseResult {
        let outcome = match self.reference(path) {
            Ok(reference) => reference.remove_value().await,
            Err(err) => Err(err),
        };
        self.settle(Area::Database, "remove", path, outcome)
    }

    /// Serializes `value` to JSON text and stores it as raw JSON.
    pub async fn set_json<T: Serialize + ?Sized>(&self, path: &str, value: &T) -> FirebaseResult {
        let outcome = match (self.reference(path), serde_json::to_string(value)) {
            (Ok(reference), Ok(raw)) => reference.set_raw_json_value(&raw).await,
            (Err(err), _) => Err(err),
            (_, Err(err)) => Err(err.into()),
        };
        self.settle(Area::Database, "set_json", path, outcome)
    }

    pub fn set_persistence_enabled(&self, enabled: bool) -> FirebaseResult {
        let outcome = self.database.set_persistence_enabled(enabled);
        let subject = if enabled { "on" } else { "off" };
        self.settle(Area::Database, "set_persistence_enabled", subject, outcome)
    }

    pub async fn set_value(&self, path: &str, value: impl Into<Value>) -> FirebaseResult {
        let value = value.into();
        let outcome = match self.reference(path) {
            Ok(reference) => reference.set_value(value).await,
            Err(err) => Err(err),
        };
        self.settle(Area::Database, "set_value", path, outcome)
    }

    /// Multi-location update applied at the root. Keys are absolute paths;
    /// `null` values delete.
    pub async fn set_values(&self, updates: Map<String, Value>) -> FirebaseResult {
        let outcome = match self.reference(ROOT_PATH) {
            Ok(reference) => reference.update_children(updates).await,
            Err(err) => Err(err),
        };
        self.settle(Area::Database, "set_values", ROOT_PATH, outcome)
    }

    fn reference(&self, path: &str) -> BackendResult<Arc<dyn DatabaseReference>> {
        self.references
            .get_or_resolve(path, |path| self.database.reference(path))
    }

    async fn snapshot(&self, path: &str) -> BackendResult<DataSnapshot> {
        self.reference(path)?.get_value().await
    }
}

/// Maps every child of `snapshot`; `None` when there are no children.
fn collect_children<T, F>(snapshot: &DataSnapshot, mut convert: F) -> BackendResult<Option<Vec<T>>>
where
    F: FnMut(DataSnapshot) -> BackendResult<T>,
{
    if !snapshot.has_children() {
        return Ok(None);
    }
    snapshot
        .children()
        .into_iter()
        .map(&mut convert)
        .collect::<BackendResult<Vec<T>>>()
        .map(Some)
}

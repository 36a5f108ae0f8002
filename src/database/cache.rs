use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::database::backend::DatabaseReference;
use crate::error::BackendResult;

/// Path to reference cache keyed by the literal path string. Entries live as
/// long as the cache; nothing is evicted.
#[derive(Default)]
pub struct ReferenceCache {
    references: Mutex<HashMap<String, Arc<dyn DatabaseReference>>>,
}

impl ReferenceCache {
    pub fn get_or_resolve<F>(&self, path: &str, resolve: F) -> BackendResult<Arc<dyn DatabaseReference>>
    where
        F: FnOnce(&str) -> BackendResult<Arc<dyn DatabaseReference>>,
    {
        let mut references = self
            .references
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(reference) = references.get(path) {
            return Ok(reference.clone());
        }
        let reference = resolve(path)?;
        references.insert(path.to_string(), reference.clone());
        Ok(reference)
    }

    pub fn len(&self) -> usize {
        self.references
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{DatabaseBackend, MemoryDatabase};

    #[test]
    fn identical_paths_share_a_handle() {
        let database = MemoryDatabase::default();
        let cache = ReferenceCache::default();
        let first = cache
            .get_or_resolve("players/1", |path| database.reference(path))
            .unwrap();
        let second = cache
            .get_or_resolve("players/1", |_| panic!("cached path resolved again"))
            .unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn distinct_paths_get_distinct_handles() {
        let database = MemoryDatabase::default();
        let cache = ReferenceCache::default();
        let first = cache
            .get_or_resolve("players/1", |path| database.reference(path))
            .unwrap();
        let second = cache
            .get_or_resolve("players/2", |path| database.reference(path))
            .unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(second.path(), "players/2");
    }

    #[test]
    fn failed_resolution_is_not_cached() {
        let database = MemoryDatabase::default();
        let cache = ReferenceCache::default();
        assert!(cache
            .get_or_resolve("bad.path", |path| database.reference(path))
            .is_err());
        assert!(cache.is_empty());
    }
}

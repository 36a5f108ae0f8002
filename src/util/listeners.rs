use std::sync::{Arc, Mutex};

/// Identity comparison for shared callbacks. Only the data pointer is
/// compared; vtable pointers are not stable across codegen units.
pub fn same_listener<T: ?Sized>(left: &Arc<T>, right: &Arc<T>) -> bool {
    std::ptr::eq(
        Arc::as_ptr(left) as *const (),
        Arc::as_ptr(right) as *const (),
    )
}

/// Callback registry keyed by `Arc` identity. Adding the same callback twice
/// registers it twice, mirroring multicast delegates; each removal drops one.
pub struct ListenerSet<T: ?Sized> {
    listeners: Mutex<Vec<Arc<T>>>,
}

impl<T: ?Sized> Default for ListenerSet<T> {
    fn default() -> Self {
        Self {
            listeners: Mutex::new(Vec::new()),
        }
    }
}

impl<T: ?Sized> ListenerSet<T> {
    pub fn add(&self, listener: Arc<T>) {
        self.lock().push(listener);
    }

    /// Returns whether a registration was removed.
    pub fn remove(&self, listener: &Arc<T>) -> bool {
        let mut listeners = self.lock();
        match listeners
            .iter()
            .rposition(|existing| same_listener(existing, listener))
        {
            Some(index) => {
                listeners.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clones the current registrations so callbacks run without the lock held.
    pub fn snapshot(&self) -> Vec<Arc<T>> {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Arc<T>>> {
        self.listeners
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Callback = dyn Fn(u32) + Send + Sync;

    #[test]
    fn remove_matches_by_identity() {
        let set: ListenerSet<Callback> = ListenerSet::default();
        let first: Arc<Callback> = Arc::new(|_| {});
        let second: Arc<Callback> = Arc::new(|_| {});

        set.add(first.clone());
        set.add(second.clone());
        assert_eq!(set.len(), 2);

        assert!(set.remove(&first));
        assert!(!set.remove(&first));
        assert_eq!(set.len(), 1);
        assert!(same_listener(&set.snapshot()[0], &second));
    }

    #[test]
    fn duplicate_registrations_need_matching_removals() {
        let set: ListenerSet<Callback> = ListenerSet::default();
        let listener: Arc<Callback> = Arc::new(|_| {});
        set.add(listener.clone());
        set.add(listener.clone());

        assert!(set.remove(&listener));
        assert_eq!(set.len(), 1);
        assert!(set.remove(&listener));
        assert!(set.is_empty());
    }
}

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::analytics::backend::{AnalyticsBackend, AnalyticsEvent};
use crate::error::{invalid_argument, BackendError, BackendResult};
use crate::util::FaultQueue;

const MAX_NAME_LENGTH: usize = 40;
const RESERVED_PREFIXES: [&str; 3] = ["firebase_", "google_", "ga_"];

/// Records logged events in memory instead of sending them.
#[derive(Debug)]
pub struct MemoryAnalytics {
    events: Mutex<Vec<AnalyticsEvent>>,
    collection_enabled: AtomicBool,
    faults: FaultQueue,
}

impl Default for MemoryAnalytics {
    fn default() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            collection_enabled: AtomicBool::new(true),
            faults: FaultQueue::default(),
        }
    }
}

impl MemoryAnalytics {
    pub fn recorded_events(&self) -> Vec<AnalyticsEvent> {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Disabled collection accepts events but drops them.
    pub fn set_collection_enabled(&self, enabled: bool) {
        self.collection_enabled.store(enabled, Ordering::SeqCst);
    }

    pub fn collection_enabled(&self) -> bool {
        self.collection_enabled.load(Ordering::SeqCst)
    }

    pub fn inject_fault(&self, error: BackendError) {
        self.faults.push(error);
    }
}

#[async_trait]
impl AnalyticsBackend for MemoryAnalytics {
    async fn log_event(&self, event: AnalyticsEvent) -> BackendResult<()> {
        self.faults.check()?;
        validate_name(&event.name, "Event")?;
        for name in event.params.keys() {
            validate_name(name, "Parameter")?;
        }
        if self.collection_enabled() {
            self.events
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .push(event);
        }
        Ok(())
    }
}

fn validate_name(name: &str, kind: &str) -> BackendResult<()> {
    if name.trim().is_empty() {
        return Err(invalid_argument(format!("{kind} name must not be empty")));
    }
    if name.len() > MAX_NAME_LENGTH {
        return Err(invalid_argument(format!(
            "{kind} name '{name}' is longer than {MAX_NAME_LENGTH} characters"
        )));
    }
    if !name.starts_with(|c: char| c.is_ascii_alphabetic()) {
        return Err(invalid_argument(format!(
            "{kind} name '{name}' must start with a letter"
        )));
    }
    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(invalid_argument(format!(
            "{kind} name '{name}' may only contain letters, digits and underscores"
        )));
    }
    if RESERVED_PREFIXES.iter().any(|prefix| name.starts_with(prefix)) {
        return Err(invalid_argument(format!(
            "{kind} name '{name}' uses a reserved prefix"
        )));
    }
    Ok(())
}

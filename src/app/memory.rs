use std::sync::Mutex;

use async_trait::async_trait;

use crate::app::backend::{AppBackend, DependencyStatus};
use crate::error::{BackendError, BackendResult};
use crate::util::FaultQueue;

/// In-memory dependency checker reporting a configurable status.
#[derive(Debug)]
pub struct MemoryApp {
    status: Mutex<DependencyStatus>,
    faults: FaultQueue,
}

impl Default for MemoryApp {
    fn default() -> Self {
        Self::with_status(DependencyStatus::Available)
    }
}

impl MemoryApp {
    pub fn with_status(status: DependencyStatus) -> Self {
        Self {
            status: Mutex::new(status),
            faults: FaultQueue::default(),
        }
    }

    pub fn set_status(&self, status: DependencyStatus) {
        *self
            .status
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = status;
    }

    pub fn inject_fault(&self, error: BackendError) {
        self.faults.push(error);
    }
}

#[async_trait]
impl AppBackend for MemoryApp {
    async fn check_and_fix_dependencies(&self) -> BackendResult<DependencyStatus> {
        self.faults.check()?;
        Ok(*self
            .status
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()))
    }
}

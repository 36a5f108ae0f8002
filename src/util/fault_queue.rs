use std::collections::VecDeque;
use std::sync::Mutex;

use crate::error::{BackendError, BackendResult};

/// Queue of faults an in-memory backend replays on its next calls.
#[derive(Debug, Default)]
pub struct FaultQueue {
    pending: Mutex<VecDeque<BackendError>>,
}

impl FaultQueue {
    pub fn push(&self, error: BackendError) {
        self.pending
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push_back(error);
    }

    /// Fails with the oldest queued fault, if any.
    pub fn check(&self) -> BackendResult<()> {
        match self
            .pending
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .pop_front()
        {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    pub fn len(&self) -> usize {
        self.pending
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

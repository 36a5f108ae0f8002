use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::error::{invalid_argument, not_found, BackendError, BackendResult};
use crate::functions::backend::{CallableResult, FunctionsBackend};
use crate::util::FaultQueue;

pub type CallableHandler = Arc<dyn Fn(Map<String, Value>) -> BackendResult<Value> + Send + Sync>;

/// Dispatches calls to handlers registered by name.
#[derive(Default)]
pub struct MemoryFunctions {
    handlers: Mutex<HashMap<String, CallableHandler>>,
    calls: Mutex<Vec<(String, Map<String, Value>)>>,
    faults: FaultQueue,
}

impl MemoryFunctions {
    pub fn register<F>(&self, name: impl Into<String>, handler: F)
    where
        F: Fn(Map<String, Value>) -> BackendResult<Value> + Send + Sync + 'static,
    {
        self.handlers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(name.into(), Arc::new(handler));
    }

    /// Every call received so far, including ones that failed.
    pub fn calls(&self) -> Vec<(String, Map<String, Value>)> {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn inject_fault(&self, error: BackendError) {
        self.faults.push(error);
    }
}

#[async_trait]
impl FunctionsBackend for MemoryFunctions {
    async fn call(&self, name: &str, data: Map<String, Value>) -> BackendResult<CallableResult> {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push((name.to_string(), data.clone()));
        self.faults.check()?;
        if name.is_empty() {
            return Err(invalid_argument("Callable name must not be empty"));
        }
        let handler = self
            .handlers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(name)
            .cloned()
            .ok_or_else(|| not_found(format!("No callable named '{name}'")))?;
        handler(data).map(CallableResult::new)
    }
}

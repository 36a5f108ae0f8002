use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::BackendResult;

/// Payload returned by a callable function.
#[derive(Clone, Debug, PartialEq)]
pub struct CallableResult {
    data: Value,
}

impl CallableResult {
    pub fn new(data: Value) -> Self {
        Self { data }
    }

    pub fn data(&self) -> &Value {
        &self.data
    }

    pub fn into_data(self) -> Value {
        self.data
    }

    pub fn deserialize<T: DeserializeOwned>(&self) -> BackendResult<T> {
        Ok(serde_json::from_value(self.data.clone())?)
    }
}

#[async_trait]
pub trait FunctionsBackend: Send + Sync {
    async fn call(&self, name: &str, data: Map<String, Value>) -> BackendResult<CallableResult>;
}

use serde_json::{Map, Value};

use crate::config::Area;
use crate::extension::FirebaseExtension;
use crate::functions::backend::CallableResult;
use crate::result::FirebaseResult;

impl FirebaseExtension {
    /// Invokes the callable function `name` with a key-value payload.
    pub async fn call(&self, name: &str, data: Map<String, Value>) -> FirebaseResult<CallableResult> {
        let outcome = self.functions.call(name, data).await;
        self.settle(Area::Functions, "call", name, outcome)
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;
    use serde_json::{json, Map, Value};

    use crate::error::permission_denied;
    use crate::test_support::memory_extension;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Reward {
        coins: u32,
    }

    fn payload(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn call_returns_handler_result() {
        let (backends, extension) = memory_extension();
        backends.functions.register("claimReward", |data| {
            let streak = data.get("streak").and_then(Value::as_u64).unwrap_or(0);
            Ok(json!({ "coins": streak * 10 }))
        });

        let result = extension
            .call("claimReward", payload(json!({ "streak": 3 })))
            .await;
        assert!(result.completed_successfully());
        let reward: Reward = result.value().unwrap().deserialize().unwrap();
        assert_eq!(reward, Reward { coins: 30 });
        assert_eq!(backends.functions.calls()[0].0, "claimReward");
    }

    #[tokio::test]
    async fn unknown_callable_is_a_failure() {
        let (_backends, extension) = memory_extension();
        let result = extension.call("missing", Map::new()).await;
        assert!(!result.completed_successfully());
        assert!(result.value().is_none());
    }

    #[tokio::test]
    async fn handler_error_is_a_failure() {
        let (backends, extension) = memory_extension();
        backends
            .functions
            .register("admin", |_| Err(permission_denied("admins only")));
        assert!(!extension
            .call("admin", Map::new())
            .await
            .completed_successfully());
    }
}

use std::collections::BTreeMap;

use crate::analytics::backend::{AnalyticsEvent, ParameterValue};
use crate::config::Area;
use crate::extension::FirebaseExtension;
use crate::result::FirebaseResult;

impl FirebaseExtension {
    pub async fn log_event(&self, event_name: &str) -> FirebaseResult {
        self.dispatch_event(AnalyticsEvent::new(event_name)).await
    }

    pub async fn log_event_with_parameter(
        &self,
        event_name: &str,
        parameter_name: &str,
        parameter_value: f64,
    ) -> FirebaseResult {
        let event = AnalyticsEvent::new(event_name).with_param(parameter_name, parameter_value);
        self.dispatch_event(event).await
    }

    pub async fn log_event_with_parameters(
        &self,
        event_name: &str,
        params: BTreeMap<String, ParameterValue>,
    ) -> FirebaseResult {
        let event = AnalyticsEvent {
            name: event_name.to_string(),
            params,
        };
        self.dispatch_event(event).await
    }

    async fn dispatch_event(&self, event: AnalyticsEvent) -> FirebaseResult {
        let name = event.name.clone();
        let outcome = self.analytics.log_event(event).await;
        self.settle(Area::Analytics, "log_event", &name, outcome)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use crate::analytics::ParameterValue;
    use crate::error::unavailable;
    use crate::test_support::memory_extension;

    #[tokio::test]
    async fn log_event_records_name() {
        let (backends, extension) = memory_extension();
        assert!(extension.log_event("tutorial_begin").await.completed_successfully());

        let events = backends.analytics.recorded_events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].name, "tutorial_begin");
        assert!(events[0].params.is_empty());
    }

    #[tokio::test]
    async fn log_event_with_parameter_records_double() {
        let (backends, extension) = memory_extension();
        let result = extension
            .log_event_with_parameter("post_score", "score", 42.5)
            .await;
        assert!(result.completed_successfully());

        let events = backends.analytics.recorded_events();
        assert_eq!(
            events[0].params.get("score"),
            Some(&ParameterValue::Double(42.5))
        );
    }

    #[tokio::test]
    async fn log_event_with_parameters_records_all() {
        let (backends, extension) = memory_extension();
        let mut params = BTreeMap::new();
        params.insert("level".to_string(), ParameterValue::from(3_i64));
        params.insert("character".to_string(), ParameterValue::from("mage"));

        assert!(extension
            .log_event_with_parameters("level_up", params.clone())
            .await
            .completed_successfully());
        assert_eq!(backends.analytics.recorded_events()[0].params, params);
    }

    #[tokio::test]
    async fn invalid_event_name_is_a_failure() {
        let (backends, extension) = memory_extension();
        let result = extension.log_event("").await;
        assert!(!result.completed_successfully());
        assert!(backends.analytics.recorded_events().is_empty());
    }

    #[tokio::test]
    async fn backend_fault_is_a_failure() {
        let (backends, extension) = memory_extension();
        backends.analytics.inject_fault(unavailable("offline"));
        assert!(!extension.log_event("app_open").await.completed_successfully());
    }
}

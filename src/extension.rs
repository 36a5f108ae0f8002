use std::sync::Arc;

use crate::analytics::AnalyticsBackend;
use crate::app::AppBackend;
use crate::auth::AuthBackend;
use crate::config::{Area, ExtensionSettings};
use crate::database::{DatabaseBackend, ReferenceCache};
use crate::error::{invalid_argument, BackendError, BackendResult};
use crate::functions::FunctionsBackend;
use crate::memory::MemoryBackends;
use crate::messaging::MessagingBackend;
use crate::result::FirebaseResult;
use crate::storage::StorageBackend;

/// Context object wrapping one backend per capability area.
///
/// Build it once at startup and share it (usually behind an `Arc`). Every
/// operation makes exactly one backend call and folds the outcome into a
/// [`FirebaseResult`]; backend faults never escape as errors or panics.
pub struct FirebaseExtension {
    pub(crate) app: Arc<dyn AppBackend>,
    pub(crate) analytics: Arc<dyn AnalyticsBackend>,
    pub(crate) auth: Arc<dyn AuthBackend>,
    pub(crate) database: Arc<dyn DatabaseBackend>,
    pub(crate) functions: Arc<dyn FunctionsBackend>,
    pub(crate) messaging: Arc<dyn MessagingBackend>,
    pub(crate) storage: Arc<dyn StorageBackend>,
    pub(crate) references: ReferenceCache,
    settings: ExtensionSettings,
}

impl FirebaseExtension {
    pub fn builder() -> FirebaseExtensionBuilder {
        FirebaseExtensionBuilder::default()
    }

    /// Facade over fresh in-memory backends with default settings.
    pub fn in_memory() -> Self {
        let backends = MemoryBackends::default();
        Self::assemble(
            backends.app,
            backends.analytics,
            backends.auth,
            backends.database,
            backends.functions,
            backends.messaging,
            backends.storage,
            ExtensionSettings::default(),
        )
    }

    pub fn settings(&self) -> &ExtensionSettings {
        &self.settings
    }

    #[allow(clippy::too_many_arguments)]
    fn assemble(
        app: Arc<dyn AppBackend>,
        analytics: Arc<dyn AnalyticsBackend>,
        auth: Arc<dyn AuthBackend>,
        database: Arc<dyn DatabaseBackend>,
        functions: Arc<dyn FunctionsBackend>,
        messaging: Arc<dyn MessagingBackend>,
        storage: Arc<dyn StorageBackend>,
        settings: ExtensionSettings,
    ) -> Self {
        if let Some(enabled) = settings.persistence_enabled {
            if let Err(err) = database.set_persistence_enabled(enabled) {
                log::warn!(
                    target: area_target(Area::Database),
                    "persistence setting ignored: {err}"
                );
            }
        }
        Self {
            app,
            analytics,
            auth,
            database,
            functions,
            messaging,
            storage,
            references: ReferenceCache::default(),
            settings,
        }
    }

    /// Folds a backend outcome into a result, honouring the area's benign
    /// allow-list.
    pub(crate) fn settle<T>(
        &self,
        area: Area,
        operation: &str,
        subject: &str,
        outcome: BackendResult<T>,
    ) -> FirebaseResult<T> {
        match outcome {
            Ok(value) => FirebaseResult::success(value),
            Err(err) if self.settings.benign_faults.is_benign(area, &err) => {
                log::debug!(
                    target: area_target(area),
                    "{operation}({subject}) treated as empty success: {err}"
                );
                FirebaseResult::new(true)
            }
            Err(err) => self.fail(area, operation, subject, &err),
        }
    }

    /// Like [`Self::settle`] for reads where "nothing there" is an empty
    /// success rather than a payload.
    pub(crate) fn settle_optional<T>(
        &self,
        area: Area,
        operation: &str,
        subject: &str,
        outcome: BackendResult<Option<T>>,
    ) -> FirebaseResult<T> {
        match outcome {
            Ok(Some(value)) => FirebaseResult::success(value),
            Ok(None) => FirebaseResult::new(true),
            Err(err) => self.settle(area, operation, subject, Err(err)),
        }
    }

    /// Like [`Self::settle`] but every fault is a failure.
    pub(crate) fn settle_strict<T>(
        &self,
        area: Area,
        operation: &str,
        subject: &str,
        outcome: BackendResult<T>,
    ) -> FirebaseResult<T> {
        match outcome {
            Ok(value) => FirebaseResult::success(value),
            Err(err) => self.fail(area, operation, subject, &err),
        }
    }

    pub(crate) fn fail<T>(
        &self,
        area: Area,
        operation: &str,
        subject: &str,
        err: &BackendError,
    ) -> FirebaseResult<T> {
        self.report(area, operation, subject, err);
        FirebaseResult::failure()
    }

    /// Logs a fault when `log_faults` is set. Used directly by operations
    /// that report through a plain value instead of a result.
    pub(crate) fn report(
        &self,
        area: Area,
        operation: &str,
        subject: &str,
        err: &BackendError,
    ) {
        if self.settings.log_faults {
            log::error!(target: area_target(area), "{operation}({subject}) failed: {err}");
        }
    }
}

fn area_target(area: Area) -> &'static str {
    match area {
        Area::App => "firebase_extension::app",
        Area::Analytics => "firebase_extension::analytics",
        Area::Auth => "firebase_extension::auth",
        Area::Database => "firebase_extension::database",
        Area::Functions => "firebase_extension::functions",
        Area::Messaging => "firebase_extension::messaging",
        Area::Storage => "firebase_extension::storage",
    }
}

/// Collects one backend per area. Every area must be supplied.
#[derive(Default)]
pub struct FirebaseExtensionBuilder {
    app: Option<Arc<dyn AppBackend>>,
    analytics: Option<Arc<dyn AnalyticsBackend>>,
    auth: Option<Arc<dyn AuthBackend>>,
    database: Option<Arc<dyn DatabaseBackend>>,
    functions: Option<Arc<dyn FunctionsBackend>>,
    messaging: Option<Arc<dyn MessagingBackend>>,
    storage: Option<Arc<dyn StorageBackend>>,
    settings: ExtensionSettings,
}

impl FirebaseExtensionBuilder {
    pub fn app(mut self, backend: Arc<dyn AppBackend>) -> Self {
        self.app = Some(backend);
        self
    }

    pub fn analytics(mut self, backend: Arc<dyn AnalyticsBackend>) -> Self {
        self.analytics = Some(backend);
        self
    }

    pub fn auth(mut self, backend: Arc<dyn AuthBackend>) -> Self {
        self.auth = Some(backend);
        self
    }

    pub fn database(mut self, backend: Arc<dyn DatabaseBackend>) -> Self {
        self.database = Some(backend);
        self
    }

    pub fn functions(mut self, backend: Arc<dyn FunctionsBackend>) -> Self {
        self.functions = Some(backend);
        self
    }

    pub fn messaging(mut self, backend: Arc<dyn MessagingBackend>) -> Self {
        self.messaging = Some(backend);
        self
    }

    pub fn storage(mut self, backend: Arc<dyn StorageBackend>) -> Self {
        self.storage = Some(backend);
        self
    }

    pub fn settings(mut self, settings: ExtensionSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn build(self) -> BackendResult<FirebaseExtension> {
        Ok(FirebaseExtension::assemble(
            required(self.app, Area::App)?,
            required(self.analytics, Area::Analytics)?,
            required(self.auth, Area::Auth)?,
            required(self.database, Area::Database)?,
            required(self.functions, Area::Functions)?,
            required(self.messaging, Area::Messaging)?,
            required(self.storage, Area::Storage)?,
            self.settings,
        ))
    }
}

fn required<T: ?Sized>(backend: Option<Arc<T>>, area: Area) -> BackendResult<Arc<T>> {
    backend.ok_or_else(|| invalid_argument(format!("No {area} backend configured")))
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::error::{internal_error, object_not_found, BackendErrorCode};

    #[test]
    fn build_requires_every_backend() {
        let backends = MemoryBackends::default();
        let err = FirebaseExtension::builder()
            .app(backends.app.clone())
            .analytics(backends.analytics.clone())
            .build()
            .err()
            .expect("auth backend missing");
        assert_eq!(err.code, BackendErrorCode::InvalidArgument);
        assert!(err.message().contains("auth"));
    }

    #[test]
    fn build_forwards_persistence_setting() {
        let backends = MemoryBackends::default();
        let settings = ExtensionSettings {
            persistence_enabled: Some(true),
            ..Default::default()
        };
        backends.builder().settings(settings).build().unwrap();
        assert!(backends.database.persistence_enabled());
    }

    #[test]
    fn settle_applies_allow_list_per_area() {
        let extension = FirebaseExtension::in_memory();

        let storage: FirebaseResult<u8> =
            extension.settle(Area::Storage, "op", "a", Err(object_not_found("a")));
        assert!(storage.completed_successfully());
        assert!(storage.value().is_none());

        let database: FirebaseResult<u8> =
            extension.settle(Area::Database, "op", "a", Err(object_not_found("a")));
        assert!(!database.completed_successfully());

        let other: FirebaseResult<u8> =
            extension.settle(Area::Storage, "op", "a", Err(internal_error("boom")));
        assert!(!other.completed_successfully());
    }

    static RECORDS: Mutex<Vec<String>> = Mutex::new(Vec::new());

    struct RecordingLogger;

    impl log::Log for RecordingLogger {
        fn enabled(&self, _: &log::Metadata<'_>) -> bool {
            true
        }

        fn log(&self, record: &log::Record<'_>) {
            RECORDS.lock().unwrap().push(record.args().to_string());
        }

        fn flush(&self) {}
    }

    static LOGGER: RecordingLogger = RecordingLogger;

    fn logged(needle: &str) -> bool {
        RECORDS
            .lock()
            .unwrap()
            .iter()
            .any(|line| line.contains(needle))
    }

    fn with_log_faults(log_faults: bool) -> FirebaseExtension {
        let settings = ExtensionSettings {
            log_faults,
            ..Default::default()
        };
        MemoryBackends::default()
            .builder()
            .settings(settings)
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn faults_are_reported_only_when_enabled() {
        let _ = log::set_logger(&LOGGER);
        log::set_max_level(log::LevelFilter::Debug);

        let loud = with_log_faults(true);
        let quiet = with_log_faults(false);
        loud.report(Area::Storage, "download_url", "loud/slot", &internal_error("boom"));
        quiet.report(Area::Storage, "download_url", "quiet/slot", &internal_error("boom"));
        assert!(logged("download_url(loud/slot) failed"));
        assert!(!logged("quiet/slot"));

        assert!(!loud.custom_sign_in("nobody@report.test", "hunter22").await);
        assert!(logged("custom_sign_in(nobody@report.test) failed"));
    }

    #[test]
    fn settle_strict_ignores_allow_list() {
        let extension = FirebaseExtension::in_memory();
        let result: FirebaseResult<u8> =
            extension.settle_strict(Area::Storage, "op", "a", Err(object_not_found("a")));
        assert!(!result.completed_successfully());
    }
}

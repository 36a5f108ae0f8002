//! In-memory stand-ins for every backend area, for local development and tests.

use std::sync::Arc;

use crate::analytics::MemoryAnalytics;
use crate::app::MemoryApp;
use crate::auth::MemoryAuth;
use crate::database::MemoryDatabase;
use crate::extension::{FirebaseExtension, FirebaseExtensionBuilder};
use crate::functions::MemoryFunctions;
use crate::messaging::MemoryMessaging;
use crate::storage::MemoryStorage;

/// Concrete handles to a full set of in-memory backends. Keep a clone to
/// inspect state or inject faults after handing the set to a facade.
#[derive(Clone, Default)]
pub struct MemoryBackends {
    pub app: Arc<MemoryApp>,
    pub analytics: Arc<MemoryAnalytics>,
    pub auth: Arc<MemoryAuth>,
    pub database: Arc<MemoryDatabase>,
    pub functions: Arc<MemoryFunctions>,
    pub messaging: Arc<MemoryMessaging>,
    pub storage: Arc<MemoryStorage>,
}

impl MemoryBackends {
    /// Builder pre-populated with these backends.
    pub fn builder(&self) -> FirebaseExtensionBuilder {
        FirebaseExtension::builder()
            .app(self.app.clone())
            .analytics(self.analytics.clone())
            .auth(self.auth.clone())
            .database(self.database.clone())
            .functions(self.functions.clone())
            .messaging(self.messaging.clone())
            .storage(self.storage.clone())
    }
}

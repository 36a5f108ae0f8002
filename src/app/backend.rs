use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::BackendResult;

/// Outcome of the platform dependency check.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DependencyStatus {
    Available,
    UnavailableDisabled,
    UnavailableInvalid,
    UnavailableMissing,
    UnavailablePermission,
    UnavailableUpdating,
    UnavailableUpdateRequired,
    UnavailableOther,
}

impl DependencyStatus {
    pub fn is_available(&self) -> bool {
        matches!(self, DependencyStatus::Available)
    }
}

#[async_trait]
pub trait AppBackend: Send + Sync {
    /// Verifies (and where possible repairs) the native dependencies the SDK needs.
    async fn check_and_fix_dependencies(&self) -> BackendResult<DependencyStatus>;
}

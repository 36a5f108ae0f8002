use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{Display, Formatter};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{BackendError, BackendErrorCode, BackendResult};

/// Backend capability areas wrapped by the facade.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Area {
    App,
    Analytics,
    Auth,
    Database,
    Functions,
    Messaging,
    Storage,
}

impl Area {
    pub fn as_str(&self) -> &'static str {
        match self {
            Area::App => "app",
            Area::Analytics => "analytics",
            Area::Auth => "auth",
            Area::Database => "database",
            Area::Functions => "functions",
            Area::Messaging => "messaging",
            Area::Storage => "storage",
        }
    }
}

impl Display for Area {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-area allow-list of fault codes reported as an empty success.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BenignFaults(BTreeMap<Area, BTreeSet<BackendErrorCode>>);

impl BenignFaults {
    pub fn none() -> Self {
        Self(BTreeMap::new())
    }

    pub fn allow(mut self, area: Area, code: BackendErrorCode) -> Self {
        self.0.entry(area).or_default().insert(code);
        self
    }

    pub fn is_benign(&self, area: Area, error: &BackendError) -> bool {
        self.0
            .get(&area)
            .map(|codes| codes.contains(&error.code))
            .unwrap_or(false)
    }
}

impl Default for BenignFaults {
    fn default() -> Self {
        Self::none().allow(Area::Storage, BackendErrorCode::ObjectNotFound)
    }
}

/// Settings applied when a [`crate::FirebaseExtension`] is built.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExtensionSettings {
    /// Report non-benign faults through `log::error!`. On in debug builds only.
    pub log_faults: bool,
    /// Forwarded to the database backend at build time when set.
    pub persistence_enabled: Option<bool>,
    pub benign_faults: BenignFaults,
}

impl Default for ExtensionSettings {
    fn default() -> Self {
        Self {
            log_faults: cfg!(debug_assertions),
            persistence_enabled: None,
            benign_faults: BenignFaults::default(),
        }
    }
}

impl ExtensionSettings {
    pub fn from_json_str(raw: &str) -> BackendResult<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> BackendResult<Self> {
        let file = std::fs::File::open(path.as_ref())?;
        Ok(serde_json::from_reader(std::io::BufReader::new(file))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{internal_error, object_not_found};

    #[test]
    fn default_allow_list_only_covers_storage_not_found() {
        let faults = BenignFaults::default();
        assert!(faults.is_benign(Area::Storage, &object_not_found("a")));
        assert!(!faults.is_benign(Area::Database, &object_not_found("a")));
        assert!(!faults.is_benign(Area::Storage, &internal_error("boom")));
    }

    #[test]
    fn settings_parse_from_json() {
        let settings = ExtensionSettings::from_json_str(
            r#"{
                "logFaults": false,
                "persistenceEnabled": true,
                "benignFaults": { "database": ["not-found"] }
            }"#,
        )
        .unwrap();
        assert!(!settings.log_faults);
        assert_eq!(settings.persistence_enabled, Some(true));
        assert!(settings
            .benign_faults
            .is_benign(Area::Database, &crate::error::not_found("x")));
        assert!(!settings
            .benign_faults
            .is_benign(Area::Storage, &object_not_found("x")));
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let settings = ExtensionSettings::from_json_str("{}").unwrap();
        assert_eq!(settings, ExtensionSettings::default());
    }

    #[test]
    fn malformed_settings_are_rejected() {
        let err = ExtensionSettings::from_json_str("{\"logFaults\": 3}").unwrap_err();
        assert_eq!(err.code, BackendErrorCode::Serialization);
    }
}

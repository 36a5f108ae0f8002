use std::collections::BTreeMap;
use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::io::AsyncRead;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::BackendResult;

/// Readable object body, either downloaded or about to be uploaded.
pub type ByteStream = Box<dyn AsyncRead + Send + Unpin>;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageMetadata {
    pub bucket: String,
    pub name: String,
    pub full_path: String,
    pub size: u64,
    pub generation: i64,
    pub metageneration: i64,
    pub content_type: Option<String>,
    pub cache_control: Option<String>,
    pub content_disposition: Option<String>,
    pub content_encoding: Option<String>,
    pub content_language: Option<String>,
    #[serde(default)]
    pub custom_metadata: BTreeMap<String, String>,
    pub time_created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

/// Settable metadata supplied with an upload. `None` fields keep the
/// backend default.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataChange {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_control: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_disposition: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_encoding: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_metadata: Option<BTreeMap<String, String>>,
}

#[async_trait]
pub trait StorageBackend: Send + Sync {
    async fn delete(&self, path: &str) -> BackendResult<()>;

    /// Fails with `download-size-exceeded` when the object is larger than `max_size`.
    async fn get_bytes(&self, path: &str, max_size: u64) -> BackendResult<Vec<u8>>;

    async fn get_file(&self, path: &str, destination: &Path) -> BackendResult<()>;

    async fn get_metadata(&self, path: &str) -> BackendResult<StorageMetadata>;

    async fn get_stream(&self, path: &str) -> BackendResult<ByteStream>;

    async fn get_download_url(&self, path: &str) -> BackendResult<Url>;

    async fn put_bytes(
        &self,
        path: &str,
        data: Vec<u8>,
        metadata: Option<MetadataChange>,
    ) -> BackendResult<StorageMetadata>;

    async fn put_file(
        &self,
        path: &str,
        source: &Path,
        metadata: Option<MetadataChange>,
    ) -> BackendResult<StorageMetadata>;

    async fn put_stream(
        &self,
        path: &str,
        stream: ByteStream,
        metadata: Option<MetadataChange>,
    ) -> BackendResult<StorageMetadata>;
}

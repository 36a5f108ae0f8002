use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use futures::io::{AsyncReadExt, Cursor};
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use rand::distributions::Alphanumeric;
use rand::Rng;
use url::Url;

use crate::error::{
    download_size_exceeded, internal_error, invalid_argument, object_not_found, BackendError,
    BackendResult,
};
use crate::storage::backend::{ByteStream, MetadataChange, StorageBackend, StorageMetadata};
use crate::util::{canonical_path, last_component, FaultQueue};

pub const DEFAULT_HOST: &str = "firebasestorage.googleapis.com";
pub const DEFAULT_BUCKET: &str = "memory.appspot.com";
const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

#[derive(Clone, Debug)]
struct StoredObject {
    data: Bytes,
    metadata: StorageMetadata,
    download_token: String,
}

/// Object store for a single bucket, kept in memory.
#[derive(Debug)]
pub struct MemoryStorage {
    bucket: String,
    objects: Mutex<BTreeMap<String, StoredObject>>,
    faults: FaultQueue,
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new(DEFAULT_BUCKET)
    }
}

impl MemoryStorage {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            objects: Mutex::new(BTreeMap::new()),
            faults: FaultQueue::default(),
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn object(&self, path: &str) -> Option<Bytes> {
        self.objects()
            .get(&canonical_path(path))
            .map(|object| object.data.clone())
    }

    pub fn object_paths(&self) -> Vec<String> {
        self.objects().keys().cloned().collect()
    }

    pub fn inject_fault(&self, error: BackendError) {
        self.faults.push(error);
    }

    fn objects(&self) -> MutexGuard<'_, BTreeMap<String, StoredObject>> {
        self.objects
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn lookup(&self, path: &str, operation: &str) -> BackendResult<StoredObject> {
        self.faults.check()?;
        let key = object_key(path, operation)?;
        self.objects()
            .get(&key)
            .cloned()
            .ok_or_else(|| object_not_found(&key))
    }

    fn store(
        &self,
        path: &str,
        data: Vec<u8>,
        change: Option<MetadataChange>,
    ) -> BackendResult<StorageMetadata> {
        let key = object_key(path, "upload")?;
        let change = change.unwrap_or_default();
        let now = Utc::now();
        let metadata = StorageMetadata {
            bucket: self.bucket.clone(),
            name: last_component(&key).unwrap_or_default(),
            full_path: key.clone(),
            size: data.len() as u64,
            generation: now.timestamp_micros(),
            metageneration: 1,
            content_type: Some(
                change
                    .content_type
                    .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string()),
            ),
            cache_control: change.cache_control,
            content_disposition: change.content_disposition,
            content_encoding: change.content_encoding,
            content_language: change.content_language,
            custom_metadata: change.custom_metadata.unwrap_or_default(),
            time_created: now,
            updated: now,
        };
        let object = StoredObject {
            data: Bytes::from(data),
            metadata: metadata.clone(),
            download_token: generate_download_token(),
        };
        self.objects().insert(key, object);
        Ok(metadata)
    }
}

#[async_trait]
impl StorageBackend for MemoryStorage {
    async fn delete(&self, path: &str) -> BackendResult<()> {
        self.faults.check()?;
        let key = object_key(path, "delete")?;
        self.objects()
            .remove(&key)
            .map(|_| ())
            .ok_or_else(|| object_not_found(&key))
    }

    async fn get_bytes(&self, path: &str, max_size: u64) -> BackendResult<Vec<u8>> {
        let object = self.lookup(path, "get_bytes")?;
        let size = object.data.len() as u64;
        if size > max_size {
            return Err(download_size_exceeded(size, max_size));
        }
        Ok(object.data.to_vec())
    }

    async fn get_file(&self, path: &str, destination: &Path) -> BackendResult<()> {
        let object = self.lookup(path, "get_file")?;
        tokio::fs::write(destination, &object.data).await?;
        Ok(())
    }

    async fn get_metadata(&self, path: &str) -> BackendResult<StorageMetadata> {
        Ok(self.lookup(path, "get_metadata")?.metadata)
    }

    async fn get_stream(&self, path: &str) -> BackendResult<ByteStream> {
        let object = self.lookup(path, "get_stream")?;
        Ok(Box::new(Cursor::new(object.data)))
    }

    async fn get_download_url(&self, path: &str) -> BackendResult<Url> {
        let object = self.lookup(path, "get_download_url")?;
        let raw = format!(
            "https://{DEFAULT_HOST}/v0/b/{}/o/{}?alt=media&token={}",
            utf8_percent_encode(&self.bucket, NON_ALPHANUMERIC),
            utf8_percent_encode(&object.metadata.full_path, NON_ALPHANUMERIC),
            object.download_token
        );
        Url::parse(&raw).map_err(|err| internal_error(format!("Invalid download URL: {err}")))
    }

    async fn put_bytes(
        &self,
        path: &str,
        data: Vec<u8>,
        metadata: Option<MetadataChange>,
    ) -> BackendResult<StorageMetadata> {
        self.faults.check()?;
        self.store(path, data, metadata)
    }

    async fn put_file(
        &self,
        path: &str,
        source: &Path,
        metadata: Option<MetadataChange>,
    ) -> BackendResult<StorageMetadata> {
        self.faults.check()?;
        object_key(path, "upload")?;
        let data = tokio::fs::read(source).await?;
        self.store(path, data, metadata)
    }

    async fn put_stream(
        &self,
        path: &str,
        mut stream: ByteStream,
        metadata: Option<MetadataChange>,
    ) -> BackendResult<StorageMetadata> {
        self.faults.check()?;
        object_key(path, "upload")?;
        let mut data = Vec::new();
        stream.read_to_end(&mut data).await?;
        self.store(path, data, metadata)
    }
}

fn object_key(path: &str, operation: &str) -> BackendResult<String> {
    let key = canonical_path(path);
    if key.is_empty() {
        return Err(invalid_argument(format!(
            "'{operation}' cannot be performed on the storage root."
        )));
    }
    Ok(key)
}

fn generate_download_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .map(char::from)
        .take(32)
        .collect()
}

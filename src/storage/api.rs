use std::path::Path;

use url::Url;

use crate::config::Area;
use crate::extension::FirebaseExtension;
use crate::result::FirebaseResult;
use crate::storage::backend::{ByteStream, MetadataChange, StorageMetadata};

impl FirebaseExtension {
    /// Deletes the object at `path`. A missing object counts as deleted.
    pub async fn delete_file(&self, path: &str) -> FirebaseResult {
        let outcome = self.storage.delete(path).await;
        self.settle(Area::Storage, "delete_file", path, outcome)
    }

    /// Downloads the object into memory. `None` lifts the size limit.
    pub async fn download_bytes(&self, path: &str, max_size: Option<u64>) -> FirebaseResult<Vec<u8>> {
        let outcome = self
            .storage
            .get_bytes(path, max_size.unwrap_or(u64::MAX))
            .await;
        self.settle(Area::Storage, "download_bytes", path, outcome)
    }

    pub async fn download_file(&self, path: &str, file_path: impl AsRef<Path>) -> FirebaseResult {
        let outcome = self.storage.get_file(path, file_path.as_ref()).await;
        self.settle(Area::Storage, "download_file", path, outcome)
    }

    pub async fn download_metadata(&self, path: &str) -> FirebaseResult<StorageMetadata> {
        let outcome = self.storage.get_metadata(path).await;
        self.settle(Area::Storage, "download_metadata", path, outcome)
    }

    pub async fn download_stream(&self, path: &str) -> FirebaseResult<ByteStream> {
        let outcome = self.storage.get_stream(path).await;
        self.settle(Area::Storage, "download_stream", path, outcome)
    }

    pub async fn download_url(&self, path: &str) -> FirebaseResult<Url> {
        let outcome = self.storage.get_download_url(path).await;
        self.settle(Area::Storage, "download_url", path, outcome)
    }

    pub async fn upload_bytes(
        &self,
        path: &str,
        data: Vec<u8>,
        metadata: Option<MetadataChange>,
    ) -> FirebaseResult<StorageMetadata> {
        let outcome = self.storage.put_bytes(path, data, metadata).await;
        self.settle_strict(Area::Storage, "upload_bytes", path, outcome)
    }

    pub async fn upload_file(
        &self,
        path: &str,
        file_path: impl AsRef<Path>,
        metadata: Option<MetadataChange>,
    ) -> FirebaseResult<StorageMetadata> {
        let outcome = self
            .storage
            .put_file(path, file_path.as_ref(), metadata)
            .await;
        self.settle_strict(Area::Storage, "upload_file", path, outcome)
    }

    pub async fn upload_stream(
        &self,
        path: &str,
        stream: ByteStream,
        metadata: Option<MetadataChange>,
    ) -> FirebaseResult<StorageMetadata> {
        let outcome = self.storage.put_stream(path, stream, metadata).await;
        self.settle_strict(Area::Storage, "upload_stream", path, outcome)
    }
}

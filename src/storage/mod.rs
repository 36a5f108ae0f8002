//! Path-addressed blob storage.

mod api;
mod backend;
mod memory;

#[doc(inline)]
pub use backend::{ByteStream, MetadataChange, StorageBackend, StorageMetadata};

#[doc(inline)]
pub use memory::{MemoryStorage, DEFAULT_BUCKET, DEFAULT_HOST};

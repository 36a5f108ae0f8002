//! # Realtime database
//!
//! Path-addressed JSON tree with value and child listeners.
//!
//! The facade resolves each literal path string to a [`DatabaseReference`]
//! once and reuses the handle afterwards, so listeners registered through
//! [`crate::FirebaseExtension::add_listener`] can be removed again with the
//! same `Arc` through [`crate::FirebaseExtension::remove_listener`].
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use firebase_extension::database::{ChildListenerType, DatabaseEvent, DatabaseListener};
//! use firebase_extension::FirebaseExtension;
//! use serde_json::json;
//!
//! # futures::executor::block_on(async {
//! let extension = FirebaseExtension::in_memory();
//! let listener: DatabaseListener = Arc::new(|event: &DatabaseEvent| {
//!     println!("new message {:?}", event.snapshot().key());
//! });
//! extension.add_listener(ChildListenerType::Added, "chat", listener.clone());
//!
//! extension.set_value("chat/m1", json!({ "text": "hi" })).await;
//! assert_eq!(extension.get_count("chat").await.into_value(), Some(1));
//!
//! extension.remove_listener(ChildListenerType::Added, "chat", &listener);
//! # });
//! ```

mod api;
mod backend;
mod cache;
mod memory;
mod push_id;

#[doc(inline)]
pub use backend::{
    ChildEvent, ChildListenerType, DataSnapshot, DatabaseBackend, DatabaseEvent, DatabaseListener,
    DatabaseReference, EventType, ValueEvent, ValueListenerType,
};

#[doc(inline)]
pub use cache::ReferenceCache;

#[doc(inline)]
pub use memory::MemoryDatabase;

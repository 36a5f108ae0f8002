//! # firebase-extension
//!
//! A facade that folds every backend call into a [`FirebaseResult`].
//!
//! Each capability area (dependency check, analytics, auth, realtime
//! database, callable functions, messaging tokens and blob storage) sits
//! behind an object-safe backend trait. [`FirebaseExtension`] owns one
//! backend per area and exposes one method per operation; every method makes
//! a single backend call and reports the outcome as a result wrapper instead
//! of an error. Faults listed in [`config::BenignFaults`] (by default only
//! "object not found" from storage) become an empty success.
//!
//! In-memory backends for every area live next to the traits and are
//! bundled by [`MemoryBackends`].
//!
//! ## Quick start
//!
//! ```
//! use firebase_extension::FirebaseExtension;
//!
//! # futures::executor::block_on(async {
//! let extension = FirebaseExtension::in_memory();
//!
//! let saved = extension.upload_bytes("saves/slot1.bin", vec![1, 2, 3], None).await;
//! assert!(saved.completed_successfully());
//!
//! let missing = extension.download_bytes("saves/slot2.bin", None).await;
//! assert!(missing.completed_successfully());
//! assert!(missing.value().is_none());
//! # });
//! ```

pub mod analytics;
pub mod app;
pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod functions;
pub mod messaging;
pub mod storage;
pub mod util;

mod extension;
mod memory;
mod result;

#[doc(inline)]
pub use extension::{FirebaseExtension, FirebaseExtensionBuilder};

#[doc(inline)]
pub use memory::MemoryBackends;

#[doc(inline)]
pub use result::{FirebaseResult, UNSPECIFIED_ERROR_CODE};

#[cfg(test)]
pub mod test_support;

//! Test utilities shared across crate-level unit tests.

pub mod extension;

pub use extension::memory_extension;

//! Backend dependency check run once at startup.

mod api;
mod backend;
mod memory;

#[doc(inline)]
pub use backend::{AppBackend, DependencyStatus};

#[doc(inline)]
pub use memory::MemoryApp;

//! Callable function invocation.

mod api;
mod backend;
mod memory;

#[doc(inline)]
pub use backend::{CallableResult, FunctionsBackend};

#[doc(inline)]
pub use memory::{CallableHandler, MemoryFunctions};

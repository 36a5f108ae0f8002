//! Authentication: email/password, custom tokens and federated credentials.

mod api;
mod backend;
mod memory;

#[doc(inline)]
pub use backend::{AuthBackend, Credential, User};

#[doc(inline)]
pub use memory::MemoryAuth;

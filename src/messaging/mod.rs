//! Push-notification token issuance.

mod api;
mod backend;
mod memory;

#[doc(inline)]
pub use backend::{MessagingBackend, TokenListener, TokenReceived};

#[doc(inline)]
pub use memory::MemoryMessaging;

//! Analytics event logging.

mod api;
mod backend;
mod memory;

#[doc(inline)]
pub use backend::{AnalyticsBackend, AnalyticsEvent, ParameterValue};

#[doc(inline)]
pub use memory::MemoryAnalytics;

pub mod fault_queue;
pub mod listeners;
pub mod path;

pub use fault_queue::FaultQueue;
pub use listeners::{same_listener, ListenerSet};
pub use path::{canonical_path, last_component, segments};

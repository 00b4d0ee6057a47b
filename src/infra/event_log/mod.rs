//! Event log backends.

pub mod memory;
pub mod tracing_log;

pub use memory::InMemoryEventLog;
pub use tracing_log::TracingEventLog;

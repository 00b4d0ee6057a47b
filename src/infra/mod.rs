//! Infrastructure adapters for the event log and delivery sink.

pub mod delivery;
pub mod event_log;

pub use delivery::{CsvDeliverySink, InMemoryDeliverySink};
pub use event_log::{InMemoryEventLog, TracingEventLog};

//! Delivery sink backends.

pub mod csv_file;
pub mod memory;

pub use csv_file::CsvDeliverySink;
pub use memory::InMemoryDeliverySink;

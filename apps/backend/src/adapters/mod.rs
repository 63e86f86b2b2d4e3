//! Implementations of the collaborator boundaries in `repos`.

pub mod records_csv;
pub mod records_memory;

pub use records_csv::CsvRecordSink;
pub use records_memory::MemoryRecordSink;

//! Collaborator boundaries owned by the game (implemented in `adapters`).

pub mod records;

pub use records::RecordSink;

#![deny(clippy::wildcard_imports)]
#![cfg_attr(test, allow(clippy::wildcard_imports))]

pub mod adapters;
pub mod config;
pub mod domain;
pub mod error;
pub mod errors;
pub mod infra;
pub mod messaging;
pub mod repos;
pub mod services;
pub mod state;

// Re-exports for public API
pub use adapters::{CsvRecordSink, MemoryRecordSink};
pub use config::GameConfig;
pub use domain::{ChannelId, PlayerId, RoundId, RoundOutcome};
pub use error::AppError;
pub use errors::ErrorCode;
pub use infra::state::build_state;
pub use messaging::{Messenger, RoundPrompt, RoundResult, SessionEvent};
pub use repos::RecordSink;
pub use services::{
    ControlCommand, GameBot, ScoreLedger, SessionCoordinator, SessionParams, SessionProgress,
    Standing,
};
pub use state::app_state::AppState;

// Auto-initialize logging for unit tests
#[cfg(test)]
#[ctor::ctor]
fn init_test_logging() {
    hashtag_test_support::logging::init();
}

//! Boundary with the durable round log.
//!
//! One record per round, written exactly once when the round closes. Each
//! session starts a fresh log with a fixed header. Implementations must
//! serialize writers; rounds close concurrently.

use time::OffsetDateTime;

use crate::domain::RoundExport;
use crate::error::AppError;

pub trait RecordSink: Send + Sync {
    /// Start a fresh log for a session beginning at `started_at`.
    fn begin_session(&self, started_at: OffsetDateTime) -> Result<(), AppError>;

    /// Append one closed round.
    fn append(&self, record: &RoundExport) -> Result<(), AppError>;
}

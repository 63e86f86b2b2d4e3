//! In-memory round log.

use parking_lot::Mutex;
use time::OffsetDateTime;

use crate::domain::RoundExport;
use crate::error::AppError;
use crate::repos::RecordSink;

/// Keeps every session's rows; handy for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryRecordSink {
    sessions: Mutex<Vec<Vec<RoundExport>>>,
}

impl MemoryRecordSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rows of the most recent session.
    pub fn records(&self) -> Vec<RoundExport> {
        self.sessions.lock().last().cloned().unwrap_or_default()
    }

    pub fn session_count(&self) -> usize {
        self.sessions.lock().len()
    }
}

impl RecordSink for MemoryRecordSink {
    fn begin_session(&self, _started_at: OffsetDateTime) -> Result<(), AppError> {
        self.sessions.lock().push(Vec::new());
        Ok(())
    }

    fn append(&self, record: &RoundExport) -> Result<(), AppError> {
        let mut sessions = self.sessions.lock();
        let current = sessions
            .last_mut()
            .ok_or_else(|| AppError::internal("no round log open for this session"))?;
        current.push(record.clone());
        Ok(())
    }
}

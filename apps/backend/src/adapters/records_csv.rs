//! CSV round log, one file per session.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, ErrorKind};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use time::macros::format_description;
use time::OffsetDateTime;
use tracing::{debug, info};

use crate::domain::RoundExport;
use crate::error::AppError;
use crate::repos::RecordSink;

struct OpenLog {
    path: PathBuf,
    writer: csv::Writer<BufWriter<File>>,
}

/// Writes `submissions_<YYYYmmdd_HHMMSS>.csv` files into a directory.
pub struct CsvRecordSink {
    dir: PathBuf,
    current: Mutex<Option<OpenLog>>,
}

impl CsvRecordSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            current: Mutex::new(None),
        }
    }

    /// Path of the log for the running session, if one was started.
    pub fn current_path(&self) -> Option<PathBuf> {
        self.current.lock().as_ref().map(|log| log.path.clone())
    }

    fn create_log(&self, started_at: OffsetDateTime) -> Result<OpenLog, AppError> {
        std::fs::create_dir_all(&self.dir)?;

        let stamp = started_at
            .format(format_description!(
                "[year][month][day]_[hour][minute][second]"
            ))
            .map_err(|e| AppError::internal(format!("timestamp format: {e}")))?;

        // Two sessions started within the same second get numbered suffixes.
        let mut suffix = 1u32;
        let (path, file) = loop {
            let name = if suffix == 1 {
                format!("submissions_{stamp}.csv")
            } else {
                format!("submissions_{stamp}_{suffix}.csv")
            };
            let path = self.dir.join(name);
            match create_new(&path) {
                Ok(file) => break (path, file),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => suffix += 1,
                Err(e) => return Err(e.into()),
            }
        };

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(BufWriter::new(file));
        writer.write_record(RoundExport::HEADER)?;
        writer.flush()?;

        Ok(OpenLog { path, writer })
    }
}

fn create_new(path: &Path) -> std::io::Result<File> {
    OpenOptions::new().write(true).create_new(true).open(path)
}

impl RecordSink for CsvRecordSink {
    fn begin_session(&self, started_at: OffsetDateTime) -> Result<(), AppError> {
        let log = self.create_log(started_at)?;
        info!(path = %log.path.display(), "Round log created");
        *self.current.lock() = Some(log);
        Ok(())
    }

    fn append(&self, record: &RoundExport) -> Result<(), AppError> {
        let mut guard = self.current.lock();
        let log = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("no round log open for this session"))?;
        log.writer.serialize(record)?;
        log.writer.flush()?;
        debug!(round_id = %record.round_id, path = %log.path.display(), "Round appended");
        Ok(())
    }
}

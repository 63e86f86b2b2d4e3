//! Record tally and end-of-run reporting.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use hashtag_backend::domain::RoundExport;
use hashtag_backend::{AppError, CsvRecordSink, RecordSink, Standing};
use parking_lot::Mutex;
use time::OffsetDateTime;

use crate::channel::DeliveryStats;

/// CSV sink that also counts outcomes for the summary.
pub struct TallySink {
    inner: CsvRecordSink,
    outcomes: Mutex<BTreeMap<&'static str, usize>>,
}

impl TallySink {
    pub fn new(output_dir: &Path) -> Self {
        Self {
            inner: CsvRecordSink::new(output_dir),
            outcomes: Mutex::new(BTreeMap::new()),
        }
    }

    pub fn outcomes(&self) -> BTreeMap<&'static str, usize> {
        self.outcomes.lock().clone()
    }

    pub fn csv_path(&self) -> Option<std::path::PathBuf> {
        self.inner.current_path()
    }
}

impl RecordSink for TallySink {
    fn begin_session(&self, started_at: OffsetDateTime) -> Result<(), AppError> {
        self.outcomes.lock().clear();
        self.inner.begin_session(started_at)
    }

    fn append(&self, record: &RoundExport) -> Result<(), AppError> {
        self.inner.append(record)?;
        *self.outcomes.lock().entry(record.game_outcome).or_default() += 1;
        Ok(())
    }
}

pub fn write_leaderboard_json(path: &Path, standings: &[Standing]) -> Result<(), Box<dyn std::error::Error>> {
    let json = serde_json::to_string_pretty(standings)?;
    std::fs::write(path, json)?;
    Ok(())
}

pub fn print_summary(
    outcomes: &BTreeMap<&'static str, usize>,
    stats: &DeliveryStats,
    top: &[Standing],
    elapsed: Duration,
) {
    let rounds: usize = outcomes.values().sum();
    println!("\n=== Session Summary ===");
    println!("Rounds closed: {rounds}");
    for (outcome, count) in outcomes {
        let share = if rounds == 0 {
            0.0
        } else {
            *count as f64 / rounds as f64 * 100.0
        };
        println!("  {outcome}: {count} ({share:.1}%)");
    }
    println!(
        "Prompts: {}, acknowledgements: {}, results: {}",
        stats.prompts, stats.acknowledgements, stats.results
    );
    println!("Total time: {elapsed:?}");

    println!("\n=== Leaderboard ===");
    if top.is_empty() {
        println!("No scores yet.");
    }
    for (rank, standing) in top.iter().enumerate() {
        println!("{}. {}: {}", rank + 1, standing.player, standing.points);
    }
}

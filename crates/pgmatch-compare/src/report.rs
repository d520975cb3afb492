use std::time::Duration;

use tracing::info;

use pgmatch_core::{Counter, DiffRecord, ScanMode};

/// Tracing target every diff line is emitted on.
pub const DIFF_TARGET: &str = "pgmatch::diff";

/// Run-scoped accumulator of diff records and their counters.
///
/// Counters only grow, and always equal the number of recorded diffs of
/// their kind.
#[derive(Debug, Default)]
pub struct DiffReport {
    records: Vec<DiffRecord>,
    ddl_diffs: u64,
    row_count_diffs: u64,
}

impl DiffReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit one diff and bump its counter.
    pub fn record(&mut self, diff: DiffRecord) {
        match diff.category.counter() {
            Counter::Ddl => self.ddl_diffs += 1,
            Counter::RowCount => self.row_count_diffs += 1,
        }
        info!(target: DIFF_TARGET, "{diff}");
        self.records.push(diff);
    }

    pub fn extend(&mut self, diffs: impl IntoIterator<Item = DiffRecord>) {
        for diff in diffs {
            self.record(diff);
        }
    }

    pub fn records(&self) -> &[DiffRecord] {
        &self.records
    }

    pub fn ddl_diffs(&self) -> u64 {
        self.ddl_diffs
    }

    pub fn row_count_diffs(&self) -> u64 {
        self.row_count_diffs
    }

    /// Final summary line for a completed run.
    pub fn summary(&self, scan_mode: ScanMode, elapsed: Duration) -> String {
        let secs = elapsed.as_secs_f64().round() as u64;
        match scan_mode {
            ScanMode::Simple if self.ddl_diffs == 0 => {
                format!("Summary ({secs} seconds): No DDL differences found.")
            }
            ScanMode::Simple => {
                format!("Summary ({secs} seconds): DDL Differences found: {}", self.ddl_diffs)
            }
            ScanMode::Detailed if self.ddl_diffs == 0 && self.row_count_diffs == 0 => {
                format!("Summary ({secs} seconds): No DDL differences found.")
            }
            ScanMode::Detailed => format!(
                "Summary ({secs} seconds): DDL Differences found: ddl ({})  rowcnts ({})",
                self.ddl_diffs, self.row_count_diffs
            ),
        }
    }
}

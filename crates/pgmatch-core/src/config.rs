use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::handle::{SchemaHandle, Side};

/// Row-count reconciliation tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanMode {
    /// Report planner-estimate mismatches as they are.
    #[serde(alias = "simplescan")]
    Simple,
    /// Confirm estimate mismatches with an exact count before reporting.
    #[serde(alias = "detailedscan")]
    Detailed,
}

impl ScanMode {
    pub fn label(self) -> &'static str {
        match self {
            ScanMode::Simple => "simplescan",
            ScanMode::Detailed => "detailedscan",
        }
    }
}

impl fmt::Display for ScanMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ScanMode {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "simplescan" | "simple" => Ok(ScanMode::Simple),
            "detailedscan" | "detailed" => Ok(ScanMode::Detailed),
            other => Err(Error::Other(format!(
                "Scantype invalid: {other}.  Must be \"SimpleScan\" or \"DetailedScan\""
            ))),
        }
    }
}

/// Immutable settings for one comparison run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub source: SchemaHandle,
    pub target: SchemaHandle,
    pub scan_mode: ScanMode,
    pub ignore_row_counts: bool,
    pub ignore_indexes: bool,
}

impl RunConfig {
    pub fn handle(&self, side: Side) -> &SchemaHandle {
        match side {
            Side::Source => &self.source,
            Side::Target => &self.target,
        }
    }

    pub fn schema(&self, side: Side) -> &str {
        &self.handle(side).schema
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_scan_mode_case_insensitively() {
        assert_eq!("SimpleScan".parse::<ScanMode>().unwrap(), ScanMode::Simple);
        assert_eq!(
            "DETAILEDSCAN".parse::<ScanMode>().unwrap(),
            ScanMode::Detailed
        );
        assert!("fullscan".parse::<ScanMode>().is_err());
    }
}

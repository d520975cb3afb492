use std::fmt;

use serde::{Deserialize, Serialize};

/// Severity attached to log lines and diff records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Info,
    Debug,
    Warn,
    Error,
    Fatal,
    Diff,
}

impl Severity {
    pub fn label(self) -> &'static str {
        match self {
            Severity::Info => "INFO",
            Severity::Debug => "DEBUG",
            Severity::Warn => "WARN",
            Severity::Error => "ERROR",
            Severity::Fatal => "FATAL",
            Severity::Diff => "DIFF",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Run-scoped counter a diff contributes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Counter {
    /// Structural differences.
    Ddl,
    /// Row volume differences.
    RowCount,
}

/// Comparison family a diff belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    ObjectCount,
    Comments,
    Tables,
    Views,
    Columns,
    Attributes,
    Constraints,
    Indexes,
    RowCounts,
}

impl Category {
    pub fn label(self) -> &'static str {
        match self {
            Category::ObjectCount => "Object Count Diff",
            Category::Comments => "Comments Diff",
            Category::Tables => "Tables Diff",
            Category::Views => "Views Diff",
            Category::Columns => "Columns Diff",
            Category::Attributes => "Attributes Diff",
            Category::Constraints => "Constraints Diff",
            Category::Indexes => "Indexes Diff",
            Category::RowCounts => "Row Counts Diff",
        }
    }

    pub fn counter(self) -> Counter {
        match self {
            Category::RowCounts => Counter::RowCount,
            _ => Counter::Ddl,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One reported discrepancy between the two schemas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffRecord {
    pub category: Category,
    pub severity: Severity,
    pub message: String,
    /// Name of the object the diff is about, when there is a single one.
    pub object: Option<String>,
}

impl DiffRecord {
    pub fn new(category: Category, object: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            category,
            severity: Severity::Diff,
            message: message.into(),
            object: Some(object.into()),
        }
    }
}

impl fmt::Display for DiffRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:>20}: {}", self.category.label(), self.message)
    }
}

use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of table constraint (`pg_constraint.contype`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintKind {
    Check,
    ForeignKey,
    PrimaryKey,
    Unique,
    Trigger,
    Exclusion,
    NotNull,
    Other(String),
}

impl fmt::Display for ConstraintKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstraintKind::Check => f.write_str("CHECK CONSTRAINT"),
            ConstraintKind::ForeignKey => f.write_str("FOREIGN KEY"),
            ConstraintKind::PrimaryKey => f.write_str("PRIMARY KEY"),
            ConstraintKind::Unique => f.write_str("UNIQUE CONSTRAINT"),
            ConstraintKind::Trigger => f.write_str("TRIGGER"),
            ConstraintKind::Exclusion => f.write_str("EXCLUSION CONSTRAINT"),
            ConstraintKind::NotNull => f.write_str("NOT NULL"),
            ConstraintKind::Other(code) => write!(f, "UNKNOWN ({code})"),
        }
    }
}

/// Foreign key action semantics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FkAction {
    NoAction,
    Restrict,
    Cascade,
    SetNull,
    SetDefault,
    Unknown,
}

impl fmt::Display for FkAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FkAction::NoAction => "NO ACTION",
            FkAction::Restrict => "RESTRICT",
            FkAction::Cascade => "CASCADE",
            FkAction::SetNull => "SET NULL",
            FkAction::SetDefault => "SET DEFAULT",
            FkAction::Unknown => "UNKNOWN",
        })
    }
}

/// Foreign key match semantics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FkMatchType {
    Full,
    Partial,
    Simple,
    Unknown,
}

impl fmt::Display for FkMatchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FkMatchType::Full => "FULL",
            FkMatchType::Partial => "PARTIAL",
            FkMatchType::Simple => "SIMPLE",
            FkMatchType::Unknown => "UNKNOWN",
        })
    }
}

/// A table constraint. Identity key is `(table_name, constraint_name)`.
///
/// Foreign key attributes are `None` for every other constraint kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstraintDescriptor {
    pub table_name: String,
    pub constraint_name: String,
    pub kind: ConstraintKind,
    pub on_update: Option<FkAction>,
    pub on_delete: Option<FkAction>,
    pub match_type: Option<FkMatchType>,
    pub local_key_positions: Option<Vec<i16>>,
    pub foreign_key_positions: Option<Vec<i16>>,
    /// Output of `pg_get_constraintdef`.
    pub definition: String,
    /// Comma-joined constrained columns, in key order.
    pub column_list: Option<String>,
}

/// An index on a base table. Identity key is `(table_name, index_name)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexDescriptor {
    pub table_name: String,
    pub index_name: String,
    pub total_attr_count: i16,
    pub key_attr_count: i16,
    pub is_unique: bool,
    pub is_primary: bool,
    pub is_exclusion: bool,
    pub is_immediate: bool,
    pub is_clustered: bool,
    pub is_valid: bool,
    pub is_ready: bool,
    pub is_live: bool,
    pub key_positions: Vec<i16>,
    /// Comma-joined key column expressions.
    pub key_columns: String,
    /// Output of `pg_get_indexdef`.
    pub definition: String,
}

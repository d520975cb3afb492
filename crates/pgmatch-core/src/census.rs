use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Result of probing one server for the metadata surface pgmatch relies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityProbe {
    /// Whether `pg_proc` exposes the `prokind` discriminator.
    pub has_routine_kind: bool,
    /// Value of the `server_version_num` setting, e.g. `150004`.
    pub server_version_num: i32,
}

/// How routines are classified when counting commented objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoutineMode {
    /// function / procedure / aggregate / window, from `prokind`.
    Modern,
    /// function / aggregate, from `proisagg`.
    Legacy,
}

/// Object kinds counted per schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
    RegularTables,
    UnloggedTables,
    ChildTables,
    ParentTables,
    TotalTables,
    ForeignTables,
    Sequences,
    Identities,
    Indexes,
    Views,
    PublicViews,
    MaterializedViews,
    Functions,
    Types,
    TriggerFunctions,
    Triggers,
    Collations,
    Domains,
    Rules,
    Policies,
}

impl ObjectKind {
    pub const ALL: [ObjectKind; 20] = [
        ObjectKind::RegularTables,
        ObjectKind::UnloggedTables,
        ObjectKind::ChildTables,
        ObjectKind::ParentTables,
        ObjectKind::TotalTables,
        ObjectKind::ForeignTables,
        ObjectKind::Sequences,
        ObjectKind::Identities,
        ObjectKind::Indexes,
        ObjectKind::Views,
        ObjectKind::PublicViews,
        ObjectKind::MaterializedViews,
        ObjectKind::Functions,
        ObjectKind::Types,
        ObjectKind::TriggerFunctions,
        ObjectKind::Triggers,
        ObjectKind::Collations,
        ObjectKind::Domains,
        ObjectKind::Rules,
        ObjectKind::Policies,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ObjectKind::RegularTables => "Regular table",
            ObjectKind::UnloggedTables => "Unlogged table",
            ObjectKind::ChildTables => "Child table",
            ObjectKind::ParentTables => "Parent table",
            ObjectKind::TotalTables => "Total table",
            ObjectKind::ForeignTables => "Foreign table",
            ObjectKind::Sequences => "Sequences",
            ObjectKind::Identities => "Identities",
            ObjectKind::Indexes => "Indexes",
            ObjectKind::Views => "Views",
            ObjectKind::PublicViews => "Public Views",
            ObjectKind::MaterializedViews => "Materialized Views",
            ObjectKind::Functions => "Functions",
            ObjectKind::Types => "Types",
            ObjectKind::TriggerFunctions => "Trigger Functions",
            ObjectKind::Triggers => "Triggers",
            ObjectKind::Collations => "Collations",
            ObjectKind::Domains => "Domains",
            ObjectKind::Rules => "Rules",
            ObjectKind::Policies => "Policies",
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Per-kind object counts for one schema.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectCensus {
    counts: BTreeMap<ObjectKind, i64>,
}

impl ObjectCensus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, kind: ObjectKind, count: i64) {
        self.counts.insert(kind, count);
    }

    pub fn get(&self, kind: ObjectKind) -> Option<i64> {
        self.counts.get(&kind).copied()
    }

    pub fn kinds(&self) -> impl Iterator<Item = ObjectKind> + '_ {
        self.counts.keys().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

impl FromIterator<(ObjectKind, i64)> for ObjectCensus {
    fn from_iter<I: IntoIterator<Item = (ObjectKind, i64)>>(iter: I) -> Self {
        Self {
            counts: iter.into_iter().collect(),
        }
    }
}

/// Counts of objects carrying a descriptive comment, keyed by kind label
/// (`TABLE`, `COLUMN`, `FUNCTION`, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentCensus {
    counts: BTreeMap<String, i64>,
}

impl CommentCensus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, kind: impl Into<String>, count: i64) {
        self.counts.insert(kind.into(), count);
    }

    pub fn get(&self, kind: &str) -> Option<i64> {
        self.counts.get(kind).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> + '_ {
        self.counts.iter().map(|(kind, count)| (kind.as_str(), *count))
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, i64)> for CommentCensus {
    fn from_iter<I: IntoIterator<Item = (K, i64)>>(iter: I) -> Self {
        Self {
            counts: iter
                .into_iter()
                .map(|(kind, count)| (kind.into(), count))
                .collect(),
        }
    }
}

use serde::{Deserialize, Serialize};

/// A base table as described by `pg_tables`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDescriptor {
    pub name: String,
    pub owner: String,
    /// `None` when the table lives in the database default tablespace.
    pub tablespace: Option<String>,
    pub has_indexes: bool,
    pub has_rules: bool,
    pub has_triggers: bool,
    pub row_security: bool,
}

/// A view as described by `information_schema.views`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewDescriptor {
    pub name: String,
    /// Hidden (`None`) unless the connected role owns the view.
    pub definition: Option<String>,
    pub check_option: String,
    pub is_updatable: bool,
    pub is_insertable_into: bool,
    pub is_trigger_updatable: bool,
    pub is_trigger_deletable: bool,
    pub is_trigger_insertable_into: bool,
}

/// Column metadata for a base table.
///
/// Identity key is `(table_name, column_name)`; rows arrive ordered by
/// `(table_name, ordinal_position)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    pub table_name: String,
    pub ordinal_position: i32,
    pub column_name: String,
    pub default_expr: Option<String>,
    pub is_nullable: bool,
    pub data_type: String,
    pub char_max_len: Option<i32>,
    pub numeric_precision_radix: Option<i32>,
    pub numeric_scale: Option<i32>,
    pub is_identity: bool,
    pub is_generated: bool,
}

/// Row volume statistics for one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowCountPair {
    pub table_name: String,
    /// Planner estimate (`pg_class.reltuples`); negative when never analyzed.
    pub estimated_count: i64,
    /// Live tuple statistic (`pg_stat_user_tables.n_live_tup`).
    pub live_tuple_count: i64,
}

impl RowCountPair {
    /// Planner estimate, or the live-tuple statistic when no estimate exists yet.
    pub fn best_estimate(&self) -> i64 {
        if self.estimated_count < 0 {
            self.live_tuple_count
        } else {
            self.estimated_count
        }
    }
}

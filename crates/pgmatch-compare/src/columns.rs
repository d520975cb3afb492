use std::collections::HashMap;
use std::fmt::Display;

use tracing::debug;

use pgmatch_core::{Category, ColumnDescriptor, DiffRecord};

use crate::align::align;
use crate::display::opt;
use crate::normalize::strip_qualifier;

/// Columns grouped per table, tables in first-seen order.
struct TableRuns<'a> {
    order: Vec<&'a str>,
    runs: HashMap<&'a str, Vec<&'a ColumnDescriptor>>,
}

impl<'a> TableRuns<'a> {
    fn new(columns: &'a [ColumnDescriptor]) -> Self {
        let mut order = Vec::new();
        let mut runs: HashMap<&'a str, Vec<&'a ColumnDescriptor>> = HashMap::new();
        for column in columns {
            let table = column.table_name.as_str();
            runs.entry(table)
                .or_insert_with(|| {
                    order.push(table);
                    Vec::new()
                })
                .push(column);
        }
        Self { order, runs }
    }

    fn get(&self, table: &str) -> Option<&[&'a ColumnDescriptor]> {
        self.runs.get(table).map(Vec::as_slice)
    }

    fn iter(&self) -> impl Iterator<Item = (&'a str, &[&'a ColumnDescriptor])> + '_ {
        self.order
            .iter()
            .filter_map(|table| self.get(table).map(|run| (*table, run)))
    }
}

fn fingerprint(run: &[&ColumnDescriptor]) -> String {
    let mut names: Vec<&str> = run.iter().map(|col| col.column_name.as_str()).collect();
    names.sort_unstable();
    names.join(",")
}

/// Compare the sorted column-name list of each source table with the target's.
///
/// Tables the target lacks are skipped; the relation pass reports them.
pub fn compare_column_sets(
    source: &[ColumnDescriptor],
    target: &[ColumnDescriptor],
) -> Vec<DiffRecord> {
    let source_runs = TableRuns::new(source);
    let target_runs = TableRuns::new(target);
    let mut diffs = Vec::new();

    for (table, source_run) in source_runs.iter() {
        let Some(target_run) = target_runs.get(table) else {
            debug!(table, "table not in target, skipping column set check");
            continue;
        };
        if fingerprint(source_run) != fingerprint(target_run) {
            diffs.push(DiffRecord::new(
                Category::Columns,
                table,
                format!("Table ({table}) Columns Mismatch"),
            ));
        }
    }

    diffs
}

struct ColumnDiffs<'a> {
    table: &'a str,
    column: &'a str,
    diffs: Vec<DiffRecord>,
}

impl ColumnDiffs<'_> {
    fn check<T: PartialEq + Display>(&mut self, attribute: &str, source: T, target: T) {
        if source != target {
            self.push(attribute, source, target);
        }
    }

    fn push<T: Display>(&mut self, attribute: &str, source: T, target: T) {
        self.diffs.push(DiffRecord::new(
            Category::Attributes,
            format!("{}.{}", self.table, self.column),
            format!(
                "Table ({}) column ({}) {attribute} mismatch ({source}<>{target})",
                self.table, self.column
            ),
        ));
    }
}

fn defaults_match(
    source: Option<&str>,
    target: Option<&str>,
    source_schema: &str,
    target_schema: &str,
) -> bool {
    match (source, target) {
        (Some(s), Some(t)) => {
            s == t || strip_qualifier(s, source_schema) == strip_qualifier(t, target_schema)
        }
        (None, None) => true,
        _ => false,
    }
}

/// Diff attributes of every column present in both schemas, over every
/// table present in both.
pub fn compare_column_attributes(
    source: &[ColumnDescriptor],
    target: &[ColumnDescriptor],
    source_schema: &str,
    target_schema: &str,
) -> Vec<DiffRecord> {
    let source_runs = TableRuns::new(source);
    let target_runs = TableRuns::new(target);
    let mut diffs = Vec::new();

    for (table, source_run) in source_runs.iter() {
        let Some(target_run) = target_runs.get(table) else {
            continue;
        };

        let aligned = align(source_run, target_run, |col| col.column_name.as_str());
        for (s, t) in aligned.matched {
            let mut column = ColumnDiffs {
                table,
                column: &s.column_name,
                diffs: Vec::new(),
            };

            column.check("Ordinal Position", s.ordinal_position, t.ordinal_position);
            if !defaults_match(
                s.default_expr.as_deref(),
                t.default_expr.as_deref(),
                source_schema,
                target_schema,
            ) {
                column.push(
                    "Default",
                    opt(s.default_expr.as_deref()),
                    opt(t.default_expr.as_deref()),
                );
            }
            column.check("Is Nullable", s.is_nullable, t.is_nullable);
            column.check("Data Type", s.data_type.as_str(), t.data_type.as_str());
            column.check("Char Max Len", opt(s.char_max_len), opt(t.char_max_len));
            column.check(
                "Numeric Precision Radix",
                opt(s.numeric_precision_radix),
                opt(t.numeric_precision_radix),
            );
            column.check("Numeric Scale", opt(s.numeric_scale), opt(t.numeric_scale));
            column.check("Is Identity", s.is_identity, t.is_identity);
            column.check("Is Generated", s.is_generated, t.is_generated);

            diffs.extend(column.diffs);
        }
    }

    diffs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(table: &str, position: i32, name: &str) -> ColumnDescriptor {
        ColumnDescriptor {
            table_name: table.to_string(),
            ordinal_position: position,
            column_name: name.to_string(),
            default_expr: None,
            is_nullable: true,
            data_type: "integer".to_string(),
            char_max_len: None,
            numeric_precision_radix: Some(2),
            numeric_scale: Some(0),
            is_identity: false,
            is_generated: false,
        }
    }

    #[test]
    fn column_set_mismatch_is_one_diff_per_table() {
        let source = vec![column("t1", 1, "id"), column("t1", 2, "amount")];
        let target = vec![column("t1", 1, "id"), column("t1", 2, "total")];

        let diffs = compare_column_sets(&source, &target);
        assert_eq!(diffs.len(), 1);
        assert_eq!(diffs[0].message, "Table (t1) Columns Mismatch");
        assert_eq!(diffs[0].category, Category::Columns);
    }

    #[test]
    fn column_order_does_not_change_the_fingerprint() {
        let source = vec![column("t1", 1, "id"), column("t1", 2, "amount")];
        let target = vec![column("t1", 1, "amount"), column("t1", 2, "id")];
        assert!(compare_column_sets(&source, &target).is_empty());
    }

    #[test]
    fn tables_missing_from_target_are_skipped() {
        let source = vec![column("gone", 1, "id")];
        assert!(compare_column_sets(&source, &[]).is_empty());
        assert!(compare_column_attributes(&source, &[], "a", "b").is_empty());
    }

    #[test]
    fn numeric_scale_mismatch_names_column() {
        let mut source_amount = column("t1", 2, "amount");
        source_amount.data_type = "numeric".to_string();
        source_amount.numeric_precision_radix = Some(10);
        source_amount.numeric_scale = Some(2);
        let mut target_amount = source_amount.clone();
        target_amount.numeric_scale = Some(0);

        let diffs = compare_column_attributes(&[source_amount], &[target_amount], "a", "b");
        assert_eq!(diffs.len(), 1);
        assert_eq!(diffs[0].category, Category::Attributes);
        assert_eq!(diffs[0].object.as_deref(), Some("t1.amount"));
        assert!(diffs[0].message.contains("column (amount)"));
        assert!(diffs[0].message.contains("Numeric Scale mismatch (2<>0)"));
    }

    #[test]
    fn sequence_defaults_ignore_own_schema() {
        let mut source_id = column("t1", 1, "id");
        source_id.default_expr = Some("nextval('shop.t1_id_seq'::regclass)".to_string());
        let mut target_id = column("t1", 1, "id");
        target_id.default_expr = Some("nextval('shop_copy.t1_id_seq'::regclass)".to_string());

        let diffs = compare_column_attributes(&[source_id], &[target_id], "shop", "shop_copy");
        assert!(diffs.is_empty());
    }

    #[test]
    fn attribute_pass_covers_every_common_table() {
        let source = vec![column("a", 1, "id"), column("b", 1, "id")];
        let mut target = source.clone();
        target[0].is_nullable = false;
        target[1].data_type = "bigint".to_string();

        let diffs = compare_column_attributes(&source, &target, "s", "t");
        assert_eq!(diffs.len(), 2);
        assert!(diffs[0].message.starts_with("Table (a)"));
        assert!(diffs[1].message.contains("Data Type mismatch (integer<>bigint)"));
    }
}

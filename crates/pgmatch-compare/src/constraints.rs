use std::collections::HashSet;
use std::fmt::Display;

use pgmatch_core::{Category, ConstraintDescriptor, DiffRecord, IndexDescriptor};

use crate::align::align;
use crate::display::{opt, opt_positions, positions};
use crate::normalize::definitions_match;

fn tables_of<'a, T>(items: &'a [T], table: impl Fn(&'a T) -> &'a str) -> HashSet<&'a str> {
    items.iter().map(table).collect()
}

fn constraint_attribute<T: Display>(
    diffs: &mut Vec<DiffRecord>,
    con: &ConstraintDescriptor,
    attribute: &str,
    source: T,
    target: T,
) {
    diffs.push(DiffRecord::new(
        Category::Constraints,
        format!("{}.{}", con.table_name, con.constraint_name),
        format!(
            "{attribute} mismatch ({source}<>{target}) Table({}) Constraint({})",
            con.table_name, con.constraint_name
        ),
    ));
}

fn missing_constraint(
    con: &ConstraintDescriptor,
    missing_side: &str,
    other_has_table: bool,
) -> DiffRecord {
    let message = if other_has_table {
        format!(
            "{missing_side} constraint name not found. Table({})  Constraint({})",
            con.table_name, con.constraint_name
        )
    } else {
        format!(
            "{missing_side} constraint table not found. Table({})  Missing at least one constraint:{}-{}",
            con.table_name, con.kind, con.constraint_name
        )
    };
    DiffRecord::new(
        Category::Constraints,
        format!("{}.{}", con.table_name, con.constraint_name),
        message,
    )
}

/// Align constraints by (table, name) and diff each matched pair.
pub fn compare_constraints(
    source: &[ConstraintDescriptor],
    target: &[ConstraintDescriptor],
    source_schema: &str,
    target_schema: &str,
) -> Vec<DiffRecord> {
    let aligned = align(source, target, |con| {
        (con.table_name.as_str(), con.constraint_name.as_str())
    });
    let mut diffs = Vec::new();

    for (s, t) in aligned.matched {
        if s.kind != t.kind {
            constraint_attribute(&mut diffs, s, "Constraint Type", &s.kind, &t.kind);
        }
        if s.on_update != t.on_update {
            constraint_attribute(
                &mut diffs,
                s,
                "ConfUpdType",
                opt(s.on_update.as_ref()),
                opt(t.on_update.as_ref()),
            );
        }
        if s.on_delete != t.on_delete {
            constraint_attribute(
                &mut diffs,
                s,
                "ConfDelType",
                opt(s.on_delete.as_ref()),
                opt(t.on_delete.as_ref()),
            );
        }
        if s.match_type != t.match_type {
            constraint_attribute(
                &mut diffs,
                s,
                "ConfMatchType",
                opt(s.match_type.as_ref()),
                opt(t.match_type.as_ref()),
            );
        }
        if s.local_key_positions != t.local_key_positions {
            constraint_attribute(
                &mut diffs,
                s,
                "ConKey",
                opt_positions(s.local_key_positions.as_deref()),
                opt_positions(t.local_key_positions.as_deref()),
            );
        }
        if s.foreign_key_positions != t.foreign_key_positions {
            constraint_attribute(
                &mut diffs,
                s,
                "ConfKey",
                opt_positions(s.foreign_key_positions.as_deref()),
                opt_positions(t.foreign_key_positions.as_deref()),
            );
        }
        if s.column_list != t.column_list {
            constraint_attribute(
                &mut diffs,
                s,
                "Columns",
                opt(s.column_list.as_deref()),
                opt(t.column_list.as_deref()),
            );
        }
        if !definitions_match(&s.definition, &t.definition, source_schema, target_schema) {
            constraint_attribute(&mut diffs, s, "ConstraintDef", &s.definition, &t.definition);
        }
    }

    let source_tables = tables_of(source, |con| con.table_name.as_str());
    let target_tables = tables_of(target, |con| con.table_name.as_str());
    for con in aligned.source_only {
        diffs.push(missing_constraint(
            con,
            "Target",
            target_tables.contains(con.table_name.as_str()),
        ));
    }
    for con in aligned.target_only {
        diffs.push(missing_constraint(
            con,
            "Source",
            source_tables.contains(con.table_name.as_str()),
        ));
    }

    diffs
}

fn index_attribute<T: Display>(
    diffs: &mut Vec<DiffRecord>,
    index: &IndexDescriptor,
    attribute: &str,
    source: T,
    target: T,
) {
    diffs.push(DiffRecord::new(
        Category::Indexes,
        format!("{}.{}", index.table_name, index.index_name),
        format!(
            "Index {attribute} mismatch for table({}) index({}): ({source}<>{target})",
            index.table_name, index.index_name
        ),
    ));
}

fn missing_index(index: &IndexDescriptor, missing_side: &str, other_has_table: bool) -> DiffRecord {
    let message = if other_has_table {
        format!(
            "{missing_side} index name not found. Table({})  Index({})",
            index.table_name, index.index_name
        )
    } else {
        format!(
            "{missing_side} index table not found. Table({}).  Missing at least one index:{}",
            index.table_name, index.index_name
        )
    };
    DiffRecord::new(
        Category::Indexes,
        format!("{}.{}", index.table_name, index.index_name),
        message,
    )
}

macro_rules! check_flag {
    ($diffs:expr, $s:expr, $t:expr, $field:ident, $label:literal) => {
        if $s.$field != $t.$field {
            index_attribute($diffs, $s, $label, $s.$field, $t.$field);
        }
    };
}

/// Align indexes by (table, name) and diff each matched pair.
pub fn compare_indexes(
    source: &[IndexDescriptor],
    target: &[IndexDescriptor],
    source_schema: &str,
    target_schema: &str,
) -> Vec<DiffRecord> {
    let aligned = align(source, target, |index| {
        (index.table_name.as_str(), index.index_name.as_str())
    });
    let mut diffs = Vec::new();

    for (s, t) in aligned.matched {
        check_flag!(&mut diffs, s, t, total_attr_count, "IndNatts");
        check_flag!(&mut diffs, s, t, key_attr_count, "KeyAtts");
        check_flag!(&mut diffs, s, t, is_unique, "IsUnique");
        check_flag!(&mut diffs, s, t, is_primary, "IsPrimary");
        check_flag!(&mut diffs, s, t, is_exclusion, "IsExclusion");
        check_flag!(&mut diffs, s, t, is_immediate, "IsImmediate");
        check_flag!(&mut diffs, s, t, is_clustered, "IsClustered");
        check_flag!(&mut diffs, s, t, is_valid, "IsValid");
        check_flag!(&mut diffs, s, t, is_ready, "IsReady");
        check_flag!(&mut diffs, s, t, is_live, "IsLive");

        if s.key_positions != t.key_positions {
            index_attribute(
                &mut diffs,
                s,
                "IndKey",
                positions(&s.key_positions),
                positions(&t.key_positions),
            );
        }
        if s.key_columns != t.key_columns {
            index_attribute(&mut diffs, s, "KeyCols", &s.key_columns, &t.key_columns);
        }
        if !definitions_match(&s.definition, &t.definition, source_schema, target_schema) {
            index_attribute(&mut diffs, s, "IndexDef", &s.definition, &t.definition);
        }
    }

    let source_tables = tables_of(source, |index| index.table_name.as_str());
    let target_tables = tables_of(target, |index| index.table_name.as_str());
    for index in aligned.source_only {
        diffs.push(missing_index(
            index,
            "Target",
            target_tables.contains(index.table_name.as_str()),
        ));
    }
    for index in aligned.target_only {
        diffs.push(missing_index(
            index,
            "Source",
            source_tables.contains(index.table_name.as_str()),
        ));
    }

    diffs
}

#[cfg(test)]
mod tests {
    use pgmatch_core::{ConstraintKind, FkAction, FkMatchType};

    use super::*;

    fn foreign_key(table: &str, name: &str, schema: &str) -> ConstraintDescriptor {
        ConstraintDescriptor {
            table_name: table.to_string(),
            constraint_name: name.to_string(),
            kind: ConstraintKind::ForeignKey,
            on_update: Some(FkAction::NoAction),
            on_delete: Some(FkAction::Cascade),
            match_type: Some(FkMatchType::Simple),
            local_key_positions: Some(vec![2]),
            foreign_key_positions: Some(vec![1]),
            definition: format!("FOREIGN KEY (customer_id) REFERENCES {schema}.customers(id)"),
            column_list: Some("customer_id".to_string()),
        }
    }

    fn index(table: &str, name: &str, schema: &str) -> IndexDescriptor {
        IndexDescriptor {
            table_name: table.to_string(),
            index_name: name.to_string(),
            total_attr_count: 1,
            key_attr_count: 1,
            is_unique: false,
            is_primary: false,
            is_exclusion: false,
            is_immediate: true,
            is_clustered: false,
            is_valid: true,
            is_ready: true,
            is_live: true,
            key_positions: vec![1],
            key_columns: "id".to_string(),
            definition: format!("CREATE INDEX {name} ON {schema}.{table} USING btree (id)"),
        }
    }

    #[test]
    fn qualified_references_are_normalized() {
        let source = vec![foreign_key("orders", "orders_customer_fk", "shop")];
        let target = vec![foreign_key("orders", "orders_customer_fk", "shop_copy")];
        assert!(compare_constraints(&source, &target, "shop", "shop_copy").is_empty());
    }

    #[test]
    fn fk_action_change_is_reported() {
        let source = vec![foreign_key("orders", "orders_customer_fk", "shop")];
        let mut changed = foreign_key("orders", "orders_customer_fk", "shop");
        changed.on_delete = Some(FkAction::Restrict);

        let diffs = compare_constraints(&source, &[changed], "shop", "shop");
        assert_eq!(diffs.len(), 1);
        assert!(diffs[0].message.starts_with("ConfDelType mismatch (CASCADE<>RESTRICT)"));
    }

    #[test]
    fn missing_table_and_missing_name_are_distinct() {
        let source = vec![
            foreign_key("orders", "orders_customer_fk", "s"),
            foreign_key("orders", "orders_extra_fk", "s"),
            foreign_key("refunds", "refunds_order_fk", "s"),
        ];
        let target = vec![foreign_key("orders", "orders_customer_fk", "s")];

        let diffs = compare_constraints(&source, &target, "s", "s");
        assert_eq!(diffs.len(), 2);
        assert!(diffs[0].message.starts_with("Target constraint name not found."));
        assert!(diffs[1].message.starts_with("Target constraint table not found."));
        assert!(diffs[1].message.ends_with("FOREIGN KEY-refunds_order_fk"));
    }

    #[test]
    fn index_differing_only_by_qualifier_matches() {
        let source = vec![index("t1", "idx_t1_id", "src")];
        let target = vec![index("t1", "idx_t1_id", "dst")];
        assert!(compare_indexes(&source, &target, "src", "dst").is_empty());
    }

    #[test]
    fn index_flags_and_presence_are_reported() {
        let source = vec![index("t1", "idx_t1_id", "s")];
        let mut target = vec![index("t1", "idx_t1_id", "s"), index("t2", "idx_t2_id", "s")];
        target[0].is_unique = true;

        let diffs = compare_indexes(&source, &target, "s", "s");
        assert_eq!(diffs.len(), 2);
        assert_eq!(
            diffs[0].message,
            "Index IsUnique mismatch for table(t1) index(idx_t1_id): (false<>true)"
        );
        assert!(diffs[1].message.starts_with("Source index table not found."));
    }

    #[test]
    fn target_only_constraint_is_reported_once_as_missing_in_source() {
        let source = vec![foreign_key("orders", "orders_customer_fk", "s")];
        let target = vec![
            foreign_key("orders", "orders_customer_fk", "s"),
            foreign_key("orders", "orders_audit_fk", "s"),
        ];

        let diffs = compare_constraints(&source, &target, "s", "s");
        assert_eq!(diffs.len(), 1);
        assert_eq!(
            diffs[0].message,
            "Source constraint name not found. Table(orders)  Constraint(orders_audit_fk)"
        );
        assert_eq!(diffs[0].object.as_deref(), Some("orders.orders_audit_fk"));
    }

    #[test]
    fn renamed_index_on_same_table_is_missing_on_each_side() {
        let source = vec![index("t1", "idx_t1_old", "s")];
        let target = vec![index("t1", "idx_t1_new", "s")];

        let diffs = compare_indexes(&source, &target, "s", "s");
        assert_eq!(diffs.len(), 2);
        assert_eq!(
            diffs[0].message,
            "Target index name not found. Table(t1)  Index(idx_t1_old)"
        );
        assert_eq!(
            diffs[1].message,
            "Source index name not found. Table(t1)  Index(idx_t1_new)"
        );
    }
}

use std::fmt::Display;

use pgmatch_core::{Category, DiffRecord, TableDescriptor, ViewDescriptor};

use crate::align::align;
use crate::display::opt;
use crate::normalize::definitions_match;

fn table_attribute<T: Display>(
    diffs: &mut Vec<DiffRecord>,
    table: &str,
    attribute: &str,
    source: T,
    target: T,
) {
    diffs.push(DiffRecord::new(
        Category::Tables,
        table,
        format!("{table} Source {attribute} ({source}) <> Target {attribute} ({target})"),
    ));
}

/// Align tables by name and diff every attribute of each matched pair.
pub fn compare_tables(source: &[TableDescriptor], target: &[TableDescriptor]) -> Vec<DiffRecord> {
    let aligned = align(source, target, |table| table.name.as_str());
    let mut diffs = Vec::new();

    for (s, t) in aligned.matched {
        let name = s.name.as_str();
        if s.owner != t.owner {
            table_attribute(&mut diffs, name, "Owner", &s.owner, &t.owner);
        }
        if s.tablespace != t.tablespace {
            table_attribute(
                &mut diffs,
                name,
                "TableSpace",
                opt(s.tablespace.as_deref()),
                opt(t.tablespace.as_deref()),
            );
        }
        if s.has_indexes != t.has_indexes {
            table_attribute(&mut diffs, name, "HasIndexes", s.has_indexes, t.has_indexes);
        }
        if s.has_rules != t.has_rules {
            table_attribute(&mut diffs, name, "HasRules", s.has_rules, t.has_rules);
        }
        if s.has_triggers != t.has_triggers {
            table_attribute(&mut diffs, name, "HasTriggers", s.has_triggers, t.has_triggers);
        }
        if s.row_security != t.row_security {
            table_attribute(&mut diffs, name, "RowSecurity", s.row_security, t.row_security);
        }
    }

    for table in aligned.source_only {
        diffs.push(DiffRecord::new(
            Category::Tables,
            &table.name,
            format!("Source table ({}) not found in Target", table.name),
        ));
    }
    for table in aligned.target_only {
        diffs.push(DiffRecord::new(
            Category::Tables,
            &table.name,
            format!("Target table ({}) not found in Source", table.name),
        ));
    }

    diffs
}

fn view_attribute(diffs: &mut Vec<DiffRecord>, view: &str, attribute: &str) {
    diffs.push(DiffRecord::new(
        Category::Views,
        view,
        format!("Source view ({view}) {attribute} <> Target"),
    ));
}

fn view_definitions_match(
    source: Option<&str>,
    target: Option<&str>,
    source_schema: &str,
    target_schema: &str,
) -> bool {
    match (source, target) {
        (Some(s), Some(t)) => definitions_match(s, t, source_schema, target_schema),
        (None, None) => true,
        _ => false,
    }
}

/// Align views by name and diff each matched pair. Definition text is
/// compared after rewriting the target's schema qualifier.
pub fn compare_views(
    source: &[ViewDescriptor],
    target: &[ViewDescriptor],
    source_schema: &str,
    target_schema: &str,
) -> Vec<DiffRecord> {
    let aligned = align(source, target, |view| view.name.as_str());
    let mut diffs = Vec::new();

    for (s, t) in aligned.matched {
        let name = s.name.as_str();
        if !view_definitions_match(
            s.definition.as_deref(),
            t.definition.as_deref(),
            source_schema,
            target_schema,
        ) {
            view_attribute(&mut diffs, name, "def");
        }
        if s.check_option != t.check_option {
            view_attribute(&mut diffs, name, "CheckOption");
        }
        if s.is_updatable != t.is_updatable {
            view_attribute(&mut diffs, name, "IsUpdatable");
        }
        if s.is_insertable_into != t.is_insertable_into {
            view_attribute(&mut diffs, name, "IsInsertable_into");
        }
        if s.is_trigger_updatable != t.is_trigger_updatable {
            view_attribute(&mut diffs, name, "IsTriggerUpdatable");
        }
        if s.is_trigger_deletable != t.is_trigger_deletable {
            view_attribute(&mut diffs, name, "IsTriggerDeletable");
        }
        if s.is_trigger_insertable_into != t.is_trigger_insertable_into {
            view_attribute(&mut diffs, name, "IsTriggerInsertable_into");
        }
    }

    for view in aligned.source_only {
        diffs.push(DiffRecord::new(
            Category::Views,
            &view.name,
            format!("Source view ({}) not found in Target", view.name),
        ));
    }
    for view in aligned.target_only {
        diffs.push(DiffRecord::new(
            Category::Views,
            &view.name,
            format!("Target view ({}) not found in Source", view.name),
        ));
    }

    diffs
}

use pgmatch_core::{
    ColumnDescriptor, CommentCensus, ConstraintDescriptor, Error, IndexDescriptor, ObjectCensus,
    ObjectKind, Result, RowCountPair, TableDescriptor, ViewDescriptor,
};

use crate::postgres::utils::{
    constraint_kind_from_code, fk_action_from_code, fk_match_from_code, generated_from_text,
    yes_no,
};

use super::queries::{
    RawCensus, RawColumn, RawCommentCount, RawConstraint, RawIndex, RawRowCount, RawTable,
    RawView,
};

pub fn map_census(raw: RawCensus) -> ObjectCensus {
    let total = raw.regular_tables + raw.unlogged_tables + raw.child_tables + raw.parent_tables;

    [
        (ObjectKind::RegularTables, raw.regular_tables),
        (ObjectKind::UnloggedTables, raw.unlogged_tables),
        (ObjectKind::ChildTables, raw.child_tables),
        (ObjectKind::ParentTables, raw.parent_tables),
        (ObjectKind::TotalTables, total),
        (ObjectKind::ForeignTables, raw.foreign_tables),
        (ObjectKind::Sequences, raw.sequences),
        (ObjectKind::Identities, raw.identities),
        (ObjectKind::Indexes, raw.indexes),
        (ObjectKind::Views, raw.views),
        (ObjectKind::PublicViews, raw.public_views),
        (ObjectKind::MaterializedViews, raw.materialized_views),
        (ObjectKind::Functions, raw.functions),
        (ObjectKind::Types, raw.types),
        (ObjectKind::TriggerFunctions, raw.trigger_functions),
        (ObjectKind::Triggers, raw.triggers),
        (ObjectKind::Collations, raw.collations),
        (ObjectKind::Domains, raw.domains),
        (ObjectKind::Rules, raw.rules),
        (ObjectKind::Policies, raw.policies),
    ]
    .into_iter()
    .collect()
}

pub fn map_comment_counts(raw: Vec<RawCommentCount>) -> CommentCensus {
    raw.into_iter().map(|row| (row.object, row.count)).collect()
}

pub fn map_tables(raw: Vec<RawTable>) -> Vec<TableDescriptor> {
    raw.into_iter()
        .map(|table| TableDescriptor {
            name: table.name,
            owner: table.owner,
            tablespace: table.tablespace,
            has_indexes: table.has_indexes,
            has_rules: table.has_rules,
            has_triggers: table.has_triggers,
            row_security: table.row_security,
        })
        .collect()
}

pub fn map_views(raw: Vec<RawView>) -> Vec<ViewDescriptor> {
    raw.into_iter()
        .map(|view| ViewDescriptor {
            name: view.name,
            definition: view.definition,
            check_option: view.check_option.unwrap_or_else(|| "NONE".to_string()),
            is_updatable: yes_no(view.is_updatable.as_deref()),
            is_insertable_into: yes_no(view.is_insertable_into.as_deref()),
            is_trigger_updatable: yes_no(view.is_trigger_updatable.as_deref()),
            is_trigger_deletable: yes_no(view.is_trigger_deletable.as_deref()),
            is_trigger_insertable_into: yes_no(view.is_trigger_insertable_into.as_deref()),
        })
        .collect()
}

pub fn map_columns(raw: Vec<RawColumn>) -> Vec<ColumnDescriptor> {
    raw.into_iter()
        .map(|column| ColumnDescriptor {
            table_name: column.table_name,
            ordinal_position: column.ordinal_position,
            column_name: column.column_name,
            default_expr: column.column_default,
            is_nullable: yes_no(column.is_nullable.as_deref()),
            data_type: column.data_type.unwrap_or_default(),
            char_max_len: column.character_maximum_length,
            numeric_precision_radix: column.numeric_precision_radix,
            numeric_scale: column.numeric_scale,
            is_identity: yes_no(column.is_identity.as_deref()),
            is_generated: generated_from_text(column.is_generated.as_deref()),
        })
        .collect()
}

pub fn map_constraints(raw: Vec<RawConstraint>) -> Vec<ConstraintDescriptor> {
    raw.into_iter()
        .map(|con| {
            let kind = constraint_kind_from_code(&con.kind_code);
            let is_fk = kind == pgmatch_core::ConstraintKind::ForeignKey;

            ConstraintDescriptor {
                table_name: con.table_name,
                constraint_name: con.constraint_name,
                on_update: is_fk.then(|| fk_action_from_code(&con.on_update_code)).flatten(),
                on_delete: is_fk.then(|| fk_action_from_code(&con.on_delete_code)).flatten(),
                match_type: is_fk.then(|| fk_match_from_code(&con.match_type_code)).flatten(),
                foreign_key_positions: if is_fk { con.foreign_key_positions } else { None },
                kind,
                local_key_positions: con.local_key_positions,
                definition: con.definition,
                column_list: con.column_list,
            }
        })
        .collect()
}

pub fn map_indexes(raw: Vec<RawIndex>) -> Vec<IndexDescriptor> {
    raw.into_iter()
        .map(|index| IndexDescriptor {
            table_name: index.table_name,
            index_name: index.index_name,
            total_attr_count: index.total_attr_count,
            key_attr_count: index.key_attr_count,
            is_unique: index.is_unique,
            is_primary: index.is_primary,
            is_exclusion: index.is_exclusion,
            is_immediate: index.is_immediate,
            is_clustered: index.is_clustered,
            is_valid: index.is_valid,
            is_ready: index.is_ready,
            is_live: index.is_live,
            key_positions: index.key_positions,
            key_columns: index.key_columns.unwrap_or_default(),
            definition: index.definition,
        })
        .collect()
}

/// The estimate and statistics halves of each row are joined on table name;
/// a row whose halves disagree means the query broke its own contract.
pub fn map_row_counts(raw: Vec<RawRowCount>) -> Result<Vec<RowCountPair>> {
    raw.into_iter()
        .map(|row| {
            if row.estimate_table != row.stats_table {
                return Err(Error::Invariant(format!(
                    "row count pairing mismatch: {} vs {}",
                    row.estimate_table, row.stats_table
                )));
            }
            Ok(RowCountPair {
                table_name: row.estimate_table,
                estimated_count: row.estimated_count,
                live_tuple_count: row.live_tuple_count,
            })
        })
        .collect()
}

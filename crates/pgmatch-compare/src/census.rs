use std::collections::BTreeSet;

use pgmatch_core::{Category, CommentCensus, DiffRecord, ObjectCensus};

/// Diff per-kind object counts. Each kind present on either side is checked once.
pub fn compare_object_census(source: &ObjectCensus, target: &ObjectCensus) -> Vec<DiffRecord> {
    let kinds: BTreeSet<_> = source.kinds().chain(target.kinds()).collect();

    kinds
        .into_iter()
        .filter_map(|kind| {
            let source_count = source.get(kind).unwrap_or(0);
            let target_count = target.get(kind).unwrap_or(0);
            (source_count != target_count).then(|| {
                DiffRecord::new(
                    Category::ObjectCount,
                    kind.label(),
                    format!(
                        "{:>18} mismatch ({:03}<>{:03})",
                        kind.label(),
                        source_count,
                        target_count
                    ),
                )
            })
        })
        .collect()
}

/// Diff commented-object counts: first kinds present on both sides, then
/// kinds present on only one side, in each direction.
pub fn compare_comment_census(
    source: &CommentCensus,
    target: &CommentCensus,
    source_schema: &str,
    target_schema: &str,
) -> Vec<DiffRecord> {
    let mut diffs = Vec::new();

    for (kind, source_count) in source.iter() {
        if let Some(target_count) = target.get(kind) {
            if source_count != target_count {
                diffs.push(DiffRecord::new(
                    Category::Comments,
                    kind,
                    format!("{kind}  source ({source_count})  target ({target_count})"),
                ));
            }
        }
    }

    for (kind, source_count) in source.iter() {
        if target.get(kind).is_none() {
            diffs.push(DiffRecord::new(
                Category::Comments,
                kind,
                format!(
                    "{kind:<19}  source comments ({source_count:04}) not found in target schema ({target_schema})."
                ),
            ));
        }
    }

    for (kind, target_count) in target.iter() {
        if source.get(kind).is_none() {
            diffs.push(DiffRecord::new(
                Category::Comments,
                kind,
                format!(
                    "{kind:<19}  target comments ({target_count:04}) not found in source schema ({source_schema})."
                ),
            ));
        }
    }

    diffs
}

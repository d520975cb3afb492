use pgmatch_core::{Category, DiffRecord, RowCountPair};

use crate::align::align;

/// A table whose best row estimate differs between the two schemas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EstimateMismatch {
    pub table_name: String,
    pub source_estimate: i64,
    pub target_estimate: i64,
}

/// Tables present on both sides whose estimates disagree.
///
/// Never-analyzed tables fall back to the live-tuple statistic.
pub fn find_estimate_mismatches(
    source: &[RowCountPair],
    target: &[RowCountPair],
) -> Vec<EstimateMismatch> {
    align(source, target, |pair| pair.table_name.as_str())
        .matched
        .into_iter()
        .filter_map(|(s, t)| {
            let (source_estimate, target_estimate) = (s.best_estimate(), t.best_estimate());
            (source_estimate != target_estimate).then(|| EstimateMismatch {
                table_name: s.table_name.clone(),
                source_estimate,
                target_estimate,
            })
        })
        .collect()
}

pub fn estimate_diff(mismatch: &EstimateMismatch) -> DiffRecord {
    DiffRecord::new(
        Category::RowCounts,
        &mismatch.table_name,
        format!(
            "{:<35} rowcnts mismatch {:08}<>{:08}",
            mismatch.table_name, mismatch.source_estimate, mismatch.target_estimate
        ),
    )
}

/// Diff for exact counts, `None` when they agree.
pub fn exact_count_diff(table_name: &str, source: i64, target: i64) -> Option<DiffRecord> {
    (source != target).then(|| {
        DiffRecord::new(
            Category::RowCounts,
            table_name,
            format!("{table_name:<35} Real rowcnts mismatch {source:08}<>{target:08}"),
        )
    })
}

use tracing::{debug, info, warn};

use pgmatch_catalog::CatalogReader;
use pgmatch_core::{Error, RoutineMode, RunConfig, ScanMode, Side};

use crate::census::{compare_comment_census, compare_object_census};
use crate::columns::{compare_column_attributes, compare_column_sets};
use crate::constraints::{compare_constraints, compare_indexes};
use crate::errors::CompareError;
use crate::gate::check_compatibility;
use crate::relations::{compare_tables, compare_views};
use crate::report::DiffReport;
use crate::rowcounts::{estimate_diff, exact_count_diff, find_estimate_mismatches};

fn require_rows<T>(rows: Vec<T>, phase: &'static str) -> Result<Vec<T>, CompareError> {
    if rows.is_empty() {
        Err(CompareError::Phase {
            phase,
            source: Error::NoRows(format!("{phase}: no rows returned")),
        })
    } else {
        Ok(rows)
    }
}

/// Runs every comparison phase of one source/target pair.
#[derive(Debug, Clone)]
pub struct ComparisonEngine {
    config: RunConfig,
}

impl ComparisonEngine {
    pub fn new(config: RunConfig) -> Self {
        Self { config }
    }

    /// Compare the two schemas, phase by phase.
    ///
    /// Any catalog failure aborts the run; diffs already recorded are logged
    /// but the partial report is discarded.
    pub async fn run(
        &self,
        source: &dyn CatalogReader,
        target: &dyn CatalogReader,
    ) -> Result<DiffReport, CompareError> {
        let mode = self.check_versions(source, target).await?;
        self.check_schemas(source, target).await?;

        let mut report = DiffReport::new();

        info!("PHASE 1: Comparing Object Counts...");
        self.compare_objects(source, target, mode, &mut report).await?;

        info!("PHASE 2: Comparing Tables/Views...");
        self.compare_relations(source, target, &mut report).await?;

        info!("PHASE 3: Comparing Columns...");
        self.compare_columns(source, target, &mut report).await?;

        if self.config.ignore_indexes {
            info!("Bypassing Index comparison...");
        } else {
            info!("PHASE 4: Comparing Constraints/Indexes...");
            self.compare_keys_indexes(source, target, &mut report).await?;
        }

        if self.config.ignore_row_counts {
            info!("Bypassing Row Count comparison...");
        } else {
            info!("PHASE 5: Comparing Row Counts...");
            if self.config.scan_mode == ScanMode::Simple {
                warn!(
                    "*** SimpleScan: Row Counts are statistically computed so make sure you run ANALYZE beforehand. ***"
                );
            }
            self.compare_row_counts(source, target, &mut report).await?;
        }

        Ok(report)
    }

    async fn check_versions(
        &self,
        source: &dyn CatalogReader,
        target: &dyn CatalogReader,
    ) -> Result<RoutineMode, CompareError> {
        let source_probe = source
            .probe_capabilities()
            .await
            .map_err(CompareError::phase("Source version check"))?;
        let target_probe = target
            .probe_capabilities()
            .await
            .map_err(CompareError::phase("Target version check"))?;
        debug!(
            source_version = source_probe.server_version_num,
            target_version = target_probe.server_version_num,
            "capabilities probed"
        );

        check_compatibility(&source_probe, &target_probe)
    }

    async fn check_schemas(
        &self,
        source: &dyn CatalogReader,
        target: &dyn CatalogReader,
    ) -> Result<(), CompareError> {
        for (side, reader) in [(Side::Source, source), (Side::Target, target)] {
            let schema = self.config.schema(side);
            let exists = reader
                .schema_exists(schema)
                .await
                .map_err(CompareError::phase("schema validation"))?;
            if !exists {
                return Err(CompareError::MissingSchema(format!(
                    "{side} schema ({schema}) not found."
                )));
            }
        }
        Ok(())
    }

    async fn compare_objects(
        &self,
        source: &dyn CatalogReader,
        target: &dyn CatalogReader,
        mode: RoutineMode,
        report: &mut DiffReport,
    ) -> Result<(), CompareError> {
        let (source_schema, target_schema) = self.schemas();

        let source_census = source
            .object_census(source_schema)
            .await
            .map_err(CompareError::phase("Source object count"))?;
        let target_census = target
            .object_census(target_schema)
            .await
            .map_err(CompareError::phase("Target object count"))?;
        report.extend(compare_object_census(&source_census, &target_census));

        let source_comments = source
            .comment_census(source_schema, mode)
            .await
            .map_err(CompareError::phase("Source comments"))?;
        let target_comments = target
            .comment_census(target_schema, mode)
            .await
            .map_err(CompareError::phase("Target comments"))?;
        if source_comments.is_empty() && target_comments.is_empty() {
            info!("No Comments in either schema.");
        } else {
            report.extend(compare_comment_census(
                &source_comments,
                &target_comments,
                source_schema,
                target_schema,
            ));
        }

        Ok(())
    }

    async fn compare_relations(
        &self,
        source: &dyn CatalogReader,
        target: &dyn CatalogReader,
        report: &mut DiffReport,
    ) -> Result<(), CompareError> {
        let (source_schema, target_schema) = self.schemas();

        let source_tables = source
            .tables(source_schema)
            .await
            .map_err(CompareError::phase("Source tables"))?;
        let source_tables = require_rows(source_tables, "Source tables")?;
        let target_tables = target
            .tables(target_schema)
            .await
            .map_err(CompareError::phase("Target tables"))?;
        let target_tables = require_rows(target_tables, "Target tables")?;
        report.extend(compare_tables(&source_tables, &target_tables));

        let source_views = source
            .views(source_schema)
            .await
            .map_err(CompareError::phase("Source views"))?;
        if source_views.is_empty() {
            info!(side = %Side::Source, "No views found");
        }
        let target_views = target
            .views(target_schema)
            .await
            .map_err(CompareError::phase("Target views"))?;
        if target_views.is_empty() {
            info!(side = %Side::Target, "No views found");
        }
        report.extend(compare_views(
            &source_views,
            &target_views,
            source_schema,
            target_schema,
        ));

        Ok(())
    }

    async fn compare_columns(
        &self,
        source: &dyn CatalogReader,
        target: &dyn CatalogReader,
        report: &mut DiffReport,
    ) -> Result<(), CompareError> {
        let (source_schema, target_schema) = self.schemas();

        let source_columns = source
            .columns(source_schema)
            .await
            .map_err(CompareError::phase("Source columns"))?;
        let source_columns = require_rows(source_columns, "Source columns")?;
        let target_columns = target
            .columns(target_schema)
            .await
            .map_err(CompareError::phase("Target columns"))?;
        let target_columns = require_rows(target_columns, "Target columns")?;

        report.extend(compare_column_sets(&source_columns, &target_columns));
        report.extend(compare_column_attributes(
            &source_columns,
            &target_columns,
            source_schema,
            target_schema,
        ));

        Ok(())
    }

    async fn compare_keys_indexes(
        &self,
        source: &dyn CatalogReader,
        target: &dyn CatalogReader,
        report: &mut DiffReport,
    ) -> Result<(), CompareError> {
        let (source_schema, target_schema) = self.schemas();

        let source_constraints = source
            .constraints(source_schema)
            .await
            .map_err(CompareError::phase("Source constraints"))?;
        if source_constraints.is_empty() {
            warn!(side = %Side::Source, "No constraints returned");
        }
        let target_constraints = target
            .constraints(target_schema)
            .await
            .map_err(CompareError::phase("Target constraints"))?;
        if target_constraints.is_empty() {
            warn!(side = %Side::Target, "No constraints returned");
        }
        report.extend(compare_constraints(
            &source_constraints,
            &target_constraints,
            source_schema,
            target_schema,
        ));

        let source_indexes = source
            .indexes(source_schema)
            .await
            .map_err(CompareError::phase("Source indexes"))?;
        if source_indexes.is_empty() {
            warn!(side = %Side::Source, "No indexes returned");
        }
        let target_indexes = target
            .indexes(target_schema)
            .await
            .map_err(CompareError::phase("Target indexes"))?;
        if target_indexes.is_empty() {
            warn!(side = %Side::Target, "No indexes returned");
        }
        report.extend(compare_indexes(
            &source_indexes,
            &target_indexes,
            source_schema,
            target_schema,
        ));

        Ok(())
    }

    async fn compare_row_counts(
        &self,
        source: &dyn CatalogReader,
        target: &dyn CatalogReader,
        report: &mut DiffReport,
    ) -> Result<(), CompareError> {
        let (source_schema, target_schema) = self.schemas();

        let source_counts = source
            .row_counts(source_schema)
            .await
            .map_err(CompareError::phase("Source row counts"))?;
        let source_counts = require_rows(source_counts, "Source row counts")?;
        let target_counts = target
            .row_counts(target_schema)
            .await
            .map_err(CompareError::phase("Target row counts"))?;
        let target_counts = require_rows(target_counts, "Target row counts")?;

        for mismatch in find_estimate_mismatches(&source_counts, &target_counts) {
            match self.config.scan_mode {
                ScanMode::Simple => report.record(estimate_diff(&mismatch)),
                ScanMode::Detailed => {
                    let table = mismatch.table_name.as_str();
                    debug!(
                        table,
                        source_estimate = mismatch.source_estimate,
                        target_estimate = mismatch.target_estimate,
                        "estimates differ, counting rows"
                    );
                    let source_exact = source
                        .exact_row_count(source_schema, table)
                        .await
                        .map_err(CompareError::phase("Source real row counts"))?;
                    let target_exact = target
                        .exact_row_count(target_schema, table)
                        .await
                        .map_err(CompareError::phase("Target real row counts"))?;
                    report.extend(exact_count_diff(table, source_exact, target_exact));
                }
            }
        }

        Ok(())
    }

    fn schemas(&self) -> (&str, &str) {
        (
            self.config.schema(Side::Source),
            self.config.schema(Side::Target),
        )
    }
}

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use pgmatch_catalog::CatalogReader;
use pgmatch_compare::{CompareError, ComparisonEngine};
use pgmatch_core::{
    CapabilityProbe, Category, ColumnDescriptor, CommentCensus, ConstraintDescriptor,
    ConstraintKind, Error, IndexDescriptor, ObjectCensus, ObjectKind, Result, RoutineMode,
    RowCountPair, RunConfig, ScanMode, SchemaHandle, TableDescriptor, ViewDescriptor,
};

#[derive(Debug, Clone)]
struct Snapshot {
    schema: String,
    probe: CapabilityProbe,
    census: ObjectCensus,
    comments: CommentCensus,
    tables: Vec<TableDescriptor>,
    views: Vec<ViewDescriptor>,
    columns: Vec<ColumnDescriptor>,
    constraints: Vec<ConstraintDescriptor>,
    indexes: Vec<IndexDescriptor>,
    row_counts: Vec<RowCountPair>,
    exact_counts: HashMap<String, i64>,
}

/// In-memory catalog that records exact-count requests.
struct FixtureCatalog {
    snapshot: Snapshot,
    exact_calls: Mutex<Vec<String>>,
    fail_indexes: bool,
}

impl FixtureCatalog {
    fn new(snapshot: Snapshot) -> Self {
        Self {
            snapshot,
            exact_calls: Mutex::new(Vec::new()),
            fail_indexes: false,
        }
    }

    fn exact_calls(&self) -> Vec<String> {
        self.exact_calls.lock().unwrap().clone()
    }

    fn check_schema(&self, schema: &str) -> Result<()> {
        if schema == self.snapshot.schema {
            Ok(())
        } else {
            Err(Error::Db(format!("unexpected schema {schema}")))
        }
    }
}

#[async_trait]
impl CatalogReader for FixtureCatalog {
    fn engine(&self) -> &'static str {
        "fixture"
    }

    async fn probe_capabilities(&self) -> Result<CapabilityProbe> {
        Ok(self.snapshot.probe)
    }

    async fn schema_exists(&self, schema: &str) -> Result<bool> {
        Ok(schema == self.snapshot.schema)
    }

    async fn object_census(&self, schema: &str) -> Result<ObjectCensus> {
        self.check_schema(schema)?;
        Ok(self.snapshot.census.clone())
    }

    async fn comment_census(&self, schema: &str, _mode: RoutineMode) -> Result<CommentCensus> {
        self.check_schema(schema)?;
        Ok(self.snapshot.comments.clone())
    }

    async fn tables(&self, schema: &str) -> Result<Vec<TableDescriptor>> {
        self.check_schema(schema)?;
        Ok(self.snapshot.tables.clone())
    }

    async fn views(&self, schema: &str) -> Result<Vec<ViewDescriptor>> {
        self.check_schema(schema)?;
        Ok(self.snapshot.views.clone())
    }

    async fn columns(&self, schema: &str) -> Result<Vec<ColumnDescriptor>> {
        self.check_schema(schema)?;
        Ok(self.snapshot.columns.clone())
    }

    async fn constraints(&self, schema: &str) -> Result<Vec<ConstraintDescriptor>> {
        self.check_schema(schema)?;
        Ok(self.snapshot.constraints.clone())
    }

    async fn indexes(&self, schema: &str) -> Result<Vec<IndexDescriptor>> {
        self.check_schema(schema)?;
        if self.fail_indexes {
            return Err(Error::Db("indexes diff: connection reset".to_string()));
        }
        Ok(self.snapshot.indexes.clone())
    }

    async fn row_counts(&self, schema: &str) -> Result<Vec<RowCountPair>> {
        self.check_schema(schema)?;
        Ok(self.snapshot.row_counts.clone())
    }

    async fn exact_row_count(&self, schema: &str, table: &str) -> Result<i64> {
        self.check_schema(schema)?;
        self.exact_calls.lock().unwrap().push(table.to_string());
        self.snapshot
            .exact_counts
            .get(table)
            .copied()
            .ok_or_else(|| Error::NoRows(table.to_string()))
    }
}

fn table(name: &str) -> TableDescriptor {
    TableDescriptor {
        name: name.to_string(),
        owner: "app".to_string(),
        tablespace: None,
        has_indexes: true,
        has_rules: false,
        has_triggers: false,
        row_security: false,
    }
}

fn column(table: &str, position: i32, name: &str, data_type: &str) -> ColumnDescriptor {
    ColumnDescriptor {
        table_name: table.to_string(),
        ordinal_position: position,
        column_name: name.to_string(),
        default_expr: None,
        is_nullable: position != 1,
        data_type: data_type.to_string(),
        char_max_len: None,
        numeric_precision_radix: Some(if data_type == "numeric" { 10 } else { 2 }),
        numeric_scale: Some(0),
        is_identity: false,
        is_generated: false,
    }
}

fn primary_key(table: &str) -> ConstraintDescriptor {
    ConstraintDescriptor {
        table_name: table.to_string(),
        constraint_name: format!("{table}_pkey"),
        kind: ConstraintKind::PrimaryKey,
        on_update: None,
        on_delete: None,
        match_type: None,
        local_key_positions: Some(vec![1]),
        foreign_key_positions: None,
        definition: "PRIMARY KEY (id)".to_string(),
        column_list: Some("id".to_string()),
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

fn view(name: &str, schema: &str) -> ViewDescriptor {
    ViewDescriptor {
        name: name.to_string(),
        definition: Some(format!(" SELECT t1.id\n   FROM {schema}.t1;")),
        check_option: "NONE".to_string(),
        is_updatable: true,
        is_insertable_into: true,
        is_trigger_updatable: false,
        is_trigger_deletable: false,
        is_trigger_insertable_into: false,
    }
}

fn rows(table: &str, estimate: i64) -> RowCountPair {
    RowCountPair {
        table_name: table.to_string(),
        estimated_count: estimate,
        live_tuple_count: estimate,
    }
}

/// A small schema with tables `t1`, `orders` and `big`.
fn shop(schema: &str) -> Snapshot {
    let names = ["big", "orders", "t1"];
    Snapshot {
        schema: schema.to_string(),
        probe: CapabilityProbe {
            has_routine_kind: true,
            server_version_num: 150_004,
        },
        census: [
            (ObjectKind::RegularTables, 3),
            (ObjectKind::TotalTables, 3),
            (ObjectKind::Indexes, 1),
        ]
        .into_iter()
        .collect(),
        comments: [("TABLE", 1)].into_iter().collect(),
        tables: names.iter().map(|name| table(name)).collect(),
        views: Vec::new(),
        columns: vec![
            column("big", 1, "id", "integer"),
            column("orders", 1, "id", "integer"),
            column("t1", 1, "id", "integer"),
            column("t1", 2, "amount", "numeric"),
        ],
        constraints: names.iter().map(|name| primary_key(name)).collect(),
        indexes: vec![index("t1", "idx_t1_id", schema)],
        row_counts: vec![rows("big", 1000), rows("orders", 10), rows("t1", 5)],
        exact_counts: [("big".to_string(), 1000)].into_iter().collect(),
    }
}

fn config(scan_mode: ScanMode) -> RunConfig {
    let handle = |schema: &str| SchemaHandle {
        host: "localhost".to_string(),
        port: 5432,
        user: "app".to_string(),
        database: "shop".to_string(),
        schema: schema.to_string(),
    };
    RunConfig {
        source: handle("shop"),
        target: handle("shop_clone"),
        scan_mode,
        ignore_row_counts: false,
        ignore_indexes: false,
    }
}

fn remove_table(snapshot: &mut Snapshot, name: &str) {
    snapshot.tables.retain(|table| table.name != name);
    snapshot.columns.retain(|col| col.table_name != name);
    snapshot.constraints.retain(|con| con.table_name != name);
    snapshot.indexes.retain(|index| index.table_name != name);
    snapshot.row_counts.retain(|pair| pair.table_name != name);
}

#[tokio::test]
async fn identical_schemas_have_no_diffs() {
    let source = FixtureCatalog::new(shop("shop"));
    let target = FixtureCatalog::new(shop("shop_clone"));

    for mode in [ScanMode::Simple, ScanMode::Detailed] {
        let report = ComparisonEngine::new(config(mode))
            .run(&source, &target)
            .await
            .unwrap();
        assert_eq!(report.ddl_diffs(), 0);
        assert_eq!(report.row_count_diffs(), 0);
        assert!(report.records().is_empty());
    }
    assert!(source.exact_calls().is_empty());
}

#[tokio::test]
async fn missing_table_is_reported_once() {
    let source = FixtureCatalog::new(shop("shop"));
    let mut target_snapshot = shop("shop_clone");
    remove_table(&mut target_snapshot, "orders");
    let target = FixtureCatalog::new(target_snapshot);

    let report = ComparisonEngine::new(config(ScanMode::Simple))
        .run(&source, &target)
        .await
        .unwrap();

    let table_diffs: Vec<_> = report
        .records()
        .iter()
        .filter(|diff| diff.category == Category::Tables)
        .collect();
    assert_eq!(table_diffs.len(), 1);
    assert_eq!(
        table_diffs[0].message,
        "Source table (orders) not found in Target"
    );
    assert!(
        !report
            .records()
            .iter()
            .any(|diff| diff.message.contains("not found in Source"))
    );
    assert_eq!(report.ddl_diffs() as usize, report.records().len());
}

#[tokio::test]
async fn target_only_table_is_reported_from_the_other_side() {
    let mut source_snapshot = shop("shop");
    remove_table(&mut source_snapshot, "orders");
    let source = FixtureCatalog::new(source_snapshot);
    let target = FixtureCatalog::new(shop("shop_clone"));

    let report = ComparisonEngine::new(config(ScanMode::Simple))
        .run(&source, &target)
        .await
        .unwrap();

    let messages: Vec<&str> = report
        .records()
        .iter()
        .filter(|diff| diff.category == Category::Tables)
        .map(|diff| diff.message.as_str())
        .collect();
    assert_eq!(messages, vec!["Target table (orders) not found in Source"]);
}

#[tokio::test]
async fn numeric_scale_change_is_one_attribute_diff() {
    let mut source_snapshot = shop("shop");
    source_snapshot.columns[3].numeric_scale = Some(2);
    let source = FixtureCatalog::new(source_snapshot);
    let target = FixtureCatalog::new(shop("shop_clone"));

    let report = ComparisonEngine::new(config(ScanMode::Simple))
        .run(&source, &target)
        .await
        .unwrap();

    assert_eq!(report.records().len(), 1);
    let diff = &report.records()[0];
    assert_eq!(diff.category, Category::Attributes);
    assert_eq!(diff.object.as_deref(), Some("t1.amount"));
    assert!(diff.message.contains("Numeric Scale mismatch (2<>0)"));
    assert_eq!(report.ddl_diffs(), 1);
}

#[tokio::test]
async fn index_qualified_by_other_schema_is_not_a_diff() {
    let source = FixtureCatalog::new(shop("shop"));
    let target_snapshot = shop("shop_clone");
    assert!(target_snapshot.indexes[0].definition.contains("shop_clone.t1"));
    let target = FixtureCatalog::new(target_snapshot);

    let report = ComparisonEngine::new(config(ScanMode::Simple))
        .run(&source, &target)
        .await
        .unwrap();
    assert_eq!(report.ddl_diffs(), 0);
}

#[tokio::test]
async fn missing_view_is_reported_once_per_direction() {
    let mut source_snapshot = shop("shop");
    source_snapshot.views = vec![view("big_orders", "shop"), view("recent", "shop")];
    let mut target_snapshot = shop("shop_clone");
    target_snapshot.views = vec![view("recent", "shop_clone"), view("archive", "shop_clone")];
    let source = FixtureCatalog::new(source_snapshot);
    let target = FixtureCatalog::new(target_snapshot);

    let report = ComparisonEngine::new(config(ScanMode::Simple))
        .run(&source, &target)
        .await
        .unwrap();

    let messages: Vec<&str> = report
        .records()
        .iter()
        .filter(|diff| diff.category == Category::Views)
        .map(|diff| diff.message.as_str())
        .collect();
    assert_eq!(
        messages,
        vec![
            "Source view (big_orders) not found in Target",
            "Target view (archive) not found in Source",
        ]
    );
    assert_eq!(report.ddl_diffs(), 2);
}

#[tokio::test]
async fn quoted_target_schema_matches_bare_source_qualifier() {
    let mut source_snapshot = shop("shop");
    source_snapshot.views = vec![view("recent", "shop")];
    let mut target_snapshot = shop("\"Shop_Copy\"");
    target_snapshot.schema = "Shop_Copy".to_string();
    target_snapshot.views = vec![view("recent", "\"Shop_Copy\"")];
    let source = FixtureCatalog::new(source_snapshot);
    let target = FixtureCatalog::new(target_snapshot);

    let mut run_config = config(ScanMode::Simple);
    run_config.target.schema = "Shop_Copy".to_string();

    let report = ComparisonEngine::new(run_config)
        .run(&source, &target)
        .await
        .unwrap();
    assert!(report.records().is_empty());
}

#[tokio::test]
async fn simple_scan_reports_estimates_without_counting() {
    let source = FixtureCatalog::new(shop("shop"));
    let mut target_snapshot = shop("shop_clone");
    target_snapshot.row_counts[0] = rows("big", 950);
    let target = FixtureCatalog::new(target_snapshot);

    let report = ComparisonEngine::new(config(ScanMode::Simple))
        .run(&source, &target)
        .await
        .unwrap();

    assert_eq!(report.row_count_diffs(), 1);
    assert_eq!(report.ddl_diffs(), 0);
    let diff = &report.records()[0];
    assert_eq!(diff.category, Category::RowCounts);
    assert!(diff.message.ends_with("rowcnts mismatch 00001000<>00000950"));
    assert!(source.exact_calls().is_empty());
    assert!(target.exact_calls().is_empty());
}

#[tokio::test]
async fn detailed_scan_trusts_equal_exact_counts() {
    let source = FixtureCatalog::new(shop("shop"));
    let mut target_snapshot = shop("shop_clone");
    target_snapshot.row_counts[0] = rows("big", 950);
    let target = FixtureCatalog::new(target_snapshot);

    let report = ComparisonEngine::new(config(ScanMode::Detailed))
        .run(&source, &target)
        .await
        .unwrap();

    assert_eq!(report.row_count_diffs(), 0);
    assert!(report.records().is_empty());
    assert_eq!(source.exact_calls(), vec!["big".to_string()]);
    assert_eq!(target.exact_calls(), vec!["big".to_string()]);
}

#[tokio::test]
async fn detailed_scan_reports_unequal_exact_counts() {
    let source = FixtureCatalog::new(shop("shop"));
    let mut target_snapshot = shop("shop_clone");
    target_snapshot.row_counts[0] = rows("big", 950);
    target_snapshot.exact_counts.insert("big".to_string(), 998);
    let target = FixtureCatalog::new(target_snapshot);

    let report = ComparisonEngine::new(config(ScanMode::Detailed))
        .run(&source, &target)
        .await
        .unwrap();

    assert_eq!(report.row_count_diffs(), 1);
    assert!(
        report.records()[0]
            .message
            .ends_with("Real rowcnts mismatch 00001000<>00000998")
    );
}

#[tokio::test]
async fn skipped_phases_do_not_read_their_catalogs() {
    let source = FixtureCatalog::new(shop("shop"));
    let mut target_snapshot = shop("shop_clone");
    target_snapshot.indexes.clear();
    target_snapshot.row_counts[0] = rows("big", 1);
    let mut target = FixtureCatalog::new(target_snapshot);
    target.fail_indexes = true;

    let mut run_config = config(ScanMode::Simple);
    run_config.ignore_indexes = true;
    run_config.ignore_row_counts = true;

    let report = ComparisonEngine::new(run_config)
        .run(&source, &target)
        .await
        .unwrap();
    assert!(report.records().is_empty());
}

#[tokio::test]
async fn catalog_failure_aborts_the_run() {
    let source = FixtureCatalog::new(shop("shop"));
    let mut target = FixtureCatalog::new(shop("shop_clone"));
    target.fail_indexes = true;

    let err = ComparisonEngine::new(config(ScanMode::Simple))
        .run(&source, &target)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        CompareError::Phase {
            phase: "Target indexes",
            ..
        }
    ));
}

#[tokio::test]
async fn missing_schema_is_fatal() {
    let source = FixtureCatalog::new(shop("shop"));
    let target = FixtureCatalog::new(shop("elsewhere"));

    let err = ComparisonEngine::new(config(ScanMode::Simple))
        .run(&source, &target)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Target schema (shop_clone) not found.");
}

#[tokio::test]
async fn mixed_routine_kinds_are_incompatible() {
    let source = FixtureCatalog::new(shop("shop"));
    let mut target_snapshot = shop("shop_clone");
    target_snapshot.probe.has_routine_kind = false;
    let target = FixtureCatalog::new(target_snapshot);

    let err = ComparisonEngine::new(config(ScanMode::Simple))
        .run(&source, &target)
        .await
        .unwrap_err();
    assert!(matches!(err, CompareError::Incompatible(_)));
}

#[tokio::test]
async fn empty_table_list_is_fatal() {
    let source = FixtureCatalog::new(shop("shop"));
    let mut target_snapshot = shop("shop_clone");
    target_snapshot.tables.clear();
    let target = FixtureCatalog::new(target_snapshot);

    let err = ComparisonEngine::new(config(ScanMode::Simple))
        .run(&source, &target)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        CompareError::Phase {
            source: Error::NoRows(_),
            ..
        }
    ));
}

#[tokio::test]
async fn counters_match_recorded_diffs() {
    let mut source_snapshot = shop("shop");
    source_snapshot.census.insert(ObjectKind::Views, 2);
    source_snapshot.tables[0].has_triggers = true;
    source_snapshot.indexes.push(index("orders", "idx_orders_id", "shop"));
    let source = FixtureCatalog::new(source_snapshot);
    let mut target_snapshot = shop("shop_clone");
    target_snapshot.row_counts[2] = rows("t1", 6);
    let target = FixtureCatalog::new(target_snapshot);

    let report = ComparisonEngine::new(config(ScanMode::Simple))
        .run(&source, &target)
        .await
        .unwrap();

    let ddl = report
        .records()
        .iter()
        .filter(|diff| diff.category != Category::RowCounts)
        .count();
    assert_eq!(ddl, 3);
    assert_eq!(report.ddl_diffs(), 3);
    assert_eq!(report.row_count_diffs(), 1);
    assert!(
        report
            .records()
            .iter()
            .any(|diff| diff.message.starts_with("Target index table not found."))
    );
}

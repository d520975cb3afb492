use async_trait::async_trait;

use pgmatch_core::{
    CapabilityProbe, ColumnDescriptor, CommentCensus, ConstraintDescriptor, IndexDescriptor,
    ObjectCensus, Result, RoutineMode, RowCountPair, TableDescriptor, ViewDescriptor,
};

/// Read-only access to one side's catalog.
///
/// Every method is a single round trip. Descriptor lists come back ordered by
/// their identity key.
#[async_trait]
pub trait CatalogReader: Send + Sync {
    /// Engine identifier (e.g. `postgres`).
    fn engine(&self) -> &'static str;

    /// Probe the metadata surface the comparison depends on.
    async fn probe_capabilities(&self) -> Result<CapabilityProbe>;

    async fn schema_exists(&self, schema: &str) -> Result<bool>;

    async fn object_census(&self, schema: &str) -> Result<ObjectCensus>;

    /// Count commented objects per kind. Routines are classified per `mode`.
    async fn comment_census(&self, schema: &str, mode: RoutineMode) -> Result<CommentCensus>;

    async fn tables(&self, schema: &str) -> Result<Vec<TableDescriptor>>;

    async fn views(&self, schema: &str) -> Result<Vec<ViewDescriptor>>;

    /// Columns of base tables only.
    async fn columns(&self, schema: &str) -> Result<Vec<ColumnDescriptor>>;

    async fn constraints(&self, schema: &str) -> Result<Vec<ConstraintDescriptor>>;

    async fn indexes(&self, schema: &str) -> Result<Vec<IndexDescriptor>>;

    async fn row_counts(&self, schema: &str) -> Result<Vec<RowCountPair>>;

    /// Full `count(*)` of one table. Cost grows with the table.
    async fn exact_row_count(&self, schema: &str, table: &str) -> Result<i64>;

    /// Release the underlying connection.
    async fn close(&self) {}
}

use std::time::Duration;

use sqlx::PgPool;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use tracing::debug;

use pgmatch_core::{
    APPLICATION_NAME, CapabilityProbe, ColumnDescriptor, CommentCensus, ConstraintDescriptor,
    Error, IndexDescriptor, ObjectCensus, Result, RoutineMode, RowCountPair, SchemaHandle,
    TableDescriptor, ViewDescriptor, quote_ident,
};

use crate::reader::CatalogReader;

mod mapper;
mod queries;
mod utils;

const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(10);
const INVALID_PASSWORD: &str = "28P01";

/// Catalog reader backed by a single-connection PostgreSQL pool.
#[derive(Debug, Clone)]
pub struct PostgresCatalog {
    pool: PgPool,
}

impl PostgresCatalog {
    /// Wrap a pre-configured pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a connection described by `handle`.
    ///
    /// An authentication failure without a password is reported as
    /// [`Error::PasswordRequired`] so the caller can prompt and retry.
    pub async fn connect(handle: &SchemaHandle, password: Option<&str>) -> Result<Self> {
        let options = connect_options(handle, password);

        debug!(handle = %handle, "connecting");
        let pool = PgPoolOptions::new()
            .max_connections(1)
            .acquire_timeout(ACQUIRE_TIMEOUT)
            .connect_with(options)
            .await
            .map_err(|err| classify_connect_error(err, handle, password.is_some()))?;

        Ok(Self { pool })
    }
}

/// An empty host keeps whatever `PgConnectOptions::new` read from the
/// environment (`PGHOST` or the local socket).
fn connect_options(handle: &SchemaHandle, password: Option<&str>) -> PgConnectOptions {
    let mut options = PgConnectOptions::new()
        .port(handle.port)
        .username(&handle.user)
        .database(&handle.database)
        .application_name(APPLICATION_NAME);
    if !handle.host.is_empty() {
        options = options.host(&handle.host);
    }
    if let Some(password) = password {
        options = options.password(password);
    }
    options
}

fn classify_connect_error(err: sqlx::Error, handle: &SchemaHandle, had_password: bool) -> Error {
    let auth_failed = match &err {
        sqlx::Error::Database(db) => db.code().as_deref() == Some(INVALID_PASSWORD),
        other => other.to_string().to_ascii_lowercase().contains("password"),
    };

    if auth_failed && !had_password {
        Error::PasswordRequired(handle.to_string())
    } else {
        Error::Connection(format!("{handle}: {err}"))
    }
}

#[async_trait::async_trait]
impl CatalogReader for PostgresCatalog {
    fn engine(&self) -> &'static str {
        "postgres"
    }

    async fn probe_capabilities(&self) -> Result<CapabilityProbe> {
        let has_routine_kind = queries::count_routine_kind_columns(&self.pool).await? > 0;
        let server_version_num = queries::fetch_server_version_num(&self.pool)
            .await?
            .ok_or_else(|| Error::NoRows("server_version_num".to_string()))?;

        Ok(CapabilityProbe {
            has_routine_kind,
            server_version_num,
        })
    }

    async fn schema_exists(&self, schema: &str) -> Result<bool> {
        Ok(queries::count_schemas_named(&self.pool, schema).await? > 0)
    }

    async fn object_census(&self, schema: &str) -> Result<ObjectCensus> {
        let raw = queries::fetch_census(&self.pool, schema)
            .await?
            .ok_or_else(|| Error::NoRows(format!("object count for schema {schema}")))?;
        Ok(mapper::map_census(raw))
    }

    async fn comment_census(&self, schema: &str, mode: RoutineMode) -> Result<CommentCensus> {
        let raw = queries::list_comment_counts(&self.pool, schema, mode).await?;
        Ok(mapper::map_comment_counts(raw))
    }

    async fn tables(&self, schema: &str) -> Result<Vec<TableDescriptor>> {
        Ok(mapper::map_tables(
            queries::list_tables(&self.pool, schema).await?,
        ))
    }

    async fn views(&self, schema: &str) -> Result<Vec<ViewDescriptor>> {
        Ok(mapper::map_views(queries::list_views(&self.pool, schema).await?))
    }

    async fn columns(&self, schema: &str) -> Result<Vec<ColumnDescriptor>> {
        Ok(mapper::map_columns(
            queries::list_columns(&self.pool, schema).await?,
        ))
    }

    async fn constraints(&self, schema: &str) -> Result<Vec<ConstraintDescriptor>> {
        Ok(mapper::map_constraints(
            queries::list_constraints(&self.pool, schema).await?,
        ))
    }

    async fn indexes(&self, schema: &str) -> Result<Vec<IndexDescriptor>> {
        Ok(mapper::map_indexes(
            queries::list_indexes(&self.pool, schema).await?,
        ))
    }

    async fn row_counts(&self, schema: &str) -> Result<Vec<RowCountPair>> {
        mapper::map_row_counts(queries::list_row_counts(&self.pool, schema).await?)
    }

    async fn exact_row_count(&self, schema: &str, table: &str) -> Result<i64> {
        queries::count_rows(&self.pool, &quote_ident(schema)?, &quote_ident(table)?).await
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}

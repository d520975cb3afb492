use sqlx::PgPool;

use pgmatch_core::{Error, Result, RoutineMode};

fn db_err(context: &'static str) -> impl FnOnce(sqlx::Error) -> Error {
    move |err| Error::Db(format!("{context}: {err}"))
}

pub async fn count_routine_kind_columns(pool: &PgPool) -> Result<i64> {
    sqlx::query_scalar::<_, i64>(
        r#"
        select count(*)
        from pg_attribute
        where attrelid = 'pg_proc'::regclass
          and attname = 'prokind'
        "#,
    )
    .fetch_one(pool)
    .await
    .map_err(db_err("schema version check"))
}

pub async fn fetch_server_version_num(pool: &PgPool) -> Result<Option<i32>> {
    sqlx::query_scalar::<_, i32>(
        r#"
        select setting::int4
        from pg_settings
        where name = 'server_version_num'
        "#,
    )
    .fetch_optional(pool)
    .await
    .map_err(db_err("server version check"))
}

pub async fn count_schemas_named(pool: &PgPool, schema: &str) -> Result<i64> {
    sqlx::query_scalar::<_, i64>("select count(*) from pg_namespace where nspname = $1")
        .bind(schema)
        .fetch_one(pool)
        .await
        .map_err(db_err("schema validation"))
}

#[derive(Debug, sqlx::FromRow)]
pub struct RawCensus {
    pub regular_tables: i64,
    pub unlogged_tables: i64,
    pub child_tables: i64,
    pub parent_tables: i64,
    pub foreign_tables: i64,
    pub sequences: i64,
    pub identities: i64,
    pub indexes: i64,
    pub views: i64,
    pub public_views: i64,
    pub materialized_views: i64,
    pub functions: i64,
    pub types: i64,
    pub trigger_functions: i64,
    pub triggers: i64,
    pub collations: i64,
    pub domains: i64,
    pub rules: i64,
    pub policies: i64,
}

pub async fn fetch_census(pool: &PgPool, schema: &str) -> Result<Option<RawCensus>> {
    sqlx::query_as::<_, RawCensus>(
        r#"
        select
          (select count(*)
             from pg_class c
             join pg_namespace n on n.oid = c.relnamespace
            where n.nspname = $1 and c.relkind = 'r'
              and c.relpersistence = 'p' and not c.relispartition) as regular_tables,
          (select count(*)
             from pg_class c
             join pg_namespace n on n.oid = c.relnamespace
            where n.nspname = $1 and c.relkind = 'r'
              and c.relpersistence = 'u') as unlogged_tables,
          (select count(*)
             from pg_inherits i
             join pg_class c on c.oid = i.inhrelid
             join pg_class p on p.oid = i.inhparent
             join pg_namespace pn on pn.oid = p.relnamespace
            where pn.nspname = $1 and c.relkind = 'r') as child_tables,
          (select count(distinct i.inhparent)
             from pg_inherits i
             join pg_class c on c.oid = i.inhparent
             join pg_namespace n on n.oid = c.relnamespace
            where n.nspname = $1 and c.relkind in ('p', 'r')) as parent_tables,
          (select count(*)
             from pg_class c
             join pg_namespace n on n.oid = c.relnamespace
            where n.nspname = $1 and c.relkind = 'f') as foreign_tables,
          (select count(*)
             from pg_class c
             join pg_namespace n on n.oid = c.relnamespace
            where n.nspname = $1 and c.relkind = 'S') as sequences,
          (select count(*)
             from pg_sequences s
            where s.schemaname = $1
              and not exists (
                select 1
                from information_schema.sequences q
                where q.sequence_schema = $1
                  and q.sequence_name = s.sequencename)) as identities,
          (select count(*)
             from pg_index x
             join pg_class c on c.oid = x.indrelid
             join pg_namespace n on n.oid = c.relnamespace
            where n.nspname = $1 and c.relkind <> 'p') as indexes,
          (select count(*) from pg_views where schemaname = $1) as views,
          (select count(*) from pg_views where schemaname = 'public') as public_views,
          (select count(*) from pg_matviews where schemaname = $1) as materialized_views,
          (select count(*)
             from pg_proc p
             join pg_namespace n on n.oid = p.pronamespace
            where n.nspname = $1) as functions,
          (select count(*)
             from pg_type t
             join pg_namespace n on n.oid = t.typnamespace
            where n.nspname = $1
              and (t.typrelid = 0
                   or (select c.relkind = 'c' from pg_class c where c.oid = t.typrelid))
              and not exists (
                select 1 from pg_type el
                where el.oid = t.typelem and el.typarray = t.oid)) as types,
          (select count(*)
             from pg_proc p
             join pg_namespace n on n.oid = p.pronamespace
            where n.nspname = $1
              and pg_get_function_result(p.oid) = 'trigger') as trigger_functions,
          (select count(distinct (trigger_schema, trigger_name, event_object_table,
                                  action_statement, action_orientation, action_timing))
             from information_schema.triggers
            where trigger_schema = $1) as triggers,
          (select count(*)
             from pg_collation c
             join pg_namespace n on n.oid = c.collnamespace
            where n.nspname = $1) as collations,
          (select count(*)
             from pg_type t
             join pg_namespace n on n.oid = t.typnamespace
            where n.nspname = $1 and t.typtype = 'd') as domains,
          (select count(*) from pg_rules where schemaname = $1) as rules,
          (select count(*) from pg_policies where schemaname = $1) as policies
        "#,
    )
    .bind(schema)
    .fetch_optional(pool)
    .await
    .map_err(db_err("object count"))
}

const MODERN_ROUTINE_COMMENTS: &str = r#"
          select
            case p.prokind
              when 'f' then 'FUNCTION'
              when 'p' then 'PROCEDURE'
              when 'a' then 'AGGREGATE FUNCTION'
              when 'w' then 'WINDOW FUNCTION'
            end,
            p.oid::text
          from pg_proc p
          join pg_namespace n on n.oid = p.pronamespace
          join pg_description d
            on d.objoid = p.oid and d.classoid = 'pg_proc'::regclass and d.objsubid = 0
          where n.nspname = $1
"#;

const LEGACY_ROUTINE_COMMENTS: &str = r#"
          select
            case when p.proisagg then 'AGGREGATE' else 'FUNCTION' end,
            p.oid::text
          from pg_proc p
          join pg_namespace n on n.oid = p.pronamespace
          join pg_description d
            on d.objoid = p.oid and d.classoid = 'pg_proc'::regclass and d.objsubid = 0
          where n.nspname = $1
"#;

fn comment_census_sql(mode: RoutineMode) -> String {
    let routines = match mode {
        RoutineMode::Modern => MODERN_ROUTINE_COMMENTS,
        RoutineMode::Legacy => LEGACY_ROUTINE_COMMENTS,
    };

    format!(
        r#"
        with details as (
          select
            case c.relkind
              when 'r' then 'TABLE'
              when 'p' then 'PARTITIONED TABLE'
              when 'S' then 'SEQUENCE'
              when 'f' then 'FOREIGN TABLE'
              when 'v' then 'VIEW'
              when 'm' then 'MATERIALIZED VIEW'
              when 'i' then 'INDEX'
              when 'c' then 'TYPE'
            end as object,
            c.relname::text as name
          from pg_class c
          join pg_namespace n on n.oid = c.relnamespace
          join pg_description d
            on d.objoid = c.oid and d.classoid = 'pg_class'::regclass and d.objsubid = 0
          where n.nspname = $1
          union
          select 'COLUMN', c.relname::text || '.' || a.attname::text
          from pg_description d
          join pg_class c on c.oid = d.objoid and d.classoid = 'pg_class'::regclass
          join pg_namespace n on n.oid = c.relnamespace
          join pg_attribute a on a.attrelid = c.oid and a.attnum = d.objsubid
          where d.objsubid > 0 and not a.attisdropped and n.nspname = $1
          union
          select 'DOMAIN', t.typname::text
          from pg_description d
          join pg_type t on t.oid = d.objoid
          join pg_namespace n on n.oid = t.typnamespace
          where t.typtype = 'd' and d.objsubid = 0 and n.nspname = $1
          union
          select 'SCHEMA', n.nspname::text
          from pg_description d
          join pg_namespace n on n.oid = d.objoid
          where d.classoid = 'pg_namespace'::regclass and d.objsubid = 0 and n.nspname = $1
          union
          select 'TYPE', t.typname::text
          from pg_type t
          join pg_namespace n on n.oid = t.typnamespace
          where n.nspname = $1
            and t.typtype = 'c'
            and (t.typrelid = 0
                 or (select c.relkind = 'c' from pg_class c where c.oid = t.typrelid))
            and obj_description(t.oid, 'pg_type') is not null
          union
          select 'COLLATION', c.collname::text
          from pg_collation c
          join pg_namespace n on n.oid = c.collnamespace
          where n.nspname = $1
            and c.collencoding in (-1, pg_char_to_encoding(getdatabaseencoding()))
            and obj_description(c.oid, 'pg_collation') is not null
          union
          {routines}
          union
          select 'POLICY', c.relname::text || '.' || p.polname::text
          from pg_policy p
          join pg_class c on c.oid = p.polrelid
          join pg_namespace n on n.oid = c.relnamespace
          join pg_description d
            on d.objoid = p.oid and d.classoid = 'pg_policy'::regclass and d.objsubid = 0
          where n.nspname = $1 and c.relkind in ('r', 'p')
        )
        select object as "object", count(*) as "count"
        from details
        where object is not null
        group by object
        order by object
        "#
    )
}

#[derive(Debug, sqlx::FromRow)]
pub struct RawCommentCount {
    pub object: String,
    pub count: i64,
}

pub async fn list_comment_counts(
    pool: &PgPool,
    schema: &str,
    mode: RoutineMode,
) -> Result<Vec<RawCommentCount>> {
    let sql = comment_census_sql(mode);
    sqlx::query_as::<_, RawCommentCount>(&sql)
        .bind(schema)
        .fetch_all(pool)
        .await
        .map_err(db_err("comments"))
}

#[derive(Debug, sqlx::FromRow)]
pub struct RawTable {
    pub name: String,
    pub owner: String,
    pub tablespace: Option<String>,
    pub has_indexes: bool,
    pub has_rules: bool,
    pub has_triggers: bool,
    pub row_security: bool,
}

pub async fn list_tables(pool: &PgPool, schema: &str) -> Result<Vec<RawTable>> {
    sqlx::query_as::<_, RawTable>(
        r#"
        select
          tablename::text as name,
          tableowner::text as owner,
          tablespace::text as tablespace,
          hasindexes as has_indexes,
          hasrules as has_rules,
          hastriggers as has_triggers,
          rowsecurity as row_security
        from pg_tables
        where schemaname = $1
        order by tablename
        "#,
    )
    .bind(schema)
    .fetch_all(pool)
    .await
    .map_err(db_err("table diff"))
}

#[derive(Debug, sqlx::FromRow)]
pub struct RawView {
    pub name: String,
    pub definition: Option<String>,
    pub check_option: Option<String>,
    pub is_updatable: Option<String>,
    pub is_insertable_into: Option<String>,
    pub is_trigger_updatable: Option<String>,
    pub is_trigger_deletable: Option<String>,
    pub is_trigger_insertable_into: Option<String>,
}

pub async fn list_views(pool: &PgPool, schema: &str) -> Result<Vec<RawView>> {
    sqlx::query_as::<_, RawView>(
        r#"
        select
          table_name::text as name,
          view_definition::text as definition,
          check_option::text as check_option,
          is_updatable::text as is_updatable,
          is_insertable_into::text as is_insertable_into,
          is_trigger_updatable::text as is_trigger_updatable,
          is_trigger_deletable::text as is_trigger_deletable,
          is_trigger_insertable_into::text as is_trigger_insertable_into
        from information_schema.views
        where table_schema = $1
        order by table_name
        "#,
    )
    .bind(schema)
    .fetch_all(pool)
    .await
    .map_err(db_err("view diff"))
}

#[derive(Debug, sqlx::FromRow)]
pub struct RawColumn {
    pub table_name: String,
    pub ordinal_position: i32,
    pub column_name: String,
    pub column_default: Option<String>,
    pub is_nullable: Option<String>,
    pub data_type: Option<String>,
    pub character_maximum_length: Option<i32>,
    pub numeric_precision_radix: Option<i32>,
    pub numeric_scale: Option<i32>,
    pub is_identity: Option<String>,
    pub is_generated: Option<String>,
}

pub async fn list_columns(pool: &PgPool, schema: &str) -> Result<Vec<RawColumn>> {
    sqlx::query_as::<_, RawColumn>(
        r#"
        select
          c.table_name::text as table_name,
          c.ordinal_position::int4 as ordinal_position,
          c.column_name::text as column_name,
          c.column_default::text as column_default,
          c.is_nullable::text as is_nullable,
          c.data_type::text as data_type,
          c.character_maximum_length::int4 as character_maximum_length,
          c.numeric_precision_radix::int4 as numeric_precision_radix,
          c.numeric_scale::int4 as numeric_scale,
          c.is_identity::text as is_identity,
          c.is_generated::text as is_generated
        from information_schema.tables t
        join information_schema.columns c
          on c.table_catalog = t.table_catalog
         and c.table_schema = t.table_schema
         and c.table_name = t.table_name
        where t.table_schema = $1
          and t.table_type = 'BASE TABLE'
        order by c.table_name, c.ordinal_position
        "#,
    )
    .bind(schema)
    .fetch_all(pool)
    .await
    .map_err(db_err("column diff"))
}

#[derive(Debug, sqlx::FromRow)]
pub struct RawConstraint {
    pub table_name: String,
    pub constraint_name: String,
    pub kind_code: String,
    pub on_update_code: String,
    pub on_delete_code: String,
    pub match_type_code: String,
    pub local_key_positions: Option<Vec<i16>>,
    pub foreign_key_positions: Option<Vec<i16>>,
    pub definition: String,
    pub column_list: Option<String>,
}

pub async fn list_constraints(pool: &PgPool, schema: &str) -> Result<Vec<RawConstraint>> {
    sqlx::query_as::<_, RawConstraint>(
        r#"
        select
          rel.relname::text as table_name,
          con.conname::text as constraint_name,
          con.contype::text as kind_code,
          con.confupdtype::text as on_update_code,
          con.confdeltype::text as on_delete_code,
          con.confmatchtype::text as match_type_code,
          con.conkey as local_key_positions,
          con.confkey as foreign_key_positions,
          pg_get_constraintdef(con.oid) as definition,
          (select string_agg(att.attname::text, ',' order by ord.n)
             from unnest(con.conkey) with ordinality as ord(attnum, n)
             join pg_attribute att
               on att.attrelid = con.conrelid and att.attnum = ord.attnum) as column_list
        from pg_constraint con
        join pg_namespace nsp on nsp.oid = con.connamespace
        join pg_class rel on rel.oid = con.conrelid and rel.relnamespace = nsp.oid
        where nsp.nspname = $1
        order by rel.relname, con.conname
        "#,
    )
    .bind(schema)
    .fetch_all(pool)
    .await
    .map_err(db_err("constraints diff"))
}

#[derive(Debug, sqlx::FromRow)]
pub struct RawIndex {
    pub table_name: String,
    pub index_name: String,
    pub total_attr_count: i16,
    pub key_attr_count: i16,
    pub is_unique: bool,
    pub is_primary: bool,
    pub is_exclusion: bool,
    pub is_immediate: bool,
    pub is_clustered: bool,
    pub is_valid: bool,
    pub is_ready: bool,
    pub is_live: bool,
    pub key_positions: Vec<i16>,
    pub key_columns: Option<String>,
    pub definition: String,
}

pub async fn list_indexes(pool: &PgPool, schema: &str) -> Result<Vec<RawIndex>> {
    // indnkeyatts only exists from v11 on, hence the jsonb lookup.
    sqlx::query_as::<_, RawIndex>(
        r#"
        select
          c.relname::text as table_name,
          i.relname::text as index_name,
          x.indnatts as total_attr_count,
          coalesce((to_jsonb(x) ->> 'indnkeyatts')::int2, x.indnatts) as key_attr_count,
          x.indisunique as is_unique,
          x.indisprimary as is_primary,
          x.indisexclusion as is_exclusion,
          x.indimmediate as is_immediate,
          x.indisclustered as is_clustered,
          x.indisvalid as is_valid,
          x.indisready as is_ready,
          x.indislive as is_live,
          x.indkey::int2[] as key_positions,
          array_to_string(array(
            select pg_get_indexdef(i.oid, k + 1, true)
            from generate_subscripts(x.indkey, 1) as k
            order by k), ',') as key_columns,
          pg_get_indexdef(i.oid) as definition
        from pg_index x
        join pg_class c on c.oid = x.indrelid
        join pg_class i on i.oid = x.indexrelid
        join pg_namespace n on n.oid = c.relnamespace
        where n.nspname = $1
          and c.relkind = 'r'
          and i.relkind = 'i'
        order by c.relname, i.relname
        "#,
    )
    .bind(schema)
    .fetch_all(pool)
    .await
    .map_err(db_err("indexes diff"))
}

#[derive(Debug, sqlx::FromRow)]
pub struct RawRowCount {
    pub estimate_table: String,
    pub estimated_count: i64,
    pub stats_table: String,
    pub live_tuple_count: i64,
}

pub async fn list_row_counts(pool: &PgPool, schema: &str) -> Result<Vec<RawRowCount>> {
    sqlx::query_as::<_, RawRowCount>(
        r#"
        select
          a.tblname as estimate_table,
          a.rowcnt as estimated_count,
          b.tblname as stats_table,
          b.rowcnt as live_tuple_count
        from (
          select c.relname::text as tblname, c.reltuples::int8 as rowcnt
          from pg_class c
          join pg_namespace n on n.oid = c.relnamespace
          where n.nspname = $1 and c.relkind = 'r'
        ) a
        join (
          select t.relname::text as tblname, t.n_live_tup::int8 as rowcnt
          from pg_stat_user_tables t
          where t.schemaname = $1
        ) b on a.tblname = b.tblname
        order by a.tblname
        "#,
    )
    .bind(schema)
    .fetch_all(pool)
    .await
    .map_err(db_err("row counts"))
}

/// `schema` and `table` must already be quoted with `quote_ident`.
pub async fn count_rows(pool: &PgPool, quoted_schema: &str, quoted_table: &str) -> Result<i64> {
    let sql = format!("select count(*) from {quoted_schema}.{quoted_table}");
    sqlx::query_scalar::<_, i64>(&sql)
        .fetch_one(pool)
        .await
        .map_err(db_err("real row counts"))
}

use std::fs;
use std::path::Path;

use serde::Deserialize;

use pgmatch_core::{RunConfig, ScanMode, SchemaHandle, Side};

use crate::CliError;
use crate::args::Cli;

pub const DEFAULT_PORT: u16 = 5432;

/// Connection coordinates for one side, as read from the config file.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SideConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub user: Option<String>,
    pub database: Option<String>,
    pub schema: Option<String>,
}

/// Optional TOML defaults; command-line flags win.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default)]
    pub source: SideConfig,
    #[serde(default)]
    pub target: SideConfig,
    pub scan_type: Option<String>,
    pub ignore_row_counts: Option<bool>,
    pub ignore_indexes: Option<bool>,
}

impl FileConfig {
    pub fn side(&self, side: Side) -> &SideConfig {
        match side {
            Side::Source => &self.source,
            Side::Target => &self.target,
        }
    }
}

pub fn load_file_config(path: &Path) -> Result<FileConfig, CliError> {
    let content = fs::read_to_string(path)?;
    let config: FileConfig = toml::from_str(&content)?;
    Ok(config)
}

struct SideArgs<'a> {
    host: Option<&'a str>,
    port: Option<u16>,
    user: Option<&'a str>,
    database: Option<&'a str>,
    schema: Option<&'a str>,
}

fn side_args(cli: &Cli, side: Side) -> SideArgs<'_> {
    match side {
        Side::Source => SideArgs {
            host: cli.shost.as_deref(),
            port: cli.sport,
            user: cli.suser.as_deref(),
            database: cli.sdb.as_deref(),
            schema: cli.sschema.as_deref(),
        },
        Side::Target => SideArgs {
            host: cli.thost.as_deref(),
            port: cli.tport,
            user: cli.tuser.as_deref(),
            database: cli.tdb.as_deref(),
            schema: cli.tschema.as_deref(),
        },
    }
}

fn pick(flag: Option<&str>, file: Option<&String>) -> String {
    flag.map(str::to_string)
        .or_else(|| file.cloned())
        .unwrap_or_default()
}

fn resolve_handle(cli: &Cli, file: &FileConfig, side: Side) -> Result<SchemaHandle, CliError> {
    let args = side_args(cli, side);
    let from_file = file.side(side);

    let handle = SchemaHandle {
        host: pick(args.host, from_file.host.as_ref()),
        port: args.port.or(from_file.port).unwrap_or(DEFAULT_PORT),
        user: pick(args.user, from_file.user.as_ref()),
        database: pick(args.database, from_file.database.as_ref()),
        schema: pick(args.schema, from_file.schema.as_ref()),
    };
    handle
        .validate(side)
        .map_err(|err| CliError::Config(err.to_string()))?;
    Ok(handle)
}

/// Merge flags over file values into the immutable run configuration.
pub fn resolve(cli: &Cli, file: &FileConfig) -> Result<RunConfig, CliError> {
    let source = resolve_handle(cli, file, Side::Source)?;
    let target = resolve_handle(cli, file, Side::Target)?;

    let scan_type = cli
        .scantype
        .as_deref()
        .or(file.scan_type.as_deref())
        .ok_or_else(|| {
            CliError::Config(
                "Scantype not provided.  Must be \"SimpleScan\" or \"DetailedScan\"".to_string(),
            )
        })?;
    let scan_mode: ScanMode = scan_type
        .parse()
        .map_err(|err: pgmatch_core::Error| CliError::Config(err.to_string()))?;

    Ok(RunConfig {
        source,
        target,
        scan_mode,
        ignore_row_counts: cli.ignore_rowcounts || file.ignore_row_counts.unwrap_or(false),
        ignore_indexes: cli.ignore_indexes || file.ignore_indexes.unwrap_or(false),
    })
}

/// Read the file named by `--config`, if any, and resolve against it.
pub fn load(cli: &Cli) -> Result<RunConfig, CliError> {
    let file = match &cli.config {
        Some(path) => load_file_config(path)?,
        None => FileConfig::default(),
    };
    resolve(cli, &file)
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    fn parse(args: &[&str]) -> Cli {
        let mut full = vec!["pgmatch"];
        full.extend_from_slice(args);
        Cli::try_parse_from(full).unwrap()
    }

    const FULL: &[&str] = &[
        "-U", "alice", "-D", "shop", "-S", "sales", "-u", "bob", "-d", "shop2", "-s", "sales2",
        "-t", "simplescan",
    ];

    #[test]
    fn flags_alone_resolve_with_default_ports() {
        let config = resolve(&parse(FULL), &FileConfig::default()).unwrap();
        assert_eq!(config.source.port, DEFAULT_PORT);
        assert_eq!(config.source.host, "");
        assert_eq!(config.target.schema, "sales2");
        assert_eq!(config.scan_mode, ScanMode::Simple);
        assert!(!config.ignore_indexes);
    }

    #[test]
    fn flags_override_file_values() {
        let file: FileConfig = toml::from_str(
            r#"
            scan_type = "DetailedScan"
            ignore_indexes = true

            [source]
            host = "src.db"
            port = 6432
            user = "filed"
            database = "shop"
            schema = "sales"

            [target]
            user = "bob"
            database = "shop2"
            schema = "sales2"
            "#,
        )
        .unwrap();

        let config = resolve(&parse(&["-U", "alice", "-t", "simplescan"]), &file).unwrap();
        assert_eq!(config.source.user, "alice");
        assert_eq!(config.source.host, "src.db");
        assert_eq!(config.source.port, 6432);
        assert_eq!(config.target.port, DEFAULT_PORT);
        assert_eq!(config.scan_mode, ScanMode::Simple);
        assert!(config.ignore_indexes);
    }

    #[test]
    fn missing_schema_is_an_argument_error() {
        let err = resolve(
            &parse(&["-U", "a", "-D", "db", "-S", "s", "-u", "b", "-d", "db", "-t", "simplescan"]),
            &FileConfig::default(),
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid configuration: other error: Target schema not provided."
        );
    }

    #[test]
    fn scan_type_is_required_and_validated() {
        let without: Vec<&str> = FULL[..FULL.len() - 2].to_vec();
        assert!(resolve(&parse(&without), &FileConfig::default()).is_err());

        let mut bad = without.clone();
        bad.extend_from_slice(&["-t", "fullscan"]);
        let err = resolve(&parse(&bad), &FileConfig::default()).unwrap_err();
        assert!(err.to_string().contains("Scantype invalid: fullscan."));
    }

    #[test]
    fn unknown_file_keys_are_rejected() {
        assert!(toml::from_str::<FileConfig>("scantype = \"simple\"").is_err());
    }
}

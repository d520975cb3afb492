use std::path::PathBuf;

use clap::{ArgAction, Parser};

/// `-h` names the target host, so help is only reachable as `--help`.
#[derive(Parser, Debug, Default)]
#[command(
    name = "pgmatch",
    version,
    about = "Compare the DDL and row counts of two Postgres schemas",
    disable_help_flag = true
)]
pub struct Cli {
    /// Source host.
    #[arg(short = 'H', long = "shost", value_name = "SOURCEHOST")]
    pub shost: Option<String>,
    /// Source port [default: 5432].
    #[arg(short = 'P', long = "sport", value_name = "SOURCEPORT")]
    pub sport: Option<u16>,
    /// Source user.
    #[arg(short = 'U', long = "suser", value_name = "SOURCEUSER")]
    pub suser: Option<String>,
    /// Source database.
    #[arg(short = 'D', long = "sdb", value_name = "SOURCEDB")]
    pub sdb: Option<String>,
    /// Source schema.
    #[arg(short = 'S', long = "sschema", value_name = "SOURCESCHEMA")]
    pub sschema: Option<String>,

    /// Target host.
    #[arg(short = 'h', long = "thost", value_name = "TARGETHOST")]
    pub thost: Option<String>,
    /// Target port [default: 5432].
    #[arg(short = 'p', long = "tport", value_name = "TARGETPORT")]
    pub tport: Option<u16>,
    /// Target user.
    #[arg(short = 'u', long = "tuser", value_name = "TARGETUSER")]
    pub tuser: Option<String>,
    /// Target database.
    #[arg(short = 'd', long = "tdb", value_name = "TARGETDB")]
    pub tdb: Option<String>,
    /// Target schema.
    #[arg(short = 's', long = "tschema", value_name = "TARGETSCHEMA")]
    pub tschema: Option<String>,

    /// Row count strategy: SimpleScan or DetailedScan.
    #[arg(short = 't', long = "scantype", value_name = "SCANTYPE")]
    pub scantype: Option<String>,
    /// Also write log lines to pgmatch_YYYY_MM_DD.log.
    #[arg(short = 'l', long)]
    pub log: bool,
    /// Show debug lines.
    #[arg(short = 'v', long)]
    pub verbose: bool,
    /// Skip the row count phase.
    #[arg(short = 'r', long = "ignore-rowcounts")]
    pub ignore_rowcounts: bool,
    /// Skip the constraint and index phase.
    #[arg(short = 'i', long = "ignore-indexes")]
    pub ignore_indexes: bool,
    /// TOML file with defaults for any of the above.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print help.
    #[arg(long, action = ArgAction::Help)]
    pub help: Option<bool>,
}

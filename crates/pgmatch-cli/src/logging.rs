use std::fmt;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use chrono::{Local, NaiveDate};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::prelude::*;
use tracing_subscriber::registry::LookupSpan;

use pgmatch_compare::DIFF_TARGET;
use pgmatch_core::Severity;

use crate::CliError;

/// Target for errors that end the program before or outside a phase.
pub const FATAL_TARGET: &str = "pgmatch::fatal";

const FILTER_ENV: &str = "PGMATCH_LOG";

fn severity(target: &str, level: &Level) -> Severity {
    match (target, *level) {
        (DIFF_TARGET, _) => Severity::Diff,
        (FATAL_TARGET, _) => Severity::Fatal,
        (_, Level::ERROR) => Severity::Error,
        (_, Level::WARN) => Severity::Warn,
        (_, Level::INFO) => Severity::Info,
        _ => Severity::Debug,
    }
}

/// `SEVERITY  YYYY-MM-DD HH:MM:SS  message`
struct LineFormat;

impl<S, N> FormatEvent<S, N> for LineFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let meta = event.metadata();
        write!(
            writer,
            "{:<5}  {}  ",
            severity(meta.target(), meta.level()).label(),
            Local::now().format("%Y-%m-%d %H:%M:%S")
        )?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

pub fn log_file_name(date: NaiveDate) -> String {
    format!("pgmatch_{}.log", date.format("%Y_%m_%d"))
}

fn default_filter(verbose: bool) -> EnvFilter {
    let level = if verbose { "debug" } else { "info" };
    EnvFilter::new(format!("{level},sqlx=warn"))
}

/// Install the stdout logger, plus a dated log file in the working
/// directory when `log_to_file` is set. Returns the log file path.
pub fn init_logging(verbose: bool, log_to_file: bool) -> Result<Option<PathBuf>, CliError> {
    let filter = EnvFilter::try_from_env(FILTER_ENV).unwrap_or_else(|_| default_filter(verbose));

    let stdout_layer = tracing_subscriber::fmt::layer()
        .event_format(LineFormat)
        .with_ansi(false)
        .with_writer(io::stdout);

    let (file_layer, path) = if log_to_file {
        let path = std::env::current_dir()?.join(log_file_name(Local::now().date_naive()));
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let file = Arc::new(Mutex::new(file));

        let make_writer = BoxMakeWriter::new(move || SharedWriter {
            file: Arc::clone(&file),
        });
        let layer = tracing_subscriber::fmt::layer()
            .event_format(LineFormat)
            .with_ansi(false)
            .with_writer(make_writer);
        (Some(layer), Some(path))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stdout_layer)
        .with(file_layer)
        .try_init()
        .map_err(|err| CliError::Logging(err.to_string()))?;

    Ok(path)
}

struct SharedWriter {
    file: Arc<Mutex<std::fs::File>>,
}

impl Write for SharedWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut file = self
            .file
            .lock()
            .map_err(|_| io::Error::other("failed to lock log file"))?;
        file.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut file = self
            .file
            .lock()
            .map_err(|_| io::Error::other("failed to lock log file"))?;
        file.flush()
    }
}

//! Logging setup for the explorer
//
// Installs a tracing subscriber with a plain file log under the app-data
// `logs` directory and, when verbose, a colored console layer.
//
// Usage:
//   Call `logging::init(verbose)` once at startup.
//   Keep the returned guard alive for the program's duration.

use anyhow::{Context, Result};
use chrono::Local;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::Subscriber;
use tracing_subscriber::fmt::{
    format::{FormatEvent, FormatFields, Writer},
    FmtContext,
};
use tracing_subscriber::registry::LookupSpan;

use crate::settings::project_dirs;

pub const LOG_FILE: &str = "explorer.log";

/// Flushes the file log when dropped.
pub struct LogGuard {
    _guard: tracing_appender::non_blocking::WorkerGuard,
    log_file: PathBuf,
}

impl LogGuard {
    pub fn log_file(&self) -> &Path {
        &self.log_file
    }
}

/// `<data dir>/logs`.
pub fn logs_dir() -> Result<PathBuf> {
    let dirs = project_dirs().context("Could not determine app data directory")?;
    Ok(dirs.data_dir().join("logs"))
}

/// Initializes logging under the platform logs directory.
///
/// - `verbose`: also print colored output to stdout.
/// - `RUST_LOG` overrides the default `info` filter.
pub fn init(verbose: bool) -> Result<LogGuard> {
    init_in(&logs_dir()?, verbose)
}

/// Same as [`init`], writing into a fresh timestamped folder under `logs_dir`.
pub fn init_in(logs_dir: &Path, verbose: bool) -> Result<LogGuard> {
    let log_folder = logs_dir.join(Local::now().format("%Y-%m-%d_%H-%M-%S").to_string());
    fs::create_dir_all(&log_folder)
        .with_context(|| format!("Failed to create log folder {:?}", log_folder))?;
    let log_path = log_folder.join(LOG_FILE);

    let log_file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open {:?} for writing", log_path))?;
    let (non_blocking, guard) = tracing_appender::non_blocking(log_file);

    use tracing_subscriber::prelude::*;
    let env_filter = match std::env::var("RUST_LOG") {
        Ok(val) => tracing_subscriber::EnvFilter::new(val),
        Err(_) => tracing_subscriber::EnvFilter::new("info"),
    };
    // File log: plain formatting, no ANSI/color codes
    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_thread_names(true);

    let registry = tracing_subscriber::registry().with(env_filter).with(file_layer);

    let installed = if verbose {
        let console_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stdout)
            .event_format(ConsoleFormatter);
        registry.with(console_layer).try_init()
    } else {
        registry.try_init()
    };
    installed.context("A global tracing subscriber is already installed")?;

    tracing::info!("Logging to {:?}", log_path);
    Ok(LogGuard {
        _guard: guard,
        log_file: log_path,
    })
}

/// Colored single-line console output.
pub struct ConsoleFormatter;

impl<S, N> FormatEvent<S, N> for ConsoleFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> std::fmt::Result {
        let meta = event.metadata();
        let (level_str, level_color) = match *meta.level() {
            tracing::Level::ERROR => ("ERROR", "\x1b[1;91m"), // Bold Red
            tracing::Level::WARN => ("WARN ", "\x1b[1;93m"),  // Bold Yellow
            tracing::Level::INFO => ("INFO ", "\x1b[1;94m"),  // Bold Blue
            tracing::Level::DEBUG => ("DEBUG", "\x1b[1;92m"), // Bold Green
            tracing::Level::TRACE => ("TRACE", "\x1b[1;95m"), // Bold Magenta
        };

        write!(writer, "\x1b[2;36m{}\x1b[0m ", Local::now().format("%H:%M:%S%.3f"))?;
        write!(writer, "{}{}\x1b[0m ", level_color, level_str)?;
        if let Some(name) = std::thread::current().name() {
            write!(writer, "\x1b[2;35m[{}]\x1b[0m ", name)?;
        }
        write!(writer, "\x1b[2;33m{}\x1b[0m: ", meta.target())?;

        ctx.format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

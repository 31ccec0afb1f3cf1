//! Stderr logger for scan runs.
//!
//! Lines look like `[  12.345s  INFO combine] message`: seconds since
//! installation, level and the last path segment of the record target.
//! Library code only talks to the `log` facade; binaries call
//! [`init_with_level`] once.

use std::fmt;
use std::io::Write;
use std::sync::OnceLock;
use std::time::Instant;

use log::{Level, LevelFilter, Log, Metadata, Record};

#[cfg(feature = "tracing")]
use tracing_subscriber::fmt::format::FmtSpan;
#[cfg(feature = "tracing")]
use tracing_subscriber::util::SubscriberInitExt;
#[cfg(feature = "tracing")]
use tracing_subscriber::{fmt as tfmt, EnvFilter};

struct ScanLogger {
    level: LevelFilter,
    started: Instant,
}

fn short_target(target: &str) -> &str {
    target.rsplit("::").next().unwrap_or(target)
}

fn format_line(elapsed_s: f64, level: Level, target: &str, args: &fmt::Arguments<'_>) -> String {
    format!(
        "[{elapsed_s:8.3}s {level:>5} {}] {args}",
        short_target(target)
    )
}

impl Log for ScanLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format_line(
            self.started.elapsed().as_secs_f64(),
            record.level(),
            record.target(),
            record.args(),
        );
        let _ = writeln!(std::io::stderr().lock(), "{line}");
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

static LOGGER: OnceLock<ScanLogger> = OnceLock::new();

/// Install the scan logger. Later calls keep the first logger and level.
pub fn init_with_level(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    if LOGGER.get().is_some() {
        return Ok(());
    }
    let logger = LOGGER.get_or_init(|| ScanLogger {
        level,
        started: Instant::now(),
    });
    log::set_logger(logger)?;
    log::set_max_level(level);
    Ok(())
}

/// Parse a level name (`off`, `error`, `warn`, `info`, `debug`, `trace`),
/// case-insensitively.
pub fn parse_level(name: &str) -> Option<LevelFilter> {
    name.trim().parse().ok()
}

/// Install a `tracing` subscriber filtered by `RUST_LOG` (default `info`).
///
/// `log` records are forwarded to it, and span close events carry timings.
#[cfg(feature = "tracing")]
pub fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tfmt()
        .with_env_filter(filter)
        .with_span_events(FmtSpan::CLOSE);
    let _ = if json {
        builder.json().flatten_event(true).finish().try_init()
    } else {
        builder
            .with_timer(tfmt::time::Uptime::default())
            .finish()
            .try_init()
    };
}

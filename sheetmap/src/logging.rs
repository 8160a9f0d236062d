//! Console logger for the `log` facade.
//!
//! Records are written to stderr with a level prefix, so JSON written to
//! stdout stays clean. Library code only uses the `log` macros; binaries call
//! [`init`] once.

use std::env;
use std::io::Write;

use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError};

/// Environment variable holding the default level (`error` .. `trace`).
pub const LOG_ENV: &str = "SHEETMAP_LOG";

/// Writes records to stderr, indented by target depth.
#[derive(Debug)]
pub struct ConsoleLogger {
    level: LevelFilter,
}

impl ConsoleLogger {
    pub fn new(level: LevelFilter) -> Self {
        Self { level }
    }

    pub fn level(&self) -> LevelFilter {
        self.level
    }

    /// The line written for a record.
    pub fn format(record: &Record<'_>) -> String {
        let prefix = match record.level() {
            Level::Error => "   ❌",
            Level::Warn => "   ⚠️",
            Level::Info => "   ✓",
            Level::Debug | Level::Trace => "   ",
        };
        // One step per module below the crate root.
        let depth = record
            .module_path()
            .map(|path| path.matches("::").count())
            .unwrap_or(0);
        let indent = "   ".repeat(depth.min(3));
        format!("{}{} {}", indent, prefix, record.args())
    }
}

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = Self::format(record);
        let _ = writeln!(std::io::stderr().lock(), "{}", line);
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

/// Level for `-v` repetitions, falling back to [`LOG_ENV`], then `warn`.
pub fn level_from(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => env::var(LOG_ENV)
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or(LevelFilter::Warn),
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Install the console logger. Fails if another logger is already set.
pub fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
    log::set_boxed_logger(Box::new(ConsoleLogger::new(level)))?;
    log::set_max_level(level);
    Ok(())
}

// A minimal `log` backend. Every record goes to stderr, prefixed with the
// time it was emitted in the configured time zone. Filtering is left to
// `log::set_max_level`.

use std::{
    path::{Path, PathBuf},
    sync::{LazyLock, Mutex},
};

use {
    jiff::{Timestamp, tz::TimeZone},
    log::Log,
};

use crate::style::Theme;

/// A logger that writes to stderr.
#[derive(Debug)]
pub struct Logger {
    tz: Mutex<Option<TimeZone>>,
}

impl Logger {
    /// Create a new logger and install it as the global logger.
    ///
    /// Until `set_time_zone` is called, timestamps are written in UTC.
    pub fn init() -> Result<&'static Logger, log::SetLoggerError> {
        let logger = Box::leak(Box::new(Logger { tz: Mutex::new(None) }));
        log::set_logger(logger)?;
        Ok(logger)
    }

    pub fn set_time_zone(&self, tz: TimeZone) {
        // A poisoned lock only means a previous log call panicked. The
        // time zone inside is still fine to replace.
        let mut logger_tz = self.tz.lock().unwrap_or_else(|e| e.into_inner());
        *logger_tz = Some(tz);
    }

    /// Returns the current time rendered in this logger's time zone.
    ///
    /// This deliberately avoids `Zoned::now()`, since that may try to
    /// discover the system time zone, which in turn may log.
    fn now(&self) -> String {
        let ts = Timestamp::now();
        let tz = self.tz.lock().unwrap_or_else(|e| e.into_inner()).clone();
        match tz {
            Some(tz) => ts.to_zoned(tz).to_string(),
            None => ts.to_string(),
        }
    }
}

impl Log for Logger {
    fn enabled(&self, _: &log::Metadata<'_>) -> bool {
        true
    }

    fn log(&self, record: &log::Record<'_>) {
        let now = Theme::stderr().highlight(self.now());
        eprintln!("{now}|{}", format_record(record));
    }

    fn flush(&self) {
        // eprintln! flushes on every call.
    }
}

/// Formats everything in a log line after the timestamp.
fn format_record(record: &log::Record<'_>) -> String {
    match (record.file(), record.line()) {
        (Some(file), Some(line)) => format!(
            "{}|{}:{}: {}",
            record.level(),
            relative(file),
            line,
            record.args()
        ),
        (Some(file), None) => {
            format!("{}|{}: {}", record.level(), relative(file), record.args())
        }
        _ => format!("{}: {}", record.level(), record.args()),
    }
}

fn relative<'p>(path: &'p str) -> &'p str {
    let Some(cwd) = cwd() else { return path };
    let Ok(relative) = Path::new(path).strip_prefix(cwd) else { return path };
    let Some(relative) = relative.to_str() else { return path };
    relative
}

fn cwd() -> Option<&'static Path> {
    static CWD: LazyLock<Option<PathBuf>> =
        LazyLock::new(|| std::env::current_dir().ok());
    CWD.as_deref()
}

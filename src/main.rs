use std::{env, io::Write, process::ExitCode, sync::LazyLock};

use {
    anyhow::Context,
    jiff::{Timestamp, Zoned, tz::TimeZone},
};

mod args;
mod cmd;
mod defaults;
mod logger;
mod recurrence;
mod render;
mod style;
mod validate;
mod window;

/// The host's local time zone. All occurrences are generated in it.
static TZ: LazyLock<TimeZone> = LazyLock::new(|| TimeZone::system());

/// The current time, computed once.
///
/// This is only ever used to seed default field values. It never reaches
/// the recurrence generator directly.
static NOW: LazyLock<Zoned> = LazyLock::new(|| {
    let ts = match read_env_recur_now() {
        Ok(Some(ts)) => {
            log::trace!(
                "setting current time to `{ts}` from `RECUR_NOW` \
                 environment variable",
            );
            ts
        }
        Ok(None) => {
            let now = Timestamp::now();
            log::trace!(
                "`RECUR_NOW` environment variable not set, using \
                 current time `{now}`",
            );
            now
        }
        Err(err) => {
            let now = Timestamp::now();
            log::warn!(
                "reading `RECUR_NOW` failed, using current time \
                 `{now}`: {err:#}",
            );
            now
        }
    };
    ts.to_zoned(TZ.clone())
});

/// Every day, every week, the same time.
fn main() -> ExitCode {
    let err = match run() {
        Ok(code) => return code,
        Err(err) => err,
    };
    if let Some(help) = err.root_cause().downcast_ref::<args::Help>() {
        // If stdout is gone, there is nowhere left to report anything.
        let _ = writeln!(&mut std::io::stdout(), "{help}");
        return ExitCode::SUCCESS;
    }
    if let Some(version) = err.root_cause().downcast_ref::<args::Version>() {
        let _ = writeln!(&mut std::io::stdout(), "{version}");
        return ExitCode::SUCCESS;
    }
    // A closed stdout (e.g., `recur ... | head -n1`) is not an error. Since
    // Rust ignores SIGPIPE, this shows up as an I/O error instead.
    for cause in err.chain() {
        if let Some(err) = cause.downcast_ref::<std::io::Error>() {
            if err.kind() == std::io::ErrorKind::BrokenPipe {
                return ExitCode::from(0);
            }
        }
        // `serde_json` wraps I/O errors from `to_writer` in its own type.
        if let Some(err) = cause.downcast_ref::<serde_json::Error>() {
            if err.io_error_kind() == Some(std::io::ErrorKind::BrokenPipe) {
                return ExitCode::from(0);
            }
        }
    }
    if std::env::var("RUST_BACKTRACE").map_or(false, |v| v == "1")
        && std::env::var("RUST_LIB_BACKTRACE").map_or(true, |v| v == "1")
    {
        let _ = writeln!(&mut std::io::stderr(), "{:?}", err);
    } else {
        let _ = writeln!(&mut std::io::stderr(), "{:#}", err);
    }
    ExitCode::from(1)
}

fn run() -> anyhow::Result<ExitCode> {
    let level = env::var("RECUR_LOG").unwrap_or_else(|_| String::new());
    let level = match &*level {
        "" | "off" => log::LevelFilter::Off,
        "error" => log::LevelFilter::Error,
        "warn" => log::LevelFilter::Warn,
        "info" => log::LevelFilter::Info,
        "debug" => log::LevelFilter::Debug,
        "trace" => log::LevelFilter::Trace,
        unk => anyhow::bail!("unrecognized log level '{}'", unk),
    };
    log::set_max_level(level);
    // The logger starts out in UTC, because discovering the system time zone
    // may itself log. Once it's known, the logger switches to local time.
    let logger = logger::Logger::init()?;
    logger.set_time_zone(TZ.clone());
    cmd::run(&mut lexopt::Parser::from_env())?;
    Ok(ExitCode::SUCCESS)
}

fn read_env_recur_now() -> anyhow::Result<Option<Timestamp>> {
    let Some(val) = std::env::var_os("RECUR_NOW") else { return Ok(None) };
    let Some(val) = val.to_str() else {
        anyhow::bail!(
            "`RECUR_NOW` environment variable is not valid UTF-8: {val:?}"
        )
    };
    val.parse::<Timestamp>()
        .context(
            "`RECUR_NOW` environment variable is not a valid RFC 3339 \
             timestamp",
        )
        .map(Some)
}

use crate::{
    TZ,
    args::{self, Usage, flags::Format},
    defaults::Defaults,
    render,
    style::Theme,
    validate::{self, CadenceKind, RawInput},
    window::{ViewWindow, classify},
};

const USAGE: &'static str = r#"
Generate recurring event instances and check them against a view window.

Instances are generated in chronological order, either every day or every week
on a particular day of the week, starting from the given start date. Every
instance occurs at the same wall-clock time, even across daylight saving time
transitions. Exactly `-c/--count` instances are generated.

Each instance whose date falls outside of the view window (inclusive on both
ends) is flagged. The time of day never matters for the view window.

When not given, the start date and the view window start default to the
current date. The view window end defaults to two months after the current
date. Use `recur defaults` to see these values.

USAGE:
    recur instances [<cadence>] -t <time> -c <count> [options]

TIP:
    use -h for short docs and --help for long docs

EXAMPLES:
    Three daily instances at 9am, starting on New Year's Day 2024:

        $ recur instances daily -s 2024-01-01 -t 09:00 -c 3 \
            --window-start 2024-01-01 --window-end 2024-01-02
        January 1, 2024 at 09:00 AM
        January 2, 2024 at 09:00 AM
        January 3, 2024 at 09:00 AM (outside view window)

    %snip-start%

    Two instances every Wednesday at 9am. The first instance is the first
    Wednesday on or after the start date:

        $ recur instances weekly -w wed -s 2024-01-01 -t 09:00 -c 2 \
            --window-start 2024-01-02 --window-end 2024-01-09
        January 3, 2024 at 09:00 AM
        January 10, 2024 at 09:00 AM (outside view window)

    The same, but as JSON lines:

        $ recur instances weekly -w 3 -s 2024-01-01 -t 09:00 -c 2 \
            --window-start 2024-01-02 --window-end 2024-01-09 -f json
        {"date":"January 3, 2024","time":"09:00 AM",...,"inside_window":true}
        {"date":"January 10, 2024","time":"09:00 AM",...,"inside_window":false}

    %snip-end%
REQUIRED ARGUMENTS:
%args%
OPTIONS:
%flags%
"#;

pub fn run(p: &mut lexopt::Parser) -> anyhow::Result<()> {
    let mut config = Config::default();
    args::configure(p, USAGE, &mut [&mut config])?;

    let defaults = Defaults::from_today(crate::NOW.date())?;
    let validate::Validated { rule, window } =
        validate::validate(&config.raw(&defaults))?;
    log::debug!(
        "generating {count} occurrences ({cadence:?}) at {time} \
         starting on {first}",
        count = rule.count(),
        cadence = rule.cadence(),
        time = rule.time(),
        first = rule.first_date(),
    );
    if log::log_enabled!(log::Level::Debug) {
        log_window(&window);
    }
    // Everything is generated and classified before anything is printed.
    // A failure part way through never results in partial output.
    let occurrences = classify(rule.generate_in(&TZ)?, &window);
    let mut wtr = std::io::stdout().lock();
    render::write_all(&mut wtr, &config.format, Theme::stdout(), &occurrences)
}

/// Logs the bounds of `window` along with the instants they span in `TZ`.
///
/// The instants may not be representable (e.g., the last instant of
/// 9999-12-31 in a zone behind UTC). That is logged and otherwise ignored,
/// since membership only ever compares dates.
fn log_window(window: &ViewWindow) {
    let (start, end) = (window.start(), window.end());
    match (window.first_instant(&TZ), window.last_instant(&TZ)) {
        (Ok(first), Ok(last)) => log::debug!(
            "view window is {start} through {end} ({first} to {last})",
        ),
        (Err(err), _) | (_, Err(err)) => log::debug!(
            "view window is {start} through {end} \
             (instants not representable in time zone: {err:#})",
        ),
    }
}

#[derive(Debug, Default)]
struct Config {
    cadence: Option<CadenceKind>,
    start_date: Option<String>,
    event_time: Option<String>,
    count: Option<String>,
    week_day: Option<String>,
    window_start: Option<String>,
    window_end: Option<String>,
    format: Format,
}

impl Config {
    /// Collect the raw field values, filling in defaults for the fields
    /// that weren't given at all.
    ///
    /// A field given as an empty string is passed through as-is, so that
    /// it is reported as missing.
    fn raw(&self, defaults: &Defaults) -> RawInput {
        let or_default = |field: &Option<String>, default: jiff::civil::Date| {
            Some(field.clone().unwrap_or_else(|| default.to_string()))
        };
        RawInput {
            start_date: or_default(&self.start_date, defaults.start_date),
            event_time: self.event_time.clone(),
            cadence: self.cadence.unwrap_or_default(),
            week_day: self.week_day.clone(),
            count: self.count.clone(),
            window_start: or_default(&self.window_start, defaults.window_start),
            window_end: or_default(&self.window_end, defaults.window_end),
        }
    }
}

impl args::Configurable for Config {
    fn configure(
        &mut self,
        p: &mut lexopt::Parser,
        arg: &mut lexopt::Arg,
    ) -> anyhow::Result<bool> {
        use lexopt::{Arg::*, ValueExt};

        match *arg {
            Value(ref mut v) => {
                if self.cadence.is_some() {
                    return Ok(false);
                }
                let v = std::mem::take(v).string()?;
                self.cadence = Some(v.parse()?);
            }
            Short('s') | Long("start") => {
                self.start_date = Some(args::parse(p, "-s/--start")?);
            }
            Short('t') | Long("time") => {
                self.event_time = Some(args::parse(p, "-t/--time")?);
            }
            Short('c') | Long("count") => {
                self.count = Some(args::parse(p, "-c/--count")?);
            }
            Short('w') | Long("week-day") => {
                self.week_day = Some(args::parse(p, "-w/--week-day")?);
            }
            Long("window-start") => {
                self.window_start = Some(args::parse(p, "--window-start")?);
            }
            Long("window-end") => {
                self.window_end = Some(args::parse(p, "--window-end")?);
            }
            Short('f') | Long("format") => {
                self.format = args::parse(p, "-f/--format")?;
            }
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn usage(&self) -> &[Usage] {
        const START: Usage = Usage::flag(
            "-s, --start <date>",
            "The date of the first instance (defaults to today).",
            r#"
The date of the first instance (defaults to today).

Dates are written as `YYYY-MM-DD`, e.g., `2024-01-31`.

For a weekly cadence, the first instance is on the first date on or after this
date that falls on the day given by `-w/--week-day`.
"#,
        );
        const TIME: Usage = Usage::flag(
            "-t, --time <time>",
            "The time of day of every instance (required).",
            r#"
The time of day of every instance (required).

Times are written on a 24-hour clock as `HH:MM`, e.g., `09:00` or `17:30`.
Seconds are accepted but ignored.

If this time doesn't exist on a particular day because of a daylight saving
time transition, then that instance is moved forward by the length of the
transition. If it occurs twice, then the first one is used.
"#,
        );
        const COUNT: Usage = Usage::flag(
            "-c, --count <number>",
            "The number of instances to generate (required).",
            r#"
The number of instances to generate (required).

This must be at least 1.
"#,
        );
        const WEEK_DAY: Usage = Usage::flag(
            "-w, --week-day <weekday>",
            "The day of the week for a weekly cadence.",
            r#"
The day of the week for a weekly cadence.

This is required for a weekly cadence and ignored for a daily cadence.

The day may be given as a number from `0` through `6`, where Sunday is `0`,
Monday is `1` and so on. Or it may be given as a name, without regard for case:

Sunday, Sun, SU

Monday, Mon, MO

Tuesday, Tues, Tue, TU

Wednesday, Wed, WE

Thursday, Thurs, Thu, TH

Friday, Fri, FR

Saturday, Sat, SA
"#,
        );
        const WINDOW_START: Usage = Usage::flag(
            "--window-start <date>",
            "The first date of the view window (defaults to today).",
            r#"
The first date of the view window (defaults to today).

The view window includes this date. It must not be after `--window-end`.
"#,
        );
        const WINDOW_END: Usage = Usage::flag(
            "--window-end <date>",
            "The last date of the view window (defaults to today + 2 months).",
            r#"
The last date of the view window (defaults to today + 2 months).

The view window includes this date. When the default date doesn't exist (e.g.,
two months after December 31 would be February 31), the excess days roll over
into the following month. So December 31, 2024 gives March 3, 2025.
"#,
        );

        &[
            CadenceKind::USAGE,
            START,
            TIME,
            COUNT,
            WEEK_DAY,
            WINDOW_START,
            WINDOW_END,
            Format::USAGE,
        ]
    }
}

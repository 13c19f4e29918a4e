use std::num::NonZero;

use jiff::civil::{Date, Time, Weekday};

use crate::{
    args::Usage,
    recurrence::{Cadence, RecurrenceRule},
    window::ViewWindow,
};

/// The kind of recurrence requested, before any weekday is attached.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum CadenceKind {
    #[default]
    Daily,
    Weekly,
}

impl CadenceKind {
    pub const USAGE: Usage = Usage::arg(
        "<cadence>",
        "How often the event repeats (defaults to daily).",
        r#"
How often the event repeats (defaults to daily).

Valid values are:

daily, day, d

weekly, week, wk, w

A weekly cadence requires a day of the week via `-w/--week-day`.
"#,
    );
}

impl std::str::FromStr for CadenceKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<CadenceKind> {
        let kind = match &*s.to_lowercase() {
            "daily" | "day" | "d" => CadenceKind::Daily,
            "weekly" | "week" | "wk" | "w" => CadenceKind::Weekly,
            unk => anyhow::bail!("unrecognized cadence: `{unk}`"),
        };
        Ok(kind)
    }
}

/// The raw field values supplied by the input layer.
///
/// Nothing here has been checked yet. A field that is absent or contains
/// only whitespace is considered missing.
#[derive(Clone, Debug, Default)]
pub struct RawInput {
    pub start_date: Option<String>,
    pub event_time: Option<String>,
    pub cadence: CadenceKind,
    pub week_day: Option<String>,
    pub count: Option<String>,
    pub window_start: Option<String>,
    pub window_end: Option<String>,
}

/// A rule and window that are ready for generation.
#[derive(Clone, Debug)]
pub struct Validated {
    pub rule: RecurrenceRule,
    pub window: ViewWindow,
}

/// The category of a rejected input.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    /// A required field is absent, empty or couldn't be parsed.
    MissingField,
    /// The occurrence count is less than 1.
    InvalidCount,
    /// The view window starts after it ends.
    InvalidWindow,
    /// A weekly cadence without a weekday in the range `0..=6`.
    InvalidWeekday,
}

/// A rejection of raw input, with a human readable reason.
#[derive(Clone, Debug)]
pub struct ValidationError {
    kind: ErrorKind,
    reason: String,
}

impl ValidationError {
    fn new(kind: ErrorKind, reason: impl Into<String>) -> ValidationError {
        ValidationError { kind, reason: reason.into() }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(&self.reason)
    }
}

impl std::error::Error for ValidationError {}

/// Check the raw input and turn it into a rule and a view window.
///
/// Missing fields are reported first, in the order start date, event time,
/// occurrence count, window start and window end. Then the count, window
/// order and weekday are checked, in that order. Only the first problem
/// found is reported.
pub fn validate(raw: &RawInput) -> Result<Validated, ValidationError> {
    let result = validate_imp(raw);
    if let Err(ref err) = result {
        log::debug!("rejected input ({kind:?}): {err}", kind = err.kind());
    }
    result
}

fn validate_imp(raw: &RawInput) -> Result<Validated, ValidationError> {
    let start_date = required(&raw.start_date, "start date")?;
    let event_time = required(&raw.event_time, "event time")?;
    let count = required(&raw.count, "occurrence count")?;
    let window_start = required(&raw.window_start, "view window start")?;
    let window_end = required(&raw.window_end, "view window end")?;

    let start_date: Date = parse_field(start_date, "start date")?;
    let event_time: Time = parse_field(event_time, "event time")?;
    let count: i64 = parse_field(count, "occurrence count")?;
    let window_start: Date = parse_field(window_start, "view window start")?;
    let window_end: Date = parse_field(window_end, "view window end")?;

    let count = usize::try_from(count)
        .ok()
        .and_then(NonZero::new)
        .ok_or_else(|| {
            ValidationError::new(
                ErrorKind::InvalidCount,
                format!(
                    "number of occurrences must be at least 1, \
                     but got {count}",
                ),
            )
        })?;
    let window = ViewWindow::new(window_start, window_end).ok_or_else(|| {
        ValidationError::new(
            ErrorKind::InvalidWindow,
            format!(
                "view window start ({window_start}) cannot be after \
                 view window end ({window_end})",
            ),
        )
    })?;
    let cadence = match raw.cadence {
        CadenceKind::Daily => Cadence::Daily,
        CadenceKind::Weekly => Cadence::WeeklyOn(week_day(&raw.week_day)?),
    };

    let start = start_date.to_datetime(event_time);
    let rule = RecurrenceRule::new(start, cadence, count).map_err(|err| {
        ValidationError::new(ErrorKind::MissingField, format!("{err:#}"))
    })?;
    Ok(Validated { rule, window })
}

fn required<'a>(
    field: &'a Option<String>,
    name: &str,
) -> Result<&'a str, ValidationError> {
    match field.as_deref().map(str::trim) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(ValidationError::new(
            ErrorKind::MissingField,
            format!("missing required field: {name}"),
        )),
    }
}

fn parse_field<T>(value: &str, name: &str) -> Result<T, ValidationError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.parse().map_err(|err| {
        ValidationError::new(
            ErrorKind::MissingField,
            format!("invalid {name} `{value}`: {err}"),
        )
    })
}

/// Parse a day of the week as either `0..=6` (Sunday is `0`) or an English
/// weekday name.
fn week_day(field: &Option<String>) -> Result<Weekday, ValidationError> {
    let invalid = |reason: String| {
        ValidationError::new(ErrorKind::InvalidWeekday, reason)
    };
    let Some(value) = field.as_deref().map(str::trim).filter(|v| !v.is_empty())
    else {
        return Err(invalid(
            "weekly cadence requires a day of the week".to_string(),
        ));
    };
    if let Ok(number) = value.parse::<i64>() {
        return i8::try_from(number)
            .ok()
            .and_then(|n| Weekday::from_sunday_zero_offset(n).ok())
            .ok_or_else(|| {
                invalid(format!(
                    "day of the week must be in the range 0..=6 \
                     (Sunday is 0), but got {number}",
                ))
            });
    }
    let weekday = match &*value.to_lowercase() {
        "sunday" | "sun" | "su" => Weekday::Sunday,
        "monday" | "mon" | "mo" => Weekday::Monday,
        "tuesday" | "tues" | "tue" | "tu" => Weekday::Tuesday,
        "wednesday" | "wed" | "we" => Weekday::Wednesday,
        "thursday" | "thurs" | "thu" | "th" => Weekday::Thursday,
        "friday" | "fri" | "fr" => Weekday::Friday,
        "saturday" | "sat" | "sa" => Weekday::Saturday,
        unk => return Err(invalid(format!("unrecognized weekday: `{unk}`"))),
    };
    Ok(weekday)
}

#[cfg(test)]
mod tests {
    use jiff::civil::date;

    use super::*;

    fn raw() -> RawInput {
        RawInput {
            start_date: Some("2024-01-01".to_string()),
            event_time: Some("09:00".to_string()),
            cadence: CadenceKind::Daily,
            week_day: None,
            count: Some("3".to_string()),
            window_start: Some("2024-01-02".to_string()),
            window_end: Some("2024-01-09".to_string()),
        }
    }

    fn kind(raw: &RawInput) -> ErrorKind {
        validate(raw).unwrap_err().kind()
    }

    #[test]
    fn valid_daily() {
        let v = validate(&raw()).unwrap();
        assert_eq!(v.rule.cadence(), Cadence::Daily);
        assert_eq!(v.rule.count(), 3);
        assert_eq!(v.rule.first_date(), date(2024, 1, 1));
        assert_eq!(v.rule.time(), jiff::civil::time(9, 0, 0, 0));
        assert_eq!(v.window.start(), date(2024, 1, 2));
        assert_eq!(v.window.end(), date(2024, 1, 9));
    }

    #[test]
    fn valid_weekly() {
        let raw = RawInput {
            cadence: CadenceKind::Weekly,
            week_day: Some("3".to_string()),
            count: Some("2".to_string()),
            ..raw()
        };
        let v = validate(&raw).unwrap();
        assert_eq!(v.rule.cadence(), Cadence::WeeklyOn(Weekday::Wednesday));
        assert_eq!(v.rule.first_date(), date(2024, 1, 3));
    }

    #[test]
    fn weekday_names() {
        for (name, expected) in [
            ("sun", Weekday::Sunday),
            ("Monday", Weekday::Monday),
            ("TU", Weekday::Tuesday),
            ("sat", Weekday::Saturday),
            ("0", Weekday::Sunday),
            ("6", Weekday::Saturday),
        ] {
            let raw = RawInput {
                cadence: CadenceKind::Weekly,
                week_day: Some(name.to_string()),
                ..raw()
            };
            let v = validate(&raw).unwrap();
            assert_eq!(v.rule.cadence(), Cadence::WeeklyOn(expected));
        }
    }

    #[test]
    fn weekday_ignored_for_daily() {
        let raw = RawInput { week_day: Some("9".to_string()), ..raw() };
        assert!(validate(&raw).is_ok());
    }

    #[test]
    fn missing_fields() {
        let cases: [fn(&mut RawInput); 5] = [
            |r| r.start_date = None,
            |r| r.event_time = None,
            |r| r.count = None,
            |r| r.window_start = None,
            |r| r.window_end = Some("  ".to_string()),
        ];
        for clear in cases {
            let mut raw = raw();
            clear(&mut raw);
            assert_eq!(kind(&raw), ErrorKind::MissingField);
        }
    }

    #[test]
    fn missing_reported_before_other_problems() {
        let raw = RawInput {
            count: Some("0".to_string()),
            window_start: Some("2024-02-01".to_string()),
            event_time: Some(String::new()),
            ..raw()
        };
        let err = validate(&raw).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingField);
        insta::assert_snapshot!(err, @"missing required field: event time");
    }

    #[test]
    fn unparseable_is_missing() {
        let raw = RawInput { start_date: Some("2024-13-01".to_string()), ..raw() };
        assert_eq!(kind(&raw), ErrorKind::MissingField);

        let raw = RawInput { event_time: Some("noon".to_string()), ..self::raw() };
        assert_eq!(kind(&raw), ErrorKind::MissingField);

        let raw = RawInput { count: Some("three".to_string()), ..self::raw() };
        assert_eq!(kind(&raw), ErrorKind::MissingField);
    }

    #[test]
    fn zero_count() {
        let raw = RawInput { count: Some("0".to_string()), ..raw() };
        let err = validate(&raw).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidCount);
        insta::assert_snapshot!(
            err,
            @"number of occurrences must be at least 1, but got 0",
        );
    }

    #[test]
    fn negative_count() {
        let raw = RawInput { count: Some("-4".to_string()), ..raw() };
        assert_eq!(kind(&raw), ErrorKind::InvalidCount);
    }

    #[test]
    fn reversed_window() {
        let raw = RawInput {
            window_start: Some("2024-02-01".to_string()),
            window_end: Some("2024-01-01".to_string()),
            ..raw()
        };
        let err = validate(&raw).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidWindow);
        insta::assert_snapshot!(
            err,
            @"view window start (2024-02-01) cannot be after view window end (2024-01-01)",
        );
    }

    #[test]
    fn single_day_window() {
        let raw = RawInput {
            window_start: Some("2024-01-05".to_string()),
            window_end: Some("2024-01-05".to_string()),
            ..raw()
        };
        assert!(validate(&raw).is_ok());
    }

    #[test]
    fn invalid_weekday() {
        for week_day in [None, Some(""), Some("7"), Some("-1"), Some("funday")]
        {
            let raw = RawInput {
                cadence: CadenceKind::Weekly,
                week_day: week_day.map(str::to_string),
                ..raw()
            };
            assert_eq!(kind(&raw), ErrorKind::InvalidWeekday);
        }
    }

    #[test]
    fn cadence_tokens() {
        assert_eq!("daily".parse::<CadenceKind>().unwrap(), CadenceKind::Daily);
        assert_eq!("D".parse::<CadenceKind>().unwrap(), CadenceKind::Daily);
        assert_eq!("wk".parse::<CadenceKind>().unwrap(), CadenceKind::Weekly);
        assert!("monthly".parse::<CadenceKind>().is_err());
    }
}

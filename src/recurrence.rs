use std::num::NonZero;

use {
    anyhow::Context,
    jiff::{
        Span, Zoned,
        civil::{self, Date, Time, Weekday},
        tz::TimeZone,
    },
};

/// The pattern governing the spacing between occurrences.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Cadence {
    /// Every calendar day.
    Daily,
    /// Every week, on the given day of the week.
    WeeklyOn(Weekday),
}

impl Cadence {
    /// Returns the number of calendar days between consecutive occurrences.
    fn step_days(&self) -> i64 {
        match *self {
            Cadence::Daily => 1,
            Cadence::WeeklyOn(_) => 7,
        }
    }
}

/// A rule describing a finite sequence of recurring event instances.
///
/// Every occurrence is computed directly from its index. There is no state
/// carried from one occurrence to the next, which means `nth` may be called
/// in any order and always returns the same thing.
///
/// All arithmetic is done on civil datetimes. That is, "the next day" means
/// the same wall-clock time on the next calendar day, and not 24 hours later.
/// Attaching a time zone is a separate step (see `generate_in`).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RecurrenceRule {
    first: Date,
    time: Time,
    cadence: Cadence,
    count: NonZero<usize>,
}

impl RecurrenceRule {
    /// Create a new rule starting at `start` that produces exactly `count`
    /// occurrences.
    ///
    /// The seconds and sub-seconds of `start` are dropped. Every occurrence
    /// has the same hour and minute as `start`.
    ///
    /// This returns an error only when aligning `start` to a weekday would
    /// overflow the supported range of dates.
    pub fn new(
        start: civil::DateTime,
        cadence: Cadence,
        count: NonZero<usize>,
    ) -> anyhow::Result<RecurrenceRule> {
        // OK because the hour and minute come from a valid time.
        let time = civil::time(start.hour(), start.minute(), 0, 0);
        let first = align(start.date(), cadence).with_context(|| {
            format!("failed to find first occurrence on or after {start}")
        })?;
        Ok(RecurrenceRule { first, time, cadence, count })
    }

    /// Returns the cadence of this rule.
    pub fn cadence(&self) -> Cadence {
        self.cadence
    }

    /// Returns the total number of occurrences this rule produces.
    pub fn count(&self) -> usize {
        self.count.get()
    }

    /// Returns the date of the first occurrence.
    ///
    /// For a weekly cadence, this is the earliest date on or after the
    /// start date that falls on the target weekday.
    pub fn first_date(&self) -> Date {
        self.first
    }

    /// Returns the wall-clock time shared by every occurrence.
    pub fn time(&self) -> Time {
        self.time
    }

    /// Returns the occurrence at index `i`.
    ///
    /// `i` may be greater than or equal to `count`, in which case this
    /// continues the sequence past its end. An error is returned when the
    /// occurrence would fall outside the supported range of dates.
    pub fn nth(&self, i: usize) -> anyhow::Result<civil::DateTime> {
        let days = i64::try_from(i)
            .ok()
            .and_then(|i| i.checked_mul(self.cadence.step_days()))
            .with_context(|| format!("occurrence index {i} is too big"))?;
        let span = Span::new().try_days(days)?;
        let date = self.first.checked_add(span).with_context(|| {
            format!(
                "occurrence {n} is {days} days after {first}, \
                 which is out of range",
                n = i + 1,
                first = self.first,
            )
        })?;
        Ok(date.to_datetime(self.time))
    }

    /// Returns an iterator over every occurrence in this rule, in order.
    pub fn iter(
        &self,
    ) -> impl Iterator<Item = anyhow::Result<civil::DateTime>> + '_ {
        (0..self.count()).map(|i| self.nth(i))
    }

    /// Returns every occurrence in this rule as civil datetimes.
    ///
    /// The last occurrence is checked before anything else, so that a
    /// sequence running off the end of the calendar fails before any work
    /// is done.
    pub fn generate(&self) -> anyhow::Result<Vec<civil::DateTime>> {
        self.nth(self.count() - 1)?;
        let mut occurrences = Vec::with_capacity(self.count());
        for result in self.iter() {
            occurrences.push(result?);
        }
        Ok(occurrences)
    }

    /// Returns every occurrence in this rule as zoned datetimes in `tz`.
    ///
    /// Wall-clock times that don't exist in `tz` (because of a gap, like
    /// the spring forward DST transition) are resolved to a later clock
    /// time. Ambiguous wall-clock times (because of a fold) resolve to the
    /// earlier of the two instants.
    pub fn generate_in(&self, tz: &TimeZone) -> anyhow::Result<Vec<Zoned>> {
        let mut occurrences = Vec::with_capacity(self.count());
        for dt in self.generate()? {
            let zdt = dt.to_zoned(tz.clone()).with_context(|| {
                format!("failed to attach time zone to {dt}")
            })?;
            occurrences.push(zdt);
        }
        Ok(occurrences)
    }
}

/// Returns the first date on or after `start` that matches the cadence.
fn align(start: Date, cadence: Cadence) -> anyhow::Result<Date> {
    let Cadence::WeeklyOn(target) = cadence else { return Ok(start) };
    let advance = target.since(start.weekday());
    log::debug!(
        "aligning {start} ({current:?}) to {target:?} by \
         advancing {advance} days",
        current = start.weekday(),
    );
    Ok(start.checked_add(Span::new().try_days(advance)?)?)
}

use jiff::{
    Zoned,
    civil::{Date, Time},
    tz::TimeZone,
};

/// An inclusive range of calendar dates used to flag occurrences.
///
/// Membership is decided by calendar date alone. The time of day of an
/// occurrence never matters, which is the same as saying the window starts
/// at the first instant of `start` and ends at the last instant of `end`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ViewWindow {
    start: Date,
    end: Date,
}

impl ViewWindow {
    /// Create a new window from `start` to `end`, both inclusive.
    ///
    /// This returns `None` when `start` is after `end`.
    pub fn new(start: Date, end: Date) -> Option<ViewWindow> {
        if start > end {
            return None;
        }
        Some(ViewWindow { start, end })
    }

    pub fn start(&self) -> Date {
        self.start
    }

    pub fn end(&self) -> Date {
        self.end
    }

    /// Returns true when `date` falls on or between the window's bounds.
    pub fn contains(&self, date: Date) -> bool {
        self.start <= date && date <= self.end
    }

    /// Returns the first instant of this window in the given time zone.
    ///
    /// This is usually midnight on the start date, but not always. Some
    /// time zones have DST transitions at midnight.
    pub fn first_instant(&self, tz: &TimeZone) -> anyhow::Result<Zoned> {
        Ok(self.start.to_zoned(tz.clone())?.start_of_day()?)
    }

    /// Returns the last instant of this window, at millisecond precision,
    /// in the given time zone.
    pub fn last_instant(&self, tz: &TimeZone) -> anyhow::Result<Zoned> {
        let last = Time::new(23, 59, 59, 999_000_000)?;
        Ok(self.end.to_datetime(last).to_zoned(tz.clone())?)
    }
}

/// A single generated event instance, flagged by window membership.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Occurrence {
    datetime: Zoned,
    inside_window: bool,
}

impl Occurrence {
    pub fn datetime(&self) -> &Zoned {
        &self.datetime
    }

    /// Whether this occurrence's calendar date is within the view window.
    pub fn is_inside_window(&self) -> bool {
        self.inside_window
    }
}

/// Flag each of the given occurrences as inside or outside `window`.
///
/// The order and length of the input is preserved.
pub fn classify(
    occurrences: impl IntoIterator<Item = Zoned>,
    window: &ViewWindow,
) -> Vec<Occurrence> {
    occurrences
        .into_iter()
        .map(|datetime| {
            let inside_window = window.contains(datetime.date());
            Occurrence { datetime, inside_window }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use jiff::civil::date;

    use super::*;

    fn zoned(s: &str) -> Zoned {
        s.parse().unwrap()
    }

    #[test]
    fn rejects_reversed_bounds() {
        assert_eq!(ViewWindow::new(date(2024, 2, 1), date(2024, 1, 1)), None);
        assert!(ViewWindow::new(date(2024, 1, 1), date(2024, 1, 1)).is_some());
    }

    #[test]
    fn bounds_are_inclusive() {
        let window =
            ViewWindow::new(date(2024, 1, 2), date(2024, 1, 9)).unwrap();
        assert!(!window.contains(date(2024, 1, 1)));
        assert!(window.contains(date(2024, 1, 2)));
        assert!(window.contains(date(2024, 1, 5)));
        assert!(window.contains(date(2024, 1, 9)));
        assert!(!window.contains(date(2024, 1, 10)));
    }

    #[test]
    fn time_of_day_is_irrelevant() {
        let window =
            ViewWindow::new(date(2024, 1, 2), date(2024, 1, 9)).unwrap();
        let classified = classify(
            [
                zoned("2024-01-01T23:59:59.999-05:00[America/New_York]"),
                zoned("2024-01-02T00:00:00-05:00[America/New_York]"),
                zoned("2024-01-09T23:59:00-05:00[America/New_York]"),
                zoned("2024-01-10T00:00:00-05:00[America/New_York]"),
            ],
            &window,
        );
        let flags: Vec<bool> =
            classified.iter().map(|o| o.is_inside_window()).collect();
        assert_eq!(flags, vec![false, true, true, false]);
    }

    #[test]
    fn preserves_order_and_length() {
        let window =
            ViewWindow::new(date(2024, 1, 2), date(2024, 1, 9)).unwrap();
        let input = vec![
            zoned("2024-01-10T09:00:00-05:00[America/New_York]"),
            zoned("2024-01-03T09:00:00-05:00[America/New_York]"),
            zoned("2023-12-25T09:00:00-05:00[America/New_York]"),
        ];
        let classified = classify(input.clone(), &window);
        assert_eq!(classified.len(), 3);
        for (occ, zdt) in classified.iter().zip(input.iter()) {
            assert_eq!(occ.datetime(), zdt);
        }
        assert!(!classified[0].is_inside_window());
        assert!(classified[1].is_inside_window());
        assert!(!classified[2].is_inside_window());
    }

    #[test]
    fn normalized_instants() {
        let tz = TimeZone::get("America/New_York").unwrap();
        let window =
            ViewWindow::new(date(2024, 1, 2), date(2024, 1, 9)).unwrap();
        insta::assert_snapshot!(
            window.first_instant(&tz).unwrap(),
            @"2024-01-02T00:00:00-05:00[America/New_York]",
        );
        insta::assert_snapshot!(
            window.last_instant(&tz).unwrap(),
            @"2024-01-09T23:59:59.999-05:00[America/New_York]",
        );
    }

    /// The end of the calendar can't always be expressed as an instant, but
    /// dates on it are still classified.
    #[test]
    fn end_of_calendar() {
        let tz = TimeZone::get("America/New_York").unwrap();
        let window =
            ViewWindow::new(date(2024, 1, 1), date(9999, 12, 31)).unwrap();
        assert!(window.last_instant(&tz).is_err());
        assert!(window.contains(date(9999, 12, 31)));

        let zdt = zoned("2024-01-01T09:00-05:00[America/New_York]");
        let classified = classify([zdt], &window);
        assert!(classified[0].is_inside_window());
    }
}

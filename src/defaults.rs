use {
    anyhow::Context,
    jiff::{ToSpan, civil::Date},
};

/// The field values used when the input layer doesn't provide them.
///
/// These are always computed from an explicit "today." Nothing in here
/// reads the current time.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Defaults {
    pub start_date: Date,
    pub window_start: Date,
    pub window_end: Date,
}

impl Defaults {
    /// Compute the defaults relative to `today`.
    ///
    /// The view window ends two calendar months after `today`. When that
    /// day doesn't exist in the target month, the excess days roll over
    /// into the following month. For example, `2024-12-31` gives
    /// `2025-03-03`, since February 2025 has no 29th, 30th or 31st.
    pub fn from_today(today: Date) -> anyhow::Result<Defaults> {
        // Adding months to the 1st never clamps. Adding the remaining days
        // afterwards is what makes a nonexistent day spill over.
        let window_end = today
            .first_of_month()
            .checked_add(2.months())
            .and_then(|d| d.checked_add((today.day() - 1).days()))
            .with_context(|| format!("failed to add two months to {today}"))?;
        Ok(Defaults { start_date: today, window_start: today, window_end })
    }
}

use std::io::Write;

use jiff::Zoned;

use crate::{args::flags::Format, style::Theme, window::Occurrence};

/// Formats the date of `zdt` like `January 3, 2024`.
pub fn format_date(zdt: &Zoned) -> String {
    zdt.strftime("%B %-d, %Y").to_string()
}

/// Formats the clock time of `zdt` like `09:00 AM`.
pub fn format_time(zdt: &Zoned) -> String {
    zdt.strftime("%I:%M %p").to_string()
}

/// An occurrence prepared for display.
#[derive(Clone, Debug)]
pub struct Rendered<'a> {
    date: String,
    time: String,
    occurrence: &'a Occurrence,
}

impl<'a> Rendered<'a> {
    pub fn new(occurrence: &'a Occurrence) -> Rendered<'a> {
        let zdt = occurrence.datetime();
        Rendered { date: format_date(zdt), time: format_time(zdt), occurrence }
    }

    /// Write this occurrence as a single line of human readable text.
    ///
    /// Occurrences outside of the view window are marked, and when the
    /// theme supports it, styled differently.
    fn write_text<W: Write>(
        &self,
        mut wtr: W,
        theme: &Theme,
    ) -> anyhow::Result<()> {
        let line = format!("{} at {}", self.date, self.time);
        if self.occurrence.is_inside_window() {
            writeln!(wtr, "{line}")?;
        } else {
            let line = format!("{line} (outside view window)");
            writeln!(wtr, "{}", theme.outside(line))?;
        }
        Ok(())
    }

    fn write_json<W: Write>(&self, mut wtr: W) -> anyhow::Result<()> {
        serde_json::to_writer(&mut wtr, self)?;
        writeln!(wtr)?;
        Ok(())
    }
}

impl<'a> serde::Serialize for Rendered<'a> {
    fn serialize<S: serde::Serializer>(
        &self,
        s: S,
    ) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;

        let mut state = s.serialize_struct("Rendered", 4)?;
        state.serialize_field("date", &self.date)?;
        state.serialize_field("time", &self.time)?;
        state.serialize_field(
            "datetime",
            &self.occurrence.datetime().to_string(),
        )?;
        state.serialize_field(
            "inside_window",
            &self.occurrence.is_inside_window(),
        )?;
        state.end()
    }
}

/// Writes every occurrence to `wtr` in the given format.
///
/// The theme is only used for the text format.
pub fn write_all<W: Write>(
    mut wtr: W,
    format: &Format,
    theme: &Theme,
    occurrences: &[Occurrence],
) -> anyhow::Result<()> {
    for occurrence in occurrences {
        let rendered = Rendered::new(occurrence);
        match *format {
            Format::Text => rendered.write_text(&mut wtr, theme)?,
            Format::Json => rendered.write_json(&mut wtr)?,
        }
    }
    Ok(())
}

use crate::args::Usage;

/// The ways in which generated occurrences can be printed.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Format {
    /// One human readable line per occurrence.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

impl Format {
    pub const USAGE: Usage = Usage::flag(
        "-f, --format <kind>",
        "Print occurrences in this format.",
        r#"
Print occurrences in this format.

The legal values for this flag are `text` (default) and `json`.

The `text` format prints one line per occurrence, e.g.,
`January 3, 2024 at 09:00 AM`. Occurrences whose date falls outside of the
view window have ` (outside view window)` appended. When stdout is a terminal,
they are also styled differently. Set `NO_COLOR` to disable styling.

The `json` format prints one JSON object per line with the keys `date`, `time`,
`datetime` (an RFC 9557 timestamp) and `inside_window` (a boolean).
"#,
    );
}

impl std::str::FromStr for Format {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Format> {
        let format = match &*s.to_lowercase() {
            "text" | "txt" => Format::Text,
            "json" | "jsonl" => Format::Json,
            unk => anyhow::bail!("unrecognized output format: `{unk}`"),
        };
        Ok(format)
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match *self {
            Format::Text => write!(f, "text"),
            Format::Json => write!(f, "json"),
        }
    }
}

use std::io::Write;

use crate::{args, defaults::Defaults};

const USAGE: &'static str = r#"
Print the default field values for the current date.

These are the values `recur instances` uses when the corresponding flags are
not given. The current date is taken from the `RECUR_NOW` environment variable
when it is set, and the system clock otherwise. Either way, it is interpreted
in your system's configured time zone (which may be overridden by the `TZ`
environment variable).

USAGE:
    recur defaults

TIP:
    use -h for short docs and --help for long docs

EXAMPLES:
    Show the defaults as of July 20, 2024:

        $ RECUR_NOW=2024-07-20T12:00:00Z recur defaults
        start date:         2024-07-20
        view window start:  2024-07-20
        view window end:    2024-09-20

OPTIONS:
%flags%
"#;

pub fn run(p: &mut lexopt::Parser) -> anyhow::Result<()> {
    args::configure(p, USAGE, &mut [])?;

    let today = crate::NOW.date();
    let defaults = Defaults::from_today(today)?;
    log::trace!("computed defaults from {today}: {defaults:?}");

    let mut wtr = std::io::stdout().lock();
    writeln!(wtr, "start date:         {}", defaults.start_date)?;
    writeln!(wtr, "view window start:  {}", defaults.window_start)?;
    writeln!(wtr, "view window end:    {}", defaults.window_end)?;
    Ok(())
}

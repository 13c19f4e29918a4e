mod defaults;
mod instances;

const USAGE: &'static str = "\
A simple utility for generating recurring event instances.

USAGE:
    recur <command> ...

COMMANDS:
    defaults   Print the default field values for the current date
    instances  Generate recurring event instances and check them against a
               view window
";

pub fn run(p: &mut lexopt::Parser) -> anyhow::Result<()> {
    let cmd = crate::args::next_as_command(USAGE, p)?;
    match &*cmd {
        "defaults" => defaults::run(p),
        "instances" | "inst" => instances::run(p),
        unk => anyhow::bail!("unrecognized command '{}'", unk),
    }
}

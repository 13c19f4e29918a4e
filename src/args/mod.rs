use std::{
    fmt::{Debug, Display, Write},
    str::FromStr,
    sync::LazyLock,
};

use {
    anyhow::Context,
    lexopt::{Arg, Parser, ValueExt},
    regex::Regex,
};

pub mod flags;

/// A target for command line arguments.
///
/// Each command collects its flags and positional arguments into one or more
/// `Configurable` values. `configure` offers every argument to each target
/// in turn until one of them accepts it.
pub trait Configurable: Debug {
    /// Consume `arg` (and possibly its value from `p`) if it belongs to this
    /// target. Returns false when the argument isn't recognized.
    fn configure(
        &mut self,
        p: &mut Parser,
        arg: &mut Arg,
    ) -> anyhow::Result<bool>;

    /// Documentation for every flag and argument this target recognizes.
    fn usage(&self) -> &[Usage] {
        &[]
    }
}

/// Feed every remaining argument in `p` to `targets`.
///
/// `-h` and `--help` are handled here. They produce a `Help` error holding
/// the rendered docs for `usage`, where `%args%` and `%flags%` are replaced
/// with the docs from the targets. Unrecognized arguments are an error.
pub fn configure(
    p: &mut Parser,
    usage: &str,
    targets: &mut [&mut dyn Configurable],
) -> anyhow::Result<()> {
    loop {
        let Some(arg) = p.next()? else { break };
        if arg == Arg::Short('h') || arg == Arg::Long("help") {
            let help = Help::render(usage, targets, arg == Arg::Short('h'));
            return Err(anyhow::Error::from(help));
        }
        // `arg` borrows from `p`, but targets need `p` to read flag values.
        // So long flag names are copied out first.
        let long_flag: Option<String> = match arg {
            Arg::Long(name) => Some(name.to_string()),
            _ => None,
        };
        let mut arg = match long_flag {
            Some(ref flag) => Arg::Long(flag),
            None => match arg {
                Arg::Short(c) => Arg::Short(c),
                Arg::Long(_) => unreachable!(),
                Arg::Value(value) => Arg::Value(value),
            },
        };
        let mut recognized = false;
        for t in targets.iter_mut() {
            if t.configure(p, &mut arg)? {
                recognized = true;
                break;
            }
        }
        if !recognized {
            return Err(arg.unexpected().into());
        }
    }
    Ok(())
}

/// Parses the next argument as the name of a sub-command.
///
/// When there is no next argument, the usage is returned as an error. When
/// it is `-h/--help` or `--version`, a `Help` or `Version` error is returned.
pub fn next_as_command(usage: &str, p: &mut Parser) -> anyhow::Result<String> {
    let usage = usage.trim();
    let Some(arg) = p.next()? else { anyhow::bail!("{usage}") };
    match arg {
        Arg::Value(cmd) => Ok(cmd.string()?),
        Arg::Short('h') | Arg::Long("help") => {
            Err(anyhow::Error::from(Help(usage.to_string())))
        }
        Arg::Long("version") => Err(anyhow::Error::from(Version)),
        arg => Err(arg.unexpected().into()),
    }
}

/// Parses the value of the current flag into `T`.
///
/// Errors include `flag_name`.
pub fn parse<T>(p: &mut Parser, flag_name: &'static str) -> anyhow::Result<T>
where
    T: FromStr,
    <T as FromStr>::Err: Display + Debug + Send + Sync + 'static,
{
    let osv = p.value().context(flag_name)?;
    let Some(strv) = osv.to_str() else {
        let err = lexopt::Error::NonUnicodeValue(osv.into());
        return Err(anyhow::Error::from(err).context(flag_name));
    };
    // Most `FromStr` impls here return `anyhow::Error`, which isn't a
    // `std::error::Error`, hence `Error::msg`.
    strv.parse().map_err(|err| anyhow::Error::msg(err).context(flag_name))
}

/// Documentation for a single flag or positional argument.
#[derive(Clone, Copy, Debug)]
pub struct Usage {
    /// True for an optional flag, false for a positional argument.
    pub flag: bool,
    /// How the flag is written, e.g., `-c, --count <number>`.
    pub format: &'static str,
    /// A one line description shown by `-h`.
    pub short: &'static str,
    /// A possibly multi-paragraph description shown by `--help`.
    pub long: &'static str,
}

impl Usage {
    pub const fn flag(
        format: &'static str,
        short: &'static str,
        long: &'static str,
    ) -> Usage {
        Usage { flag: true, format, short, long }
    }

    pub const fn arg(
        format: &'static str,
        short: &'static str,
        long: &'static str,
    ) -> Usage {
        Usage { flag: false, format, short, long }
    }

    /// Renders a two column table of formats and short descriptions.
    pub fn short(usages: &[Usage]) -> String {
        let mut result = String::new();
        let Some(width) = usages.iter().map(|u| u.format.len()).max() else {
            return result;
        };
        for usage in usages.iter() {
            // Writing to a `String` never fails.
            let _ = writeln!(
                result,
                "    {:width$}  {}",
                usage.format, usage.short,
            );
        }
        result
    }

    /// Renders each format followed by its long description, wrapped and
    /// indented beneath it.
    pub fn long(usages: &[Usage]) -> String {
        let wrap_opts = textwrap::Options::new(79)
            .initial_indent("        ")
            .subsequent_indent("        ");
        let mut result = String::new();
        for (i, usage) in usages.iter().enumerate() {
            if i > 0 {
                result.push('\n');
            }
            result.push_str("    ");
            result.push_str(usage.format);
            result.push('\n');
            for (j, paragraph) in usage.long.trim().split("\n\n").enumerate() {
                if j > 0 {
                    result.push('\n');
                }
                let flattened = paragraph.replace('\n', " ");
                for line in textwrap::wrap(&flattened, &wrap_opts) {
                    result.push_str(&line);
                    result.push('\n');
                }
            }
        }
        result
    }
}

/// Help output, returned as an error so that it unwinds to `main`.
///
/// `main` downcasts for this and prints it to stdout with a success exit
/// code.
#[derive(Debug)]
pub struct Help(String);

impl Help {
    const USAGE: Usage = Usage::flag(
        "-h, --help",
        "Print help output. Use --help for complete docs.",
        r#"
Print help output.

The short flag, -h, prints one line per flag and omits some examples. The long
flag, --help, prints the complete documentation for every flag.
"#,
    );

    /// Renders the docs for a command from its usage template and the
    /// argument targets it was configured with.
    fn render(
        template: &str,
        targets: &[&mut dyn Configurable],
        short: bool,
    ) -> Help {
        // Everything from `%snip-start%` through `%snip-end%` is only shown
        // in the long docs.
        static SNIPPED: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"(?m)^\s*%snip-start%\p{any}*?%snip-end%\s*$")
                .unwrap()
        });
        static MARKERS: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"(?m)^\s*%snip-(start|end)%\s*$").unwrap()
        });

        let mut args = vec![];
        // `-h/--help` and `--version` are accepted everywhere.
        let mut flags = vec![Help::USAGE, Version::USAGE];
        for t in targets.iter() {
            for &u in t.usage() {
                if u.flag { flags.push(u) } else { args.push(u) }
            }
        }
        // Positional arguments keep their order, flags are alphabetical by
        // their long name.
        flags.sort_by_key(|u| {
            u.format.split_once(", ").map(|(_, long)| long).unwrap_or(u.format)
        });
        let (template, args, flags) = if short {
            (
                SNIPPED.replace_all(template, ""),
                Usage::short(&args),
                Usage::short(&flags),
            )
        } else {
            (
                MARKERS.replace_all(template, ""),
                Usage::long(&args),
                Usage::long(&flags),
            )
        };
        let docs = template.replace("%args%", &args).replace("%flags%", &flags);
        Help(docs.trim().to_string())
    }
}

impl std::fmt::Display for Help {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for Help {}

/// The `--version` output, returned as an error in the same way as `Help`.
#[derive(Debug)]
pub struct Version;

impl Version {
    const USAGE: Usage = Usage::flag(
        "--version",
        "Print the version of Recur.",
        r#"
Print the version of Recur.
"#,
    );
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let semver = option_env!("CARGO_PKG_VERSION").unwrap_or("N/A");
        match option_env!("RECUR_BUILD_GIT_HASH") {
            None => write!(f, "Recur {semver}"),
            Some(hash) => write!(f, "Recur {semver} (rev {hash})"),
        }
    }
}

impl std::error::Error for Version {}

#[cfg(test)]
mod tests {
    use super::*;

    const COUNT: Usage = Usage::flag(
        "-c, --count <number>",
        "How many.",
        r#"
How many.

Must be at least 1.
"#,
    );
    const CADENCE: Usage = Usage::arg("<cadence>", "How often.", "How often.");

    #[derive(Debug)]
    struct Target;

    impl Configurable for Target {
        fn configure(
            &mut self,
            _: &mut Parser,
            _: &mut Arg,
        ) -> anyhow::Result<bool> {
            Ok(false)
        }

        fn usage(&self) -> &[Usage] {
            &[COUNT, CADENCE]
        }
    }

    #[test]
    fn short_table() {
        assert_eq!(
            Usage::short(&[COUNT, CADENCE]),
            "    -c, --count <number>  How many.\n\
             \x20   <cadence>             How often.\n",
        );
    }

    #[test]
    fn long_paragraphs() {
        assert_eq!(
            Usage::long(&[COUNT]),
            "    -c, --count <number>\n\
             \x20       How many.\n\
             \n\
             \x20       Must be at least 1.\n",
        );
    }

    #[test]
    fn help_snips_short_docs() {
        let template = "\
intro

%snip-start%
hidden
%snip-end%
ARGS:
%args%
";
        let mut target = Target;
        let short =
            Help::render(template, &[&mut target], true).to_string();
        assert!(!short.contains("hidden"));
        assert!(short.contains("<cadence>"));
        assert!(short.contains("How often."));

        let long = Help::render(template, &[&mut target], false).to_string();
        assert!(long.contains("hidden"));
        assert!(!long.contains("%snip"));
    }
}

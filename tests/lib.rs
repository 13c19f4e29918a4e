use std::{ffi::OsStr, sync::LazyLock};

use jiff::{Zoned, civil};


static NOW: LazyLock<Zoned> = LazyLock::new(|| {
    civil::date(2024, 7, 20)
        .at(16, 30, 55, 0)
        .in_tz("America/New_York")
        .unwrap()
});

/// Return a command for the `recur` binary and no argument.
fn recur_bare() -> crate::command::Command {
    crate::command::bin("recur")
        .env("TZ", "America/New_York")
        .env("RECUR_NOW", NOW.timestamp().to_string())
        .env("NO_COLOR", "1")
}

/// Return a command for the `recur` binary with the given arguments appended
/// to it.
fn recur<T: AsRef<OsStr>>(
    args: impl IntoIterator<Item = T>,
) -> crate::command::Command {
    recur_bare().args(args)
}

/// Test that calling `recur` with no arguments prints the top-level usage.
#[test]
fn no_args() {
    crate::command::assert_cmd_snapshot!(
        recur_bare(),
        @r"
    success: false
    exit_code: 1
    ----- stdout -----

    ----- stderr -----
    A simple utility for generating recurring event instances.

    USAGE:
        recur <command> ...

    COMMANDS:
        defaults   Print the default field values for the current date
        instances  Generate recurring event instances and check them against a
                   view window
    ",
    );
}

#[test]
fn unknown_command() {
    crate::command::assert_cmd_snapshot!(
        recur(["monthly"]),
        @r"
    success: false
    exit_code: 1
    ----- stdout -----

    ----- stderr -----
    unrecognized command 'monthly'
    ",
    );
}

#[test]
fn version() {
    let snap = recur(["--version"]).snapshot();
    assert!(snap.stdout().starts_with("Recur "), "{}", snap.snapshot());
}

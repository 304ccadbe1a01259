#[path = "common/mod.rs"]
mod common;

use common::conkit;
use predicates::boolean::PredicateBooleanExt;
use predicates::str::contains;

#[test]
fn help_prints_usage_and_exits_zero() {
    conkit()
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("Usage: ").and(contains("[ options ]")))
        .stdout(contains("--name          -n        Who to greet. default: World"))
        .stdout(contains("Peak memory usage").not());
}

#[test]
fn help_honours_no_color_flag() {
    conkit()
        .env_remove("NO_COLOR")
        .args(["--help", "--no-color"])
        .assert()
        .success()
        .stdout(contains("--name          -n"))
        .stdout(contains("\u{1b}[").not());
}

#[test]
fn help_is_painted_without_color_opt_out() {
    conkit()
        .env_remove("NO_COLOR")
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("\u{1b}[1;37m--name\u{1b}[0m"));
}

#[cfg(unix)]
#[test]
fn non_utf8_argument_is_accepted() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    conkit()
        .arg(OsStr::from_bytes(b"caf\xff"))
        .assert()
        .success()
        .stdout(contains("| #0     | caf\u{FFFD}"))
        .stderr(contains("panicked").not());
}

#[test]
fn short_help_alias_behaves_like_long_form() {
    conkit()
        .args(["-h", "ignored"])
        .assert()
        .success()
        .stdout(contains("Options:"))
        .stdout(contains("Hello,").not());
}

#[test]
fn greets_and_lists_options_and_positionals() {
    conkit()
        .args(["--name=Alice", "extra"])
        .assert()
        .success()
        .stdout(contains("Hello, Alice!"))
        .stdout(contains("| --name | Alice |"))
        .stdout(contains("| #0     | extra |"))
        .stdout(contains("Peak memory usage: ").and(contains("Elapsed time: ")));
}

#[test]
fn flag_does_not_consume_following_value() {
    conkit()
        .args(["-d", "file.txt"])
        .assert()
        .success()
        .stdout(contains("| #0     | file.txt |"))
        .stdout(contains("Object[2]"))
        .stdout(contains("name => (string[5]) \"World\""));
}

#[test]
fn exec_shows_command_output() {
    conkit()
        .args(["--exec", "printf hello"])
        .assert()
        .success()
        .stdout(contains("'printf' 'hello'"))
        .stdout(contains("| hello"));
}

#[test]
fn invalid_log_level_fails() {
    conkit()
        .args(["--log-level", "noisy"])
        .assert()
        .code(2)
        .stderr(contains("Invalid value for --log-level"));
}

#[test]
fn no_color_env_keeps_output_plain() {
    conkit()
        .assert()
        .success()
        .stdout(contains("\u{1b}[").not())
        .stdout(contains("Hello, World!"));
}

#[path = "common/mod.rs"]
mod common;

use std::fs;

use common::{conkit, read_lines};
use predicates::str::contains;
use tempfile::tempdir;

#[test]
fn logfile_option_records_greeting() {
    let temp = tempdir().expect("failed to create tempdir");
    let logfile = temp.path().join("logs/conkit.log");

    conkit()
        .args(["--name", "Bob", "--logfile"])
        .arg(&logfile)
        .assert()
        .success();

    let lines = read_lines(&logfile);
    assert_eq!(lines.len(), 1, "unexpected log content: {lines:?}");
    assert!(lines[0].ends_with(" conkit Info: Greeted Bob"));
}

#[test]
fn config_logfile_is_relative_to_config_and_mirrors_text() {
    let temp = tempdir().expect("failed to create tempdir");
    let dir = temp.path();
    let config_path = dir.join("console.yaml");
    fs::write(
        &config_path,
        "logfile: out/console.log\nreferer: nightly\ntext_to_log: true\nappend_pid_on_log: true\n",
    )
    .expect("failed to write config");

    conkit()
        .args(["--exec", "ls /definitely/not/here", "-c"])
        .arg(&config_path)
        .assert()
        .success()
        .stdout(contains("WARNING: Command exited with status"));

    let lines = read_lines(&dir.join("out/console.log"));
    assert!(lines.iter().any(|line| line.ends_with("nightly Info: Greeted World")));
    assert!(
        lines
            .iter()
            .any(|line| line.contains(" nightly WARNING: Command exited with status"))
    );
    assert!(lines.iter().all(|line| line.contains(" #")));
}

#[test]
fn missing_logfile_directory_is_created() {
    let temp = tempdir().expect("failed to create tempdir");
    let logfile = temp.path().join("a/b/c.log");

    conkit().arg("-L").arg(&logfile).assert().success();
    assert!(logfile.exists());
}

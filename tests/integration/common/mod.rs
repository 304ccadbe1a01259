#![allow(dead_code)]

use std::{fs, path::Path};

use assert_cmd::Command;

/// `conkit` with colors disabled and no inherited log filter.
pub fn conkit() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("conkit"));
    cmd.env("NO_COLOR", "1").env_remove("RUST_LOG");
    cmd
}

pub fn read_lines(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .unwrap_or_else(|err| panic!("failed to read {}: {err}", path.display()))
        .lines()
        .map(str::to_string)
        .collect()
}

//! Help output specs

use crate::prelude::*;

#[test]
fn help_lists_commands() {
    asc()
        .args(&["--help"])
        .passes()
        .stdout_has("run")
        .stdout_has("drain")
        .stdout_has("status")
        .stdout_has("install")
        .stdout_has("uninstall");
}

#[test]
fn run_help_lists_flags() {
    asc()
        .args(&["run", "--help"])
        .passes()
        .stdout_has("--json")
        .stdout_has("--defer");
}

#[test]
fn drain_help_lists_watch() {
    asc()
        .args(&["drain", "--help"])
        .passes()
        .stdout_has("--watch");
}

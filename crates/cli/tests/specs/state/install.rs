//! `asc install` and `asc uninstall` specs

use crate::prelude::*;

#[test]
fn first_install_migrates_legacy_state() {
    let temp = Project::empty();

    temp.asc()
        .args(&["install"])
        .passes()
        .stdout_has("Cleared cron run state")
        .stdout_has("Removed legacy dss_cron state");
}

#[test]
fn second_install_skips_migration() {
    let temp = Project::empty();
    temp.asc().args(&["install"]).passes();

    temp.asc()
        .args(&["install"])
        .passes()
        .stdout_has("Cleared cron run state")
        .stdout_lacks("legacy");
}

#[test]
fn install_clears_cooldown() {
    let temp = Project::empty();
    temp.asc().args(&["run"]).fails();
    temp.asc().args(&["install"]).passes();

    temp.asc()
        .args(&["run"])
        .fails()
        .stdout_lacks("Rate limited");
}

#[test]
fn uninstall_removes_migration_flag() {
    let temp = Project::empty();
    temp.asc().args(&["install"]).passes();
    temp.asc()
        .args(&["uninstall"])
        .passes()
        .stdout_has("Removed all cron state");

    temp.asc()
        .args(&["install"])
        .passes()
        .stdout_has("Removed legacy dss_cron state");
}

#[test]
fn uninstall_clears_queue() {
    let temp = Project::with_queue();
    temp.asc().args(&["run", "--defer"]).passes();
    temp.asc().args(&["uninstall"]).passes();

    temp.asc()
        .args(&["status"])
        .passes()
        .stdout_has("Queued jobs: 0");
}

//! Annotation output of `asc run`

use crate::prelude::*;

#[test]
fn empty_network_prints_error_annotation() {
    let temp = Project::empty();

    temp.asc()
        .args(&["run"])
        .fails()
        .stdout_eq("::error::No public sites found in the network\n");
}

#[test]
fn second_run_is_rate_limited() {
    let temp = Project::empty();
    temp.asc().args(&["run"]).fails();

    temp.asc()
        .args(&["run"])
        .fails()
        .stdout_has("::error::Rate limited. Try again in");
}

#[test]
fn cooldown_of_zero_never_rate_limits() {
    let temp = Project::empty();
    temp.asc().args(&["run"]).fails();

    temp.asc()
        .env("ALL_SITES_CRON_RATE_LIMIT_SECONDS", "0")
        .args(&["run"])
        .fails()
        .stdout_lacks("Rate limited")
        .stdout_has("No public sites found");
}

#[test]
fn single_site_install_is_refused() {
    let temp = Project::with_config("");
    temp.file(
        "config.toml",
        &format!(
            "[network]\nmultisite = false\n\n[store]\npath = {:?}\n",
            temp.path().join("state").display().to_string()
        ),
    );

    temp.asc()
        .args(&["run"])
        .fails()
        .stdout_eq("::error::Cron runs require a WordPress multisite network\n");
}

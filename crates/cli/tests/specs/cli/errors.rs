//! Error reporting specs

use crate::prelude::*;

#[test]
fn unknown_command_fails() {
    asc().args(&["frobnicate"]).fails();
}

#[test]
fn missing_config_file_is_reported() {
    let temp = Project::empty();
    let missing = temp.path().join("nope.toml");

    asc()
        .args(&["--config", missing.to_str().unwrap(), "status"])
        .fails()
        .stderr_has("Failed to load configuration");
}

#[test]
fn malformed_config_is_reported() {
    let temp = Project::empty();
    temp.file("broken.toml", "[network\nsites = ");
    let broken = temp.path().join("broken.toml");

    asc()
        .args(&["--config", broken.to_str().unwrap(), "status"])
        .fails()
        .stderr_has("Failed to load configuration")
        .stderr_has("suggestions:");
}

#[test]
fn invalid_tunable_in_environment_is_reported() {
    let temp = Project::empty();

    temp.asc()
        .env("ALL_SITES_CRON_BATCH_SIZE", "lots")
        .args(&["status"])
        .fails()
        .stderr_has("ALL_SITES_CRON_BATCH_SIZE");
}

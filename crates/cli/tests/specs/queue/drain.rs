//! `asc drain` specs

use crate::prelude::*;

#[test]
fn drain_without_queue_fails() {
    let temp = Project::empty();

    temp.asc()
        .args(&["drain"])
        .fails()
        .stderr_has("Job queue is not configured");
}

#[test]
fn drain_empty_queue_is_a_notice() {
    let temp = Project::with_queue();

    temp.asc()
        .args(&["drain"])
        .passes()
        .stdout_eq("::notice::No queued jobs\n");
}

#[test]
fn deferred_run_is_drained_later() {
    let temp = Project::with_queue();

    temp.asc()
        .args(&["run", "--defer"])
        .passes()
        .stdout_eq("::notice::Cron run queued for a worker\n");
    temp.asc()
        .args(&["status"])
        .passes()
        .stdout_has("Queued jobs: 1");

    // The queued job skips the cooldown but still finds no sites
    temp.asc()
        .args(&["drain"])
        .fails()
        .stdout_eq("::error::No public sites found in the network\n");
    temp.asc()
        .args(&["status"])
        .passes()
        .stdout_has("Queued jobs: 0");
}

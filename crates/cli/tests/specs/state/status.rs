//! `asc status` specs

use crate::prelude::*;

#[test]
fn fresh_state_is_idle() {
    let temp = Project::empty();

    temp.asc()
        .args(&["status"])
        .passes()
        .stdout_has("Lock: free")
        .stdout_has("Last run: never")
        .stdout_has("Queued jobs: -");
}

#[test]
fn status_after_run_shows_cooldown() {
    let temp = Project::empty();
    temp.asc().args(&["run"]).fails();

    temp.asc()
        .args(&["status"])
        .passes()
        .stdout_lacks("Last run: never")
        .stdout_has("remaining of 60s");
}

#[test]
fn status_as_json() {
    let temp = Project::with_queue();

    let json = temp.asc().args(&["status", "--json"]).passes().stdout_json();

    assert!(json["lock"].is_null());
    assert_eq!(json["cooldown_secs"], 60);
    assert_eq!(json["pending"], 0);
}

//! JSON output of `asc run`

use crate::prelude::*;

#[test]
fn failed_run_as_json() {
    let temp = Project::empty();

    let json = temp.asc().args(&["run", "--json"]).fails().stdout_json();

    assert_eq!(json["success"], false);
    assert_eq!(json["count"], 0);
    assert_eq!(json["message"], "No public sites found in the network");
    assert!(json["timestamp"].is_string());
}

#[test]
fn rate_limited_run_as_json() {
    let temp = Project::empty();
    temp.asc().args(&["run"]).fails();

    let json = temp.asc().args(&["run", "--json"]).fails().stdout_json();

    assert_eq!(json["success"], false);
    let retry_after = json["retry_after"].as_u64().unwrap();
    assert!(retry_after > 0 && retry_after <= 60);
}

#[test]
fn deferred_run_as_json() {
    let temp = Project::with_queue();

    let json = temp
        .asc()
        .args(&["run", "--defer", "--json"])
        .passes()
        .stdout_json();

    assert_eq!(json["success"], true);
    assert_eq!(json["status"], "queued");
}

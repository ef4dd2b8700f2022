// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::net::TcpListener;
use yare::parameterized;

#[tokio::test]
async fn silent_site_counts_as_fired() {
    // Accepted by the backlog but never answered
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!(
        "http://{}/wp-cron.php?doing_wp_cron=1",
        listener.local_addr().unwrap()
    );

    let result = HttpTrigger::new(false)
        .fire(&url, Duration::from_millis(50))
        .await;

    assert!(result.is_ok(), "{:?}", result);
    drop(listener);
}

#[tokio::test]
async fn refused_connection_is_reported() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = HttpTrigger::new(false)
        .fire(&format!("http://{}/wp-cron.php", addr), Duration::from_millis(200))
        .await
        .unwrap_err();

    assert!(matches!(err, TriggerError::Transport(_)));
}

#[tokio::test]
async fn malformed_url_is_rejected() {
    let result = HttpTrigger::new(false)
        .fire("not a url", Duration::from_millis(10))
        .await;
    assert!(result.is_err());
}

#[parameterized(
    global = { ureq::Timeout::Global },
    send_request = { ureq::Timeout::SendRequest },
    recv_response = { ureq::Timeout::RecvResponse },
    recv_body = { ureq::Timeout::RecvBody },
)]
fn timeout_after_connecting_counts_as_fired(which: ureq::Timeout) {
    assert!(classify("http://x", Err(ureq::Error::Timeout(which))).is_ok());
}

#[parameterized(
    resolve = { ureq::Timeout::Resolve },
    connect = { ureq::Timeout::Connect },
)]
fn timeout_before_connecting_is_reported(which: ureq::Timeout) {
    let err = classify("http://x", Err(ureq::Error::Timeout(which))).unwrap_err();
    assert!(matches!(err, TriggerError::Transport(_)));
}

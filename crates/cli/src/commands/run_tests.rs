// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use asc_core::clock::FakeClock;
use asc_core::fake::FakeAdapters;
use asc_core::format::Annotation;
use asc_core::keys;
use asc_core::orchestrator::OrchestratorConfig;
use asc_core::store::{MemoryStore, StateStore};
use std::time::Duration;

fn setup(sites: usize) -> (FakeAdapters, Orchestrator<FakeAdapters, FakeClock>) {
    let adapters = FakeAdapters::with_sites(sites);
    let orchestrator = Orchestrator::new(
        &adapters,
        adapters.clock.clone(),
        OrchestratorConfig::default(),
    );
    (adapters, orchestrator)
}

fn queue(adapters: &FakeAdapters) -> JobQueue<MemoryStore<FakeClock>> {
    JobQueue::new(adapters.store.clone(), keys::DEFAULT_QUEUE)
}

#[tokio::test]
async fn run_prints_notice_with_site_count() {
    let (adapters, orchestrator) = setup(3);

    let report = execute(&orchestrator, None, true, false).await;

    assert!(report.success);
    assert_eq!(report.count, Some(3));
    assert_eq!(report.to_string(), "::notice::Running wp-cron on 3 sites");
    assert_eq!(adapters.trigger.calls().len(), 3);
}

#[tokio::test]
async fn empty_network_is_an_error_line() {
    let (_adapters, orchestrator) = setup(0);

    let report = execute(&orchestrator, None, true, false).await;

    assert!(!report.success);
    assert_eq!(
        report.to_string(),
        "::error::No public sites found in the network"
    );
}

#[tokio::test]
async fn single_site_install_is_refused() {
    let (adapters, orchestrator) = setup(3);

    let report = execute(&orchestrator, None, false, false).await;

    assert!(!report.success);
    assert_eq!(report.message, NOT_MULTISITE_MESSAGE);
    assert!(adapters.trigger.calls().is_empty());
}

#[tokio::test]
async fn second_run_inside_cooldown_is_rate_limited() {
    let (adapters, orchestrator) = setup(1);
    execute(&orchestrator, None, true, false).await;
    adapters.clock.advance(Duration::from_secs(15));

    let report = execute(&orchestrator, None, true, false).await;

    assert!(!report.success);
    assert_eq!(report.retry_after, Some(45));
    assert_eq!(
        report.to_string(),
        "::error::Rate limited. Try again in 45 seconds."
    );
}

#[tokio::test]
async fn held_lock_is_a_warning() {
    let (adapters, orchestrator) = setup(2);
    let _held = orchestrator.lock().acquire().await.unwrap();

    let report = execute(&orchestrator, None, true, false).await;

    assert!(!report.success);
    assert_eq!(report.level(), Annotation::Warning);
    assert!(adapters.trigger.calls().is_empty());
}

#[tokio::test]
async fn deferred_run_is_queued() {
    let (adapters, orchestrator) = setup(2);
    let queue = queue(&adapters);

    let report = execute(&orchestrator, Some(&queue), true, true).await;

    assert!(report.success);
    assert_eq!(report.status, Some("queued"));
    assert_eq!(queue.pending().await.unwrap(), 1);
    assert!(adapters.trigger.calls().is_empty());
    assert!(adapters.store.get(keys::LOCK).await.unwrap().is_none());
}

#[tokio::test]
async fn deferred_run_without_queue_runs_now() {
    let (adapters, orchestrator) = setup(2);

    let report = execute(&orchestrator, None, true, true).await;

    assert!(report.success);
    assert_eq!(report.status, None);
    assert_eq!(adapters.trigger.calls().len(), 2);
}

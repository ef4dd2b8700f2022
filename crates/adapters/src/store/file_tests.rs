// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use asc_core::clock::FakeClock;
use tempfile::TempDir;

fn store() -> (TempDir, JsonFileStore<FakeClock>, FakeClock) {
    let dir = tempfile::tempdir().unwrap();
    let clock = FakeClock::at_timestamp(1_700_000_000);
    let store = JsonFileStore::with_clock(dir.path().join("state"), clock.clone()).unwrap();
    (dir, store, clock)
}

#[tokio::test]
async fn value_round_trip_and_delete() {
    let (_dir, store, _clock) = store();

    assert_eq!(store.get("k").await.unwrap(), None);
    store.set("k", "v", None).await.unwrap();
    assert_eq!(store.get("k").await.unwrap(), Some("v".to_string()));

    store.delete("k").await.unwrap();
    store.delete("k").await.unwrap();
    assert_eq!(store.get("k").await.unwrap(), None);
}

#[tokio::test]
async fn ttl_is_enforced_on_read() {
    let (_dir, store, clock) = store();
    store
        .set("k", "v", Some(Duration::from_secs(10)))
        .await
        .unwrap();

    clock.advance(Duration::from_secs(9));
    assert!(store.get("k").await.unwrap().is_some());

    clock.advance(Duration::from_secs(1));
    assert!(store.get("k").await.unwrap().is_none());
    assert!(!record_path(store.dir(), "k").exists());
}

#[tokio::test]
async fn lists_are_fifo() {
    let (_dir, store, _clock) = store();
    store.push("q", "a").await.unwrap();
    store.push("q", "b").await.unwrap();
    assert_eq!(store.len("q").await.unwrap(), 2);

    assert_eq!(store.pop("q").await.unwrap(), Some("a".to_string()));
    assert_eq!(store.pop("q").await.unwrap(), Some("b".to_string()));
    assert_eq!(store.pop("q").await.unwrap(), None);
    assert_eq!(store.len("q").await.unwrap(), 0);
}

#[tokio::test]
async fn type_mismatch_is_a_backend_error() {
    let (_dir, store, _clock) = store();
    store.set("k", "v", None).await.unwrap();

    let err = store.push("k", "x").await.unwrap_err();
    assert!(matches!(err, StoreError::Backend(_)));
}

#[tokio::test]
async fn failed_operation_leaves_directory_unlocked() {
    let (_dir, store, _clock) = store();
    store.set("k", "v", None).await.unwrap();
    assert!(store.push("k", "x").await.is_err());

    let lock = File::open(store.dir().join(LOCK_FILE)).unwrap();
    lock.try_lock_exclusive().unwrap();
    FileExt::unlock(&lock).unwrap();
    assert_eq!(store.get("k").await.unwrap(), Some("v".to_string()));
}

#[tokio::test]
async fn second_handle_sees_writes() {
    let (dir, store, clock) = store();
    let other = JsonFileStore::with_clock(dir.path().join("state"), clock).unwrap();

    store.set("k", "v", None).await.unwrap();
    store.push("q", "job").await.unwrap();

    assert_eq!(other.get("k").await.unwrap(), Some("v".to_string()));
    assert_eq!(other.pop("q").await.unwrap(), Some("job".to_string()));
    assert_eq!(store.len("q").await.unwrap(), 0);
}

#[tokio::test]
async fn keys_are_sanitised_into_file_names() {
    let (_dir, store, _clock) = store();
    store.set("../escape", "v", None).await.unwrap();

    assert!(store.dir().join("___escape.json").exists());
    assert_eq!(store.get("../escape").await.unwrap(), Some("v".to_string()));
}

#[tokio::test]
async fn corrupt_record_is_reported() {
    let (_dir, store, _clock) = store();
    std::fs::write(record_path(store.dir(), "k"), "not json").unwrap();

    assert!(matches!(
        store.get("k").await.unwrap_err(),
        StoreError::Json(_)
    ));
}

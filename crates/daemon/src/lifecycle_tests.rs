// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use asc_core::config::StoreBackend;
use asc_core::keys;
use asc_core::store::StateStore;
use asc_adapters::JsonFileStore;

fn config(dir: &std::path::Path) -> Config {
    let mut config = Config::default();
    config.server.listen = "127.0.0.1:0".to_string();
    config.store.path = Some(dir.to_path_buf());
    config
}

#[tokio::test]
async fn startup_migrates_legacy_keys() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::open(dir.path()).unwrap();
    store.set("dss_cron_lock", "{}", None).await.unwrap();

    let daemon = startup(&config(dir.path())).await.unwrap();

    assert!(store.get("dss_cron_lock").await.unwrap().is_none());
    assert!(store.get(keys::MIGRATED_FLAG).await.unwrap().is_some());
    assert_ne!(daemon.local_addr().unwrap().port(), 0);
}

#[tokio::test]
async fn serve_stops_on_shutdown_signal() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config(dir.path());
    config.store.backend = StoreBackend::Memory;

    let daemon = startup(&config).await.unwrap();
    daemon.serve(async {}).await.unwrap();
}

#[tokio::test]
async fn bind_failure_names_the_address() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config(dir.path());
    config.server.listen = "not-an-address".to_string();

    let err = startup(&config).await.err().unwrap();
    assert!(matches!(err, LifecycleError::Bind { .. }));
    assert!(err.to_string().contains("not-an-address"));
}

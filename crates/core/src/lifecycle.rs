// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Install and uninstall housekeeping for shared state

use crate::clock::Clock;
use crate::keys;
use crate::store::{StateStore, StoreError};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("failed to clear {key}: {source}")]
    Purge {
        key: String,
        #[source]
        source: StoreError,
    },
    #[error("legacy key migration failed: {0}")]
    Migrate(#[source] StoreError),
}

/// Delete lock, marker, site cache, queue and legacy keys
///
/// The migration flag survives unless `include_flag` is set, so a
/// reinstall does not repeat the migration.
pub async fn purge<S: StateStore>(
    store: &S,
    queue_key: &str,
    include_flag: bool,
) -> Result<(), LifecycleError> {
    let mut targets = vec![keys::LOCK, keys::LAST_RUN, keys::SITES_CACHE, queue_key];
    targets.extend_from_slice(keys::LEGACY);
    if include_flag {
        targets.push(keys::MIGRATED_FLAG);
    }

    for key in targets {
        store.delete(key).await.map_err(|source| LifecycleError::Purge {
            key: key.to_string(),
            source,
        })?;
    }
    info!(queue = queue_key, include_flag, "cron state purged");
    Ok(())
}

/// Remove keys left behind by the previous plugin name, once
///
/// Returns true when the migration ran on this call.
pub async fn migrate_legacy<S: StateStore, C: Clock>(
    store: &S,
    clock: &C,
) -> Result<bool, LifecycleError> {
    if store
        .get(keys::MIGRATED_FLAG)
        .await
        .map_err(LifecycleError::Migrate)?
        .is_some()
    {
        return Ok(false);
    }

    for key in keys::LEGACY {
        store.delete(key).await.map_err(LifecycleError::Migrate)?;
    }
    store
        .set(keys::MIGRATED_FLAG, &clock.now().timestamp().to_string(), None)
        .await
        .map_err(LifecycleError::Migrate)?;
    info!("legacy cron keys migrated");
    Ok(true)
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;

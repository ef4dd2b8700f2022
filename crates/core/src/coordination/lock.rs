// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Run lock with TTL-based stale detection
//!
//! The lock record lives in the shared store so that independent worker
//! processes see the same holder. Acquisition is check-then-set, not
//! compare-and-swap: two racing acquirers may both succeed in a narrow
//! window. A holder that crashes leaves a record that goes stale after
//! `ttl` and is overridden by the next acquirer.

use crate::clock::{elapsed_secs, Clock};
use crate::store::{StateStore, StoreError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Default lock TTL, several times the expected worst-case fan-out
pub const DEFAULT_LOCK_TTL: Duration = Duration::from_secs(300);

/// Unique identifier for a lock holder
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HolderId(pub String);

impl HolderId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Fresh random holder id
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl std::fmt::Display for HolderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lock configuration
#[derive(Clone, Debug)]
pub struct LockConfig {
    /// Store key identifying this lock
    pub name: String,
    /// How long before a holder is considered stale
    pub ttl: Duration,
}

impl LockConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ttl: DEFAULT_LOCK_TTL,
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }
}

/// Lock record as persisted in the store
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockRecord {
    pub holder: HolderId,
    pub acquired_at: DateTime<Utc>,
    #[serde(with = "humantime_serde")]
    pub ttl: Duration,
}

impl LockRecord {
    /// Seconds since the record was written
    pub fn age_secs(&self, now: DateTime<Utc>) -> u64 {
        elapsed_secs(self.acquired_at, now)
    }

    /// Whether the holder has outlived its TTL
    pub fn is_stale(&self, now: DateTime<Utc>) -> bool {
        self.age_secs(now) >= self.ttl.as_secs()
    }
}

/// Errors from lock acquisition
#[derive(Debug, Error)]
pub enum LockError {
    #[error("lock '{name}' is held by {holder} ({age_secs}s old)")]
    Locked {
        name: String,
        holder: HolderId,
        age_secs: u64,
    },
    #[error("lock store error: {0}")]
    Store(#[from] StoreError),
}

/// Acquires and releases a single named lock in the shared store
#[derive(Clone)]
pub struct LockManager<S, C> {
    store: S,
    clock: C,
    config: LockConfig,
}

impl<S: StateStore, C: Clock> LockManager<S, C> {
    pub fn new(store: S, clock: C, config: LockConfig) -> Self {
        Self {
            store,
            clock,
            config,
        }
    }

    pub fn config(&self) -> &LockConfig {
        &self.config
    }

    /// Current lock record, if any
    ///
    /// An unreadable record is reported as absent.
    pub async fn inspect(&self) -> Result<Option<LockRecord>, StoreError> {
        let raw = self.store.get(&self.config.name).await?;
        Ok(raw.and_then(|raw| serde_json::from_str(&raw).ok()))
    }

    /// Try to take the lock, overriding a stale holder
    pub async fn acquire(&self) -> Result<HolderId, LockError> {
        let now = self.clock.now();
        let name = &self.config.name;

        if let Some(raw) = self.store.get(name).await? {
            match serde_json::from_str::<LockRecord>(&raw) {
                Ok(current) if !current.is_stale(now) => {
                    let age_secs = current.age_secs(now);
                    debug!(lock = %name, holder = %current.holder, age_secs, "lock denied");
                    return Err(LockError::Locked {
                        name: name.clone(),
                        holder: current.holder,
                        age_secs,
                    });
                }
                Ok(stale) => warn!(
                    lock = %name,
                    previous_holder = %stale.holder,
                    age_secs = stale.age_secs(now),
                    "overriding stale lock"
                ),
                Err(e) => warn!(lock = %name, error = %e, "overriding unreadable lock record"),
            }
        }

        let record = LockRecord {
            holder: HolderId::generate(),
            acquired_at: now,
            ttl: self.config.ttl,
        };
        let value = serde_json::to_string(&record).map_err(StoreError::from)?;
        self.store.set(name, &value, Some(self.config.ttl)).await?;

        info!(lock = %name, holder = %record.holder, "lock acquired");
        Ok(record.holder)
    }

    /// Drop the lock if `holder` still owns it
    ///
    /// Releasing an absent lock is not an error. A lock taken over by
    /// another holder after going stale is left in place.
    pub async fn release(&self, holder: &HolderId) -> Result<(), StoreError> {
        let name = &self.config.name;
        if let Some(current) = self.inspect().await? {
            if current.holder != *holder {
                warn!(
                    lock = %name,
                    %holder,
                    owner = %current.holder,
                    "lock taken over by another holder, not releasing"
                );
                return Ok(());
            }
        }
        self.store.delete(name).await?;
        debug!(lock = %name, %holder, "lock released");
        Ok(())
    }
}

#[cfg(test)]
#[path = "lock_tests.rs"]
mod tests;

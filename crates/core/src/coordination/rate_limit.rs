// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cooldown gate between successive runs
//!
//! The only input is the last-run marker in the shared store. The marker is
//! written after every dispatch attempt, failed or not, so a failing
//! dispatch still starts a fresh cooldown window.

use crate::clock::{elapsed_secs, Clock};
use crate::store::{StateStore, StoreError};
use chrono::{DateTime, TimeZone, Utc};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Marker TTL used when rate limiting is disabled
const DISABLED_MARKER_TTL: Duration = Duration::from_secs(60);

/// A run was attempted inside the cooldown window
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Rate limited. Try again in {} seconds.", .retry_after.as_secs())]
pub struct RateLimited {
    pub retry_after: Duration,
    pub cooldown: Duration,
    pub last_run: Option<DateTime<Utc>>,
}

/// Cooldown gate keyed by the last-run marker
#[derive(Clone)]
pub struct RateLimiter<S, C> {
    store: S,
    clock: C,
    key: String,
    cooldown: Duration,
}

impl<S: StateStore, C: Clock> RateLimiter<S, C> {
    pub fn new(store: S, clock: C, key: impl Into<String>, cooldown: Duration) -> Self {
        Self {
            store,
            clock,
            key: key.into(),
            cooldown,
        }
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// Time of the last recorded run
    ///
    /// A store failure or unreadable marker reads as "never ran" so that a
    /// broken marker cannot lock runs out.
    pub async fn last_run(&self) -> Option<DateTime<Utc>> {
        match self.store.get(&self.key).await {
            Ok(Some(raw)) => raw
                .trim()
                .parse::<i64>()
                .ok()
                .filter(|secs| *secs > 0)
                .and_then(|secs| Utc.timestamp_opt(secs, 0).single()),
            Ok(None) => None,
            Err(e) => {
                warn!(key = %self.key, error = %e, "failed to read last-run marker");
                None
            }
        }
    }

    /// Allow a run unless the cooldown window is still open
    pub async fn check(&self) -> Result<(), RateLimited> {
        let cooldown = self.cooldown.as_secs();
        if cooldown == 0 {
            return Ok(());
        }

        let Some(last_run) = self.last_run().await else {
            return Ok(());
        };

        let elapsed = elapsed_secs(last_run, self.clock.now());
        if elapsed < cooldown {
            let retry_after = Duration::from_secs(cooldown - elapsed);
            debug!(elapsed, retry_after = retry_after.as_secs(), "rate limited");
            return Err(RateLimited {
                retry_after,
                cooldown: self.cooldown,
                last_run: Some(last_run),
            });
        }
        Ok(())
    }

    /// Write the marker for a run that started at `at`
    pub async fn record(&self, at: DateTime<Utc>) -> Result<(), StoreError> {
        let ttl = if self.cooldown.is_zero() {
            DISABLED_MARKER_TTL
        } else {
            self.cooldown
        };
        self.store
            .set(&self.key, &at.timestamp().to_string(), Some(ttl))
            .await
    }
}

#[cfg(test)]
#[path = "rate_limit_tests.rs"]
mod tests;

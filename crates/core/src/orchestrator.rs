// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Run orchestration: lock, cooldown gate, dispatch, release
//!
//! One run moves through `Idle -> LockAcquired -> RateLimitChecked ->
//! Dispatching -> Completed`. A held lock ends the run before anything is
//! written. A closed cooldown window releases the lock and ends the run.
//! Once dispatch starts, the marker is written and the lock released on
//! every exit path, including a dispatcher that errors or panics.

use crate::clock::Clock;
use crate::coordination::{
    HolderId, LockConfig, LockError, LockManager, RateLimited, RateLimiter,
};
use crate::dispatch::{DispatchConfig, DispatchResult, Dispatcher, SiteLister, Trigger};
use crate::keys;
use crate::queue::QueueJob;
use crate::store::{StateStore, StoreError};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info, warn};

/// Message for a run turned away by a fresh lock
pub const LOCKED_MESSAGE: &str = "Another cron run is already in progress";

/// Message for a run refused outside a multisite network
pub const NOT_MULTISITE_MESSAGE: &str = "Cron runs require a WordPress multisite network";

/// Adapters bundle for a run
pub trait Adapters: Clone + Send + Sync + 'static {
    type Store: StateStore;
    type Sites: SiteLister;
    type Trigger: Trigger;

    fn store(&self) -> Self::Store;
    fn sites(&self) -> Self::Sites;
    fn trigger(&self) -> Self::Trigger;
}

/// Reasons a run did not start
#[derive(Debug, Error)]
pub enum RunError {
    #[error("Another cron run is already in progress")]
    Locked { holder: HolderId, age_secs: u64 },
    #[error(transparent)]
    RateLimited(#[from] RateLimited),
    #[error("state store error: {0}")]
    Store(#[from] StoreError),
}

impl From<LockError> for RunError {
    fn from(err: LockError) -> Self {
        match err {
            LockError::Locked {
                holder, age_secs, ..
            } => RunError::Locked { holder, age_secs },
            LockError::Store(e) => RunError::Store(e),
        }
    }
}

/// Orchestrator settings
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    pub cooldown: Duration,
    pub lock_ttl: Duration,
    pub dispatch: DispatchConfig,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            cooldown: Duration::from_secs(60),
            lock_ttl: crate::coordination::DEFAULT_LOCK_TTL,
            dispatch: DispatchConfig::default(),
        }
    }
}

/// Composes lock, rate limiter and dispatcher into one coordinated run
pub struct Orchestrator<A: Adapters, C: Clock> {
    lock: LockManager<A::Store, C>,
    limiter: RateLimiter<A::Store, C>,
    dispatcher: Arc<Dispatcher<A::Sites, A::Trigger, C>>,
    clock: C,
}

impl<A: Adapters, C: Clock> Clone for Orchestrator<A, C> {
    fn clone(&self) -> Self {
        Self {
            lock: self.lock.clone(),
            limiter: self.limiter.clone(),
            dispatcher: Arc::clone(&self.dispatcher),
            clock: self.clock.clone(),
        }
    }
}

impl<A: Adapters, C: Clock> Orchestrator<A, C> {
    pub fn new(adapters: &A, clock: C, config: OrchestratorConfig) -> Self {
        let store = adapters.store();
        Self {
            lock: LockManager::new(
                store.clone(),
                clock.clone(),
                LockConfig::new(keys::LOCK).with_ttl(config.lock_ttl),
            ),
            limiter: RateLimiter::new(store, clock.clone(), keys::LAST_RUN, config.cooldown),
            dispatcher: Arc::new(Dispatcher::new(
                adapters.sites(),
                adapters.trigger(),
                clock.clone(),
                config.dispatch,
            )),
            clock,
        }
    }

    pub fn lock(&self) -> &LockManager<A::Store, C> {
        &self.lock
    }

    pub fn limiter(&self) -> &RateLimiter<A::Store, C> {
        &self.limiter
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Take the lock and pass the cooldown gate
    pub async fn begin(&self) -> Result<RunPermit<A, C>, RunError> {
        let started_at = self.clock.now();
        let holder = self.lock.acquire().await?;

        if let Err(limited) = self.limiter.check().await {
            self.release_lock(&holder).await;
            return Err(limited.into());
        }

        Ok(RunPermit {
            orchestrator: self.clone(),
            holder,
            started_at,
        })
    }

    /// Run the whole sequence synchronously
    pub async fn execute(&self) -> Result<DispatchResult, RunError> {
        let permit = self.begin().await?;
        Ok(permit.dispatch().await)
    }

    /// Run a job taken from the queue
    ///
    /// The job passed the cooldown gate when it was accepted, so only the
    /// lock is checked here.
    pub async fn execute_queued(&self, job: &QueueJob) -> Result<DispatchResult, RunError> {
        let started_at = self.clock.now();
        let holder = self.lock.acquire().await?;
        info!(enqueued_at = %job.enqueued_at, %holder, "running queued job");

        let permit = RunPermit {
            orchestrator: self.clone(),
            holder,
            started_at,
        };
        Ok(permit.dispatch().await)
    }

    async fn release_lock(&self, holder: &HolderId) {
        if let Err(e) = self.lock.release(holder).await {
            warn!(%holder, error = %e, "failed to release lock");
        }
    }
}

/// A run that holds the lock and passed the cooldown gate
///
/// Consuming the permit through [`RunPermit::dispatch`] or
/// [`RunPermit::defer`] releases the lock. A permit dropped without either
/// leaves the lock to expire through its TTL.
#[must_use = "dropping a permit leaves the lock held until its TTL expires"]
pub struct RunPermit<A: Adapters, C: Clock> {
    orchestrator: Orchestrator<A, C>,
    holder: HolderId,
    started_at: DateTime<Utc>,
}

impl<A: Adapters, C: Clock> RunPermit<A, C> {
    pub fn holder(&self) -> &HolderId {
        &self.holder
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Dispatch to every site, then record the run and release the lock
    ///
    /// Internal faults are folded into a failed result and never propagate.
    /// The run and its cleanup live on their own task, so dropping the
    /// returned future does not leave the lock held or the marker unwritten.
    pub async fn dispatch(self) -> DispatchResult {
        let holder = self.holder.clone();
        match tokio::spawn(self.run_to_completion()).await {
            Ok(result) => result,
            Err(e) => {
                error!(%holder, error = %e, "run task aborted");
                DispatchResult::failed(format!("Dispatch aborted: {}", e))
            }
        }
    }

    async fn run_to_completion(self) -> DispatchResult {
        let dispatcher = Arc::clone(&self.orchestrator.dispatcher);
        let outcome = tokio::spawn(async move { dispatcher.run().await }).await;

        let result = match outcome {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => {
                error!(holder = %self.holder, error = %e, "dispatch failed");
                DispatchResult::failed(e.to_string())
            }
            Err(e) => {
                error!(holder = %self.holder, error = %e, "dispatch task aborted");
                DispatchResult::failed(format!("Dispatch aborted: {}", e))
            }
        };

        self.finish().await;
        result
    }

    /// Hand the run to another worker: record acceptance and release the lock
    pub async fn defer(self) {
        self.finish().await;
    }

    async fn finish(self) {
        if let Err(e) = self.orchestrator.limiter.record(self.started_at).await {
            warn!(holder = %self.holder, error = %e, "failed to write last-run marker");
        }
        self.orchestrator.release_lock(&self.holder).await;
    }
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;

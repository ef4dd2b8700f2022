// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Deferred run queue
//!
//! A FIFO list in a shared store. Delivery is at-most-once: a popped job is
//! consumed even if the run that follows fails or the worker dies.

use crate::clock::Clock;
use crate::dispatch::DispatchResult;
use crate::orchestrator::{Adapters, Orchestrator, RunError};
use crate::store::{StateStore, StoreError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

/// Message for a drain that found nothing to do
pub const EMPTY_QUEUE_MESSAGE: &str = "No queued jobs";

/// Message for a run handed to the queue
pub const QUEUED_MESSAGE: &str = "Cron run queued for a worker";

/// A deferred run request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueJob {
    pub enqueued_at: DateTime<Utc>,
}

impl QueueJob {
    pub fn new(enqueued_at: DateTime<Utc>) -> Self {
        Self { enqueued_at }
    }
}

/// Errors from the queue backend
#[derive(Debug, Error)]
pub enum QueueError {
    #[error("queue backend unavailable: {0}")]
    Unavailable(#[source] StoreError),
}

/// Named FIFO of deferred jobs
#[derive(Clone)]
pub struct JobQueue<S> {
    store: S,
    key: String,
}

impl<S: StateStore> JobQueue<S> {
    pub fn new(store: S, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Push a job; false when the backend refused it
    pub async fn enqueue(&self, job: &QueueJob) -> bool {
        let payload = match serde_json::to_string(job) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(queue = %self.key, error = %e, "failed to encode job");
                return false;
            }
        };
        match self.store.push(&self.key, &payload).await {
            Ok(()) => {
                info!(queue = %self.key, enqueued_at = %job.enqueued_at, "job queued");
                true
            }
            Err(e) => {
                warn!(queue = %self.key, error = %e, "failed to queue job");
                false
            }
        }
    }

    /// Number of jobs waiting
    pub async fn pending(&self) -> Result<usize, QueueError> {
        self.store.len(&self.key).await.map_err(QueueError::Unavailable)
    }

    /// Drop every waiting job
    pub async fn clear(&self) -> Result<(), QueueError> {
        self.store
            .delete(&self.key)
            .await
            .map_err(QueueError::Unavailable)?;
        info!(queue = %self.key, "queue cleared");
        Ok(())
    }

    /// Pop one job and run it
    ///
    /// An empty queue is a successful no-op that never touches the lock.
    pub async fn drain<A, C>(
        &self,
        orchestrator: &Orchestrator<A, C>,
    ) -> Result<DispatchResult, QueueError>
    where
        A: Adapters,
        C: Clock,
    {
        let Some(payload) = self
            .store
            .pop(&self.key)
            .await
            .map_err(QueueError::Unavailable)?
        else {
            return Ok(DispatchResult {
                message: EMPTY_QUEUE_MESSAGE.to_string(),
                ..DispatchResult::succeeded(0)
            });
        };

        let job: QueueJob = match serde_json::from_str(&payload) {
            Ok(job) => job,
            Err(e) => {
                warn!(queue = %self.key, error = %e, "discarding malformed job");
                return Ok(DispatchResult::failed(format!("Malformed queued job: {}", e)));
            }
        };

        match orchestrator.execute_queued(&job).await {
            Ok(result) => Ok(result),
            Err(e @ RunError::Locked { .. }) => {
                warn!(queue = %self.key, "queued job dropped: lock held");
                Ok(DispatchResult::failed(e.to_string()))
            }
            Err(e) => {
                warn!(queue = %self.key, error = %e, "queued job failed to start");
                Ok(DispatchResult::failed(e.to_string()))
            }
        }
    }
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;

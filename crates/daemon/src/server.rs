// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP server for cron run requests
//!
//! # Endpoints
//!
//! - `GET|POST /all-sites-cron/v1/run` - Coordinated run (`?ga`, `?defer`)
//! - `GET|POST /dss-cron/v1/run` - Legacy alias of the run endpoint
//! - `GET|POST /all-sites-cron/v1/queue/drain` - Run one queued job
//! - `GET /health` - Returns 200 if the server is running

use crate::response::{Reply, DEFERRED_MESSAGE, NO_QUEUE_MESSAGE, QUEUED_MESSAGE};
use asc_core::clock::Clock;
use asc_core::orchestrator::{Adapters, Orchestrator, RunError};
use asc_core::queue::{JobQueue, QueueJob};
use axum::extract::{Query, State};
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use std::collections::HashMap;
use std::sync::Arc;
use tokio_util::task::TaskTracker;
use tracing::{error, info, warn};

/// Shared application state
pub struct AppState<A: Adapters, C: Clock> {
    inner: Arc<AppStateInner<A, C>>,
}

struct AppStateInner<A: Adapters, C: Clock> {
    orchestrator: Orchestrator<A, C>,
    queue: Option<JobQueue<A::Store>>,
    multisite: bool,
    tracker: TaskTracker,
    clock: C,
}

impl<A: Adapters, C: Clock> Clone for AppState<A, C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<A: Adapters, C: Clock> AppState<A, C> {
    pub fn new(
        orchestrator: Orchestrator<A, C>,
        queue: Option<JobQueue<A::Store>>,
        multisite: bool,
        tracker: TaskTracker,
        clock: C,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                orchestrator,
                queue,
                multisite,
                tracker,
                clock,
            }),
        }
    }

    pub fn tracker(&self) -> &TaskTracker {
        &self.inner.tracker
    }
}

/// Output and execution flags of a run request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunFlags {
    pub ga: bool,
    pub defer: bool,
}

impl RunFlags {
    pub fn from_query(query: &HashMap<String, String>) -> Self {
        Self {
            ga: query.get("ga").is_some_and(|v| is_truthy(v)),
            defer: query.get("defer").is_some_and(|v| is_truthy(v)),
        }
    }
}

/// A present flag with no value counts as set
fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "" | "1" | "true" | "yes" | "on"
    )
}

/// Builds the router with all endpoints
pub fn build_router<A: Adapters, C: Clock>(state: AppState<A, C>) -> Router {
    Router::new()
        .route("/all-sites-cron/v1/run", get(run::<A, C>).post(run::<A, C>))
        .route("/dss-cron/v1/run", get(run::<A, C>).post(run::<A, C>))
        .route(
            "/all-sites-cron/v1/queue/drain",
            get(drain::<A, C>).post(drain::<A, C>),
        )
        .route("/health", get(health))
        .with_state(state)
}

async fn health() -> &'static str {
    "OK"
}

async fn run<A: Adapters, C: Clock>(
    State(state): State<AppState<A, C>>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let flags = RunFlags::from_query(&query);
    let reply = handle_run(&state, flags).await;
    reply.render(flags.ga, state.inner.clock.now())
}

async fn handle_run<A: Adapters, C: Clock>(state: &AppState<A, C>, flags: RunFlags) -> Reply {
    let inner = &state.inner;
    if !inner.multisite {
        return Reply::not_multisite();
    }

    let permit = match inner.orchestrator.begin().await {
        Ok(permit) => permit,
        Err(e @ RunError::Locked { .. }) => {
            info!(error = %e, "run refused");
            return Reply::locked(e.to_string());
        }
        Err(RunError::RateLimited(limited)) => {
            info!(retry_after = limited.retry_after.as_secs(), "run rate limited");
            return Reply::rate_limited(&limited);
        }
        Err(e @ RunError::Store(_)) => {
            error!(error = %e, "run could not start");
            return Reply::completed(&asc_core::dispatch::DispatchResult::failed(e.to_string()));
        }
    };

    if !flags.defer {
        let result = permit.dispatch().await;
        return Reply::completed(&result);
    }

    if let Some(queue) = &inner.queue {
        if queue.enqueue(&QueueJob::new(permit.started_at())).await {
            permit.defer().await;
            return Reply::accepted("queued", QUEUED_MESSAGE);
        }
        warn!(queue = queue.key(), "queue unavailable, running in background");
    }

    inner.tracker.spawn(async move {
        let result = permit.dispatch().await;
        info!(
            success = result.success,
            count = result.count,
            "background run finished"
        );
    });
    Reply::accepted("deferred", DEFERRED_MESSAGE)
}

async fn drain<A: Adapters, C: Clock>(State(state): State<AppState<A, C>>) -> Response {
    let inner = &state.inner;
    let reply = match &inner.queue {
        None => Reply::queue_unavailable(NO_QUEUE_MESSAGE),
        Some(queue) => match queue.drain(&inner.orchestrator).await {
            Ok(result) => Reply::drained(&result),
            Err(e) => {
                error!(error = %e, "drain failed");
                Reply::queue_unavailable(e.to_string())
            }
        },
    };
    reply.render(false, inner.clock.now())
}

#[cfg(test)]
#[path = "server_tests.rs"]
mod tests;

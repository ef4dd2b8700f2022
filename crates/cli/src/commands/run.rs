// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `asc run`

use crate::output::{print, OutputFormat, RunReport};
use asc_core::clock::Clock;
use asc_core::orchestrator::{Adapters, Orchestrator, RunError, NOT_MULTISITE_MESSAGE};
use asc_core::queue::{JobQueue, QueueJob, QUEUED_MESSAGE};
use clap::Args;
use tracing::{info, warn};

use super::Context;

#[derive(Args)]
pub struct RunArgs {
    /// Print a JSON object instead of an annotation line
    #[arg(long)]
    pub json: bool,
    /// Hand the run to the job queue when one is configured
    #[arg(long)]
    pub defer: bool,
}

/// Returns whether the run succeeded
pub async fn run(ctx: &Context, args: RunArgs) -> bool {
    let orchestrator = ctx.orchestrator();
    let report = execute(
        &orchestrator,
        ctx.queue.as_ref(),
        ctx.config.network.multisite,
        args.defer,
    )
    .await;
    print(&report, OutputFormat::from_flag(args.json));
    report.success
}

/// One coordinated run, or a queued one with `defer`
///
/// Without a working queue a deferred run happens in the foreground.
pub async fn execute<A: Adapters, C: Clock>(
    orchestrator: &Orchestrator<A, C>,
    queue: Option<&JobQueue<A::Store>>,
    multisite: bool,
    defer: bool,
) -> RunReport {
    let now = orchestrator.clock().now();
    if !multisite {
        return RunReport::refused(NOT_MULTISITE_MESSAGE, now);
    }

    let permit = match orchestrator.begin().await {
        Ok(permit) => permit,
        Err(e @ RunError::Locked { .. }) => return RunReport::locked(e.to_string(), now),
        Err(RunError::RateLimited(limited)) => {
            return RunReport::rate_limited(
                limited.to_string(),
                limited.retry_after.as_secs(),
                now,
            )
        }
        Err(e @ RunError::Store(_)) => return RunReport::refused(e.to_string(), now),
    };

    if defer {
        match queue {
            Some(queue) if queue.enqueue(&QueueJob::new(permit.started_at())).await => {
                permit.defer().await;
                return RunReport::queued(QUEUED_MESSAGE, now);
            }
            Some(queue) => warn!(queue = queue.key(), "queue unavailable, running now"),
            None => info!("no job queue configured, running now"),
        }
    }

    let result = permit.dispatch().await;
    RunReport::finished(&result, orchestrator.clock().now())
}

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;

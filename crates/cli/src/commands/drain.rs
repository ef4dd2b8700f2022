// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `asc drain`

use crate::error::CliError;
use crate::output::{print, OutputFormat, RunReport};
use asc_core::clock::Clock;
use asc_core::orchestrator::{Adapters, Orchestrator};
use asc_core::queue::{JobQueue, QueueError};
use clap::Args;
use std::time::Duration;
use tracing::{debug, info};

use super::Context;

#[derive(Args)]
pub struct DrainArgs {
    /// Keep draining every SECS seconds until interrupted
    #[arg(long, value_name = "SECS")]
    pub watch: Option<u64>,
    /// Print JSON objects instead of annotation lines
    #[arg(long)]
    pub json: bool,
}

/// Returns whether the last drain succeeded
pub async fn drain(ctx: &Context, args: DrainArgs) -> anyhow::Result<bool> {
    let queue = ctx.queue.as_ref().ok_or_else(CliError::queue_disabled)?;
    let orchestrator = ctx.orchestrator();
    let format = OutputFormat::from_flag(args.json);

    let Some(secs) = args.watch else {
        let report = drain_once(queue, &orchestrator).await?;
        print(&report, format);
        return Ok(report.success);
    };

    let interval = Duration::from_secs(secs.max(1));
    info!(queue = queue.key(), interval_secs = interval.as_secs(), "watching queue");
    loop {
        let report = drain_once(queue, &orchestrator).await?;
        if report.count.unwrap_or(0) > 0 || !report.success {
            print(&report, format);
        } else {
            debug!(queue = queue.key(), "queue empty");
        }

        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted, stopping");
                return Ok(true);
            }
        }
    }
}

/// Pop and run one job
pub async fn drain_once<A: Adapters, C: Clock>(
    queue: &JobQueue<A::Store>,
    orchestrator: &Orchestrator<A, C>,
) -> Result<RunReport, QueueError> {
    let result = queue.drain(orchestrator).await?;
    Ok(RunReport::finished(&result, orchestrator.clock().now()))
}

#[cfg(test)]
#[path = "drain_tests.rs"]
mod tests;

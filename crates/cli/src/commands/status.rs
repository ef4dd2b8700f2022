// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `asc status`

use crate::output::{print, OutputFormat};
use asc_core::clock::{elapsed_secs, Clock};
use asc_core::format::timestamp;
use asc_core::orchestrator::{Adapters, Orchestrator};
use asc_core::queue::JobQueue;
use asc_core::store::StoreError;
use clap::Args;
use serde::Serialize;
use std::fmt;

use super::Context;

#[derive(Args)]
pub struct StatusArgs {
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
pub struct LockStatus {
    pub holder: String,
    pub age_secs: u64,
    pub stale: bool,
}

#[derive(Debug, Serialize)]
pub struct StatusReport {
    pub lock: Option<LockStatus>,
    pub last_run: Option<String>,
    pub cooldown_secs: u64,
    pub retry_after: u64,
    /// None when no queue is configured or it cannot be read
    pub pending: Option<usize>,
}

impl fmt::Display for StatusReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.lock {
            Some(lock) => writeln!(
                f,
                "Lock: held by {} for {}s{}",
                lock.holder,
                lock.age_secs,
                if lock.stale { " (stale)" } else { "" }
            )?,
            None => writeln!(f, "Lock: free")?,
        }
        match &self.last_run {
            Some(at) => writeln!(f, "Last run: {} UTC", at)?,
            None => writeln!(f, "Last run: never")?,
        }
        if self.retry_after > 0 {
            writeln!(f, "Cooldown: {}s remaining of {}s", self.retry_after, self.cooldown_secs)?;
        } else {
            writeln!(f, "Cooldown: open ({}s)", self.cooldown_secs)?;
        }
        match self.pending {
            Some(n) => write!(f, "Queued jobs: {}", n),
            None => write!(f, "Queued jobs: -"),
        }
    }
}

pub async fn status(ctx: &Context, args: StatusArgs) -> anyhow::Result<()> {
    let orchestrator = ctx.orchestrator();
    let report = collect(&orchestrator, ctx.queue.as_ref()).await?;
    print(&report, OutputFormat::from_flag(args.json));
    Ok(())
}

/// Read the lock, the last-run marker and the queue depth
pub async fn collect<A: Adapters, C: Clock>(
    orchestrator: &Orchestrator<A, C>,
    queue: Option<&JobQueue<A::Store>>,
) -> Result<StatusReport, StoreError> {
    let now = orchestrator.clock().now();
    let lock = orchestrator
        .lock()
        .inspect()
        .await?
        .map(|record| LockStatus {
            holder: record.holder.to_string(),
            age_secs: record.age_secs(now),
            stale: record.is_stale(now),
        });

    let limiter = orchestrator.limiter();
    let cooldown_secs = limiter.cooldown().as_secs();
    let last_run = limiter.last_run().await;
    let retry_after = last_run.map_or(0, |at| {
        cooldown_secs.saturating_sub(elapsed_secs(at, now))
    });

    let pending = match queue {
        Some(queue) => queue.pending().await.ok(),
        None => None,
    };

    Ok(StatusReport {
        lock,
        last_run: last_run.map(timestamp),
        cooldown_secs,
        retry_after,
        pending,
    })
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;

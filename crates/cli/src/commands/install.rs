// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `asc install` and `asc uninstall`

use asc_core::clock::SystemClock;
use asc_core::lifecycle::{migrate_legacy, purge};
use asc_core::orchestrator::Adapters;

use super::Context;

/// Clear run state and retire legacy keys
pub async fn install(ctx: &Context) -> anyhow::Result<()> {
    let store = ctx.adapters.store();
    purge(&store, &ctx.settings.queue_key, false).await?;
    clear_queue(ctx).await?;
    println!("Cleared cron run state");

    if migrate_legacy(&store, &SystemClock).await? {
        println!("Removed legacy dss_cron state");
    }
    Ok(())
}

/// Remove every key this tool writes
pub async fn uninstall(ctx: &Context) -> anyhow::Result<()> {
    purge(&ctx.adapters.store(), &ctx.settings.queue_key, true).await?;
    clear_queue(ctx).await?;
    println!("Removed all cron state");
    Ok(())
}

/// The queue may live outside the shared store
async fn clear_queue(ctx: &Context) -> anyhow::Result<()> {
    if let Some(queue) = &ctx.queue {
        queue.clear().await?;
    }
    Ok(())
}

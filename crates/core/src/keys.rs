// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Names of the entries this service keeps in the shared store

/// Mutual-exclusion lock for a dispatch run
pub const LOCK: &str = "all_sites_cron_lock";

/// Unix timestamp of the last dispatch attempt
pub const LAST_RUN: &str = "all_sites_cron_last_run_ts";

/// Site list cache written by releases that cached the catalog
pub const SITES_CACHE: &str = "all_sites_cron_sites";

/// Set once the legacy entries have been removed
pub const MIGRATED_FLAG: &str = "all_sites_cron_migrated_legacy_transients";

/// Default FIFO list for deferred jobs
pub const DEFAULT_QUEUE: &str = "all_sites_cron_jobs";

/// Entries written under the previous `dss_cron` name
pub const LEGACY: &[&str] = &["dss_cron_lock", "dss_cron_last_run_ts", "dss_cron_sites"];

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
// Enable coverage(off) attribute for excluding test infrastructure
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! asc-core: run coordination for network-wide cron triggering
//!
//! This crate provides:
//! - A shared state store abstraction with an in-memory implementation
//! - A TTL lock with stale override and a cooldown gate
//! - The batched site fan-out dispatcher
//! - The run orchestrator and the deferred job queue
//! - Configuration resolution and install/uninstall housekeeping

pub mod clock;
pub mod config;
pub mod coordination;
pub mod dispatch;
pub mod format;
pub mod keys;
pub mod lifecycle;
pub mod orchestrator;
pub mod queue;
pub mod store;

#[cfg(any(test, feature = "test-support"))]
pub mod fake;

pub use clock::{Clock, FakeClock, SystemClock};
pub use config::{Config, ConfigError, Settings};
pub use coordination::{HolderId, LockError, LockManager, LockRecord, RateLimited, RateLimiter};
pub use dispatch::{
    DispatchConfig, DispatchError, DispatchResult, Dispatcher, SiteError, SiteLister, SiteRecord,
    Trigger, TriggerError,
};
pub use orchestrator::{Adapters, Orchestrator, OrchestratorConfig, RunError, RunPermit};
pub use queue::{JobQueue, QueueError, QueueJob};
pub use store::{MemoryStore, StateStore, StoreError};

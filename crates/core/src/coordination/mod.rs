// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Coordination primitives for runs shared across worker processes
//!
//! This module provides:
//! - **LockManager** - Exclusive run lock with TTL-based stale override
//! - **RateLimiter** - Cooldown gate keyed by the last-run marker

pub mod lock;
pub mod rate_limit;

pub use lock::{HolderId, LockConfig, LockError, LockManager, LockRecord, DEFAULT_LOCK_TTL};
pub use rate_limit::{RateLimited, RateLimiter};

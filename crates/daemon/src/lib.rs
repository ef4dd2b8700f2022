// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! asc-daemon: HTTP front door for coordinated cron runs

pub mod lifecycle;
pub mod response;
pub mod server;

pub use lifecycle::{startup, Daemon, LifecycleError};
pub use server::{build_router, AppState, RunFlags};

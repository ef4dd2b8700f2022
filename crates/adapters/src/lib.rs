// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
// Enable coverage(off) attribute for excluding test infrastructure
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Adapters for external I/O: state stores, site catalogs, HTTP triggers

pub mod real;
pub mod sites;
pub mod store;
pub mod traced;
pub mod trigger;

pub use real::{open_store, AdapterError, RealAdapters};
pub use sites::{CatalogSites, Sites, StaticSites};
pub use store::{JsonFileStore, RedisStore, Store};
pub use traced::{TracedSiteLister, TracedTrigger};
pub use trigger::HttpTrigger;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake adapter implementations for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use crate::clock::FakeClock;
use crate::dispatch::{SiteError, SiteLister, SiteRecord, Trigger, TriggerError};
use crate::orchestrator::Adapters;
use crate::store::MemoryStore;
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Recorded catalog page request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListCall {
    pub offset: usize,
    pub limit: usize,
}

#[derive(Default)]
struct FakeSitesState {
    sites: Vec<SiteRecord>,
    calls: Vec<ListCall>,
    fail_at_offset: Option<usize>,
    panic_at_offset: Option<usize>,
    page_len: Option<usize>,
}

/// In-memory site catalog with call recording
#[derive(Clone, Default)]
pub struct FakeSiteLister {
    state: Arc<Mutex<FakeSitesState>>,
}

impl FakeSiteLister {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog of `n` sites at `https://site-{i}.example`
    pub fn with_sites(n: usize) -> Self {
        let lister = Self::new();
        lister.set_sites(
            (0..n)
                .map(|i| SiteRecord::new(format!("https://site-{}.example", i)))
                .collect(),
        );
        lister
    }

    pub fn set_sites(&self, sites: Vec<SiteRecord>) {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).sites = sites;
    }

    /// Return an error for the page starting at `offset`
    pub fn fail_at_offset(&self, offset: usize) {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .fail_at_offset = Some(offset);
    }

    /// Panic while listing the page starting at `offset`
    pub fn panic_at_offset(&self, offset: usize) {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .panic_at_offset = Some(offset);
    }

    /// Return pages of `len` sites whatever limit is asked for
    pub fn set_page_len(&self, len: usize) {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).page_len = Some(len);
    }

    /// All recorded page requests
    pub fn calls(&self) -> Vec<ListCall> {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .calls
            .clone()
    }
}

#[async_trait]
impl SiteLister for FakeSiteLister {
    #[allow(clippy::panic)]
    async fn list(&self, offset: usize, limit: usize) -> Result<Vec<SiteRecord>, SiteError> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.calls.push(ListCall { offset, limit });

        if state.panic_at_offset == Some(offset) {
            drop(state);
            panic!("fake site lister panicked at offset {}", offset);
        }
        if state.fail_at_offset == Some(offset) {
            return Err(SiteError::Unavailable("fake catalog failure".to_string()));
        }

        let take = state.page_len.unwrap_or(limit);
        Ok(state.sites.iter().skip(offset).take(take).cloned().collect())
    }
}

/// Recorded trigger request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FireCall {
    pub url: String,
    pub timeout: Duration,
}

#[derive(Default)]
struct FakeTriggerState {
    calls: Vec<FireCall>,
    failing: HashSet<String>,
    delay: Option<Duration>,
}

/// Trigger that records calls and fails for configured sites
#[derive(Clone, Default)]
pub struct FakeTrigger {
    state: Arc<Mutex<FakeTriggerState>>,
}

impl FakeTrigger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every trigger whose URL starts with `site_url`
    pub fn fail_site(&self, site_url: impl Into<String>) {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .failing
            .insert(site_url.into());
    }

    /// Sleep for `delay` on every trigger
    pub fn set_delay(&self, delay: Duration) {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).delay = Some(delay);
    }

    /// All recorded trigger requests
    pub fn calls(&self) -> Vec<FireCall> {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .calls
            .clone()
    }
}

#[async_trait]
impl Trigger for FakeTrigger {
    async fn fire(&self, url: &str, timeout: Duration) -> Result<(), TriggerError> {
        let (delay, failing) = {
            let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
            state.calls.push(FireCall {
                url: url.to_string(),
                timeout,
            });
            let failing = state.failing.iter().any(|site| url.starts_with(site.as_str()));
            (state.delay, failing)
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if failing {
            return Err(TriggerError::Transport("connection refused".to_string()));
        }
        Ok(())
    }
}

/// Fake adapters bundle sharing one fake clock
#[derive(Clone)]
pub struct FakeAdapters {
    pub clock: FakeClock,
    pub store: MemoryStore<FakeClock>,
    pub sites: FakeSiteLister,
    pub trigger: FakeTrigger,
}

impl FakeAdapters {
    /// Fresh fakes; the clock starts on a whole second so stored
    /// timestamps compare equal to `clock.now()`
    pub fn new() -> Self {
        let clock = FakeClock::at_timestamp(1_700_000_000);
        Self {
            store: MemoryStore::with_clock(clock.clone()),
            clock,
            sites: FakeSiteLister::new(),
            trigger: FakeTrigger::new(),
        }
    }

    /// Fake adapters with `n` sites in the catalog
    pub fn with_sites(n: usize) -> Self {
        Self {
            sites: FakeSiteLister::with_sites(n),
            ..Self::new()
        }
    }
}

impl Default for FakeAdapters {
    fn default() -> Self {
        Self::new()
    }
}

impl Adapters for FakeAdapters {
    type Store = MemoryStore<FakeClock>;
    type Sites = FakeSiteLister;
    type Trigger = FakeTrigger;

    fn store(&self) -> Self::Store {
        self.store.clone()
    }

    fn sites(&self) -> Self::Sites {
        self.sites.clone()
    }

    fn trigger(&self) -> Self::Trigger {
        self.trigger.clone()
    }
}

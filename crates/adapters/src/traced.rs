// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced adapter wrappers for consistent observability

use asc_core::dispatch::{SiteError, SiteLister, SiteRecord, Trigger, TriggerError};
use async_trait::async_trait;
use std::time::Duration;
use tracing::Instrument;

/// Wrapper that adds tracing to any Trigger
#[derive(Clone)]
pub struct TracedTrigger<T> {
    inner: T,
}

impl<T> TracedTrigger<T> {
    pub fn new(inner: T) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<T: Trigger> Trigger for TracedTrigger<T> {
    async fn fire(&self, url: &str, timeout: Duration) -> Result<(), TriggerError> {
        let span = tracing::debug_span!("trigger.fire", url);
        async {
            let start = std::time::Instant::now();
            let result = self.inner.fire(url, timeout).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;

            match &result {
                Ok(()) => tracing::debug!(elapsed_ms, "fired"),
                Err(e) => tracing::warn!(elapsed_ms, error = %e, "fire failed"),
            }
            result
        }
        .instrument(span)
        .await
    }
}

/// Wrapper that adds tracing to any SiteLister
#[derive(Clone)]
pub struct TracedSiteLister<L> {
    inner: L,
}

impl<L> TracedSiteLister<L> {
    pub fn new(inner: L) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<L: SiteLister> SiteLister for TracedSiteLister<L> {
    async fn list(&self, offset: usize, limit: usize) -> Result<Vec<SiteRecord>, SiteError> {
        let span = tracing::info_span!("sites.list", offset, limit);
        async {
            let start = std::time::Instant::now();
            let result = self.inner.list(offset, limit).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;

            match &result {
                Ok(page) => tracing::info!(elapsed_ms, returned = page.len(), "page listed"),
                Err(e) => tracing::error!(elapsed_ms, error = %e, "listing failed"),
            }
            result
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;

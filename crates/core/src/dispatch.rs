// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Site fan-out dispatcher
//!
//! Pages through the site catalog and fires one `wp-cron.php` trigger per
//! site. Triggers are fire-and-forget: a transport failure is recorded
//! against the site and the batch carries on.

use crate::clock::Clock;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

/// How many per-site errors are quoted in the summary message
const QUOTED_ERRORS: usize = 3;

/// Message for a run that found nothing to dispatch
pub const NO_SITES_MESSAGE: &str = "No public sites found in the network";

/// One member site of the network
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteRecord {
    #[serde(alias = "siteurl")]
    pub url: String,
}

impl SiteRecord {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

/// Errors from the site catalog
#[derive(Debug, Error)]
pub enum SiteError {
    #[error("site catalog unavailable: {0}")]
    Unavailable(String),
    #[error("invalid site catalog response: {0}")]
    InvalidResponse(String),
}

/// Enumerates public member sites, one page at a time
#[async_trait]
pub trait SiteLister: Clone + Send + Sync + 'static {
    /// Sites `offset..offset + limit`; a short page means the catalog ended
    async fn list(&self, offset: usize, limit: usize) -> Result<Vec<SiteRecord>, SiteError>;
}

/// Errors from a single trigger call
#[derive(Debug, Error)]
pub enum TriggerError {
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("{0}")]
    Transport(String),
}

/// Fires a request at a site without waiting for its response
#[async_trait]
pub trait Trigger: Clone + Send + Sync + 'static {
    async fn fire(&self, url: &str, timeout: Duration) -> Result<(), TriggerError>;
}

/// Tunables for one dispatch run
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchConfig {
    /// Per-site request timeout
    pub timeout: Duration,
    /// Sites requested per catalog page
    pub batch_size: usize,
    /// Upper bound on sites triggered per run
    pub max_sites: usize,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(10),
            batch_size: 50,
            max_sites: 1000,
        }
    }
}

/// Outcome of one run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchResult {
    pub success: bool,
    pub count: usize,
    pub errors: Vec<String>,
    pub message: String,
}

impl DispatchResult {
    /// Every site was triggered
    pub fn succeeded(count: usize) -> Self {
        Self {
            success: true,
            count,
            errors: Vec::new(),
            message: String::new(),
        }
    }

    /// The run did not complete
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            count: 0,
            errors: Vec::new(),
            message: message.into(),
        }
    }

    /// Some sites could not be triggered
    pub fn partial(count: usize, errors: Vec<String>) -> Self {
        let mut message = errors
            .iter()
            .take(QUOTED_ERRORS)
            .cloned()
            .collect::<Vec<_>>()
            .join("\n");
        if errors.len() > QUOTED_ERRORS {
            message.push_str(&format!(
                "\n... and {} more",
                errors.len() - QUOTED_ERRORS
            ));
        }
        Self {
            success: false,
            count,
            errors,
            message,
        }
    }
}

/// Errors that abort a run before it finishes paging
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("failed to list sites at offset {offset}: {source}")]
    Sites {
        offset: usize,
        #[source]
        source: SiteError,
    },
}

/// Fans a trigger out to every listed site
#[derive(Clone)]
pub struct Dispatcher<L, T, C> {
    sites: L,
    trigger: T,
    clock: C,
    config: DispatchConfig,
}

impl<L: SiteLister, T: Trigger, C: Clock> Dispatcher<L, T, C> {
    pub fn new(sites: L, trigger: T, clock: C, config: DispatchConfig) -> Self {
        Self {
            sites,
            trigger,
            clock,
            config,
        }
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// Trigger every site, page by page
    pub async fn run(&self) -> Result<DispatchResult, DispatchError> {
        let batch_size = self.config.batch_size.max(1);
        let max_sites = self.config.max_sites;
        let stamp = doing_wp_cron_stamp(&self.clock);

        let mut count = 0;
        let mut errors = Vec::new();
        let mut offset = 0;

        while count < max_sites {
            let limit = batch_size.min(max_sites - count);
            let page = self
                .sites
                .list(offset, limit)
                .await
                .map_err(|source| DispatchError::Sites { offset, source })?;
            debug!(offset, limit, returned = page.len(), "fetched site page");

            let page_len = page.len();
            let taken = page_len.min(limit);
            for site in page.into_iter().take(limit) {
                let url = cron_url(&site.url, &stamp);
                if let Err(e) = self.trigger.fire(&url, self.config.timeout).await {
                    warn!(site = %site.url, error = %e, "trigger failed");
                    errors.push(format!("Error for {}: {}", site.url, e));
                }
                count += 1;
            }

            if page_len < limit {
                break;
            }
            offset += taken;
        }

        if count == 0 {
            info!("no sites to dispatch");
            return Ok(DispatchResult::failed(NO_SITES_MESSAGE));
        }

        info!(count, failed = errors.len(), "dispatch finished");
        if errors.is_empty() {
            Ok(DispatchResult::succeeded(count))
        } else {
            Ok(DispatchResult::partial(count, errors))
        }
    }
}

/// Value of the `doing_wp_cron` query argument, shared by every site in a run
fn doing_wp_cron_stamp(clock: &impl Clock) -> String {
    let now = clock.now();
    let secs = now.timestamp() as f64 + f64::from(now.timestamp_subsec_micros()) / 1e6;
    format!("{:.22}", secs)
}

fn cron_url(site_url: &str, stamp: &str) -> String {
    format!(
        "{}/wp-cron.php?doing_wp_cron={}",
        site_url.trim_end_matches('/'),
        stamp
    )
}

#[cfg(test)]
#[path = "dispatch_tests.rs"]
mod tests;

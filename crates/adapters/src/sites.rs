// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Site catalogs

use asc_core::dispatch::{SiteError, SiteLister, SiteRecord};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

const CATALOG_TIMEOUT: Duration = Duration::from_secs(10);

/// Fixed list of sites from configuration
#[derive(Clone, Default)]
pub struct StaticSites {
    sites: Arc<Vec<SiteRecord>>,
}

impl StaticSites {
    pub fn new<I, S>(urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            sites: Arc::new(urls.into_iter().map(SiteRecord::new).collect()),
        }
    }
}

#[async_trait]
impl SiteLister for StaticSites {
    async fn list(&self, offset: usize, limit: usize) -> Result<Vec<SiteRecord>, SiteError> {
        Ok(self.sites.iter().skip(offset).take(limit).cloned().collect())
    }
}

/// Network directory served over HTTP
///
/// `GET {url}?offset=N&limit=M` must answer with a JSON array of objects
/// carrying `url` (or `siteurl`).
#[derive(Clone)]
pub struct CatalogSites {
    agent: ureq::Agent,
    url: String,
}

impl CatalogSites {
    pub fn new(url: impl Into<String>) -> Self {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(CATALOG_TIMEOUT))
            .build();
        Self {
            agent: ureq::Agent::new_with_config(config),
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

fn page_url(base: &str, offset: usize, limit: usize) -> String {
    let sep = if base.contains('?') { '&' } else { '?' };
    format!("{}{}offset={}&limit={}", base, sep, offset, limit)
}

fn parse_page(body: &str) -> Result<Vec<SiteRecord>, SiteError> {
    serde_json::from_str(body).map_err(|e| SiteError::InvalidResponse(e.to_string()))
}

#[async_trait]
impl SiteLister for CatalogSites {
    async fn list(&self, offset: usize, limit: usize) -> Result<Vec<SiteRecord>, SiteError> {
        let agent = self.agent.clone();
        let url = page_url(&self.url, offset, limit);
        let body = tokio::task::spawn_blocking(move || {
            let mut response = agent
                .get(&url)
                .call()
                .map_err(|e| SiteError::Unavailable(format!("{}: {}", url, e)))?;
            response
                .body_mut()
                .read_to_string()
                .map_err(|e| SiteError::InvalidResponse(e.to_string()))
        })
        .await
        .map_err(|e| SiteError::Unavailable(format!("catalog task failed: {}", e)))??;
        parse_page(&body)
    }
}

/// Catalog selected by configuration
#[derive(Clone)]
pub enum Sites {
    Static(StaticSites),
    Catalog(CatalogSites),
}

#[async_trait]
impl SiteLister for Sites {
    async fn list(&self, offset: usize, limit: usize) -> Result<Vec<SiteRecord>, SiteError> {
        match self {
            Sites::Static(s) => s.list(offset, limit).await,
            Sites::Catalog(s) => s.list(offset, limit).await,
        }
    }
}

#[cfg(test)]
#[path = "sites_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Production adapters built from configuration

use crate::sites::{CatalogSites, Sites, StaticSites};
use crate::store::{JsonFileStore, RedisStore, Store};
use crate::traced::{TracedSiteLister, TracedTrigger};
use crate::trigger::HttpTrigger;
use asc_core::config::{Config, QueueBackend, Settings, StoreBackend};
use asc_core::orchestrator::Adapters;
use asc_core::queue::JobQueue;
use asc_core::store::{MemoryStore, StoreError};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("failed to open {backend} store: {source}")]
    Store {
        backend: &'static str,
        #[source]
        source: StoreError,
    },
}

/// Store, catalog and trigger for a real deployment
#[derive(Clone)]
pub struct RealAdapters {
    store: Store,
    sites: TracedSiteLister<Sites>,
    trigger: TracedTrigger<HttpTrigger>,
}

impl RealAdapters {
    pub fn from_config(config: &Config, settings: &Settings) -> Result<Self, AdapterError> {
        let store = open_store(config, settings)?;
        let sites = match &config.network.catalog_url {
            Some(url) => Sites::Catalog(CatalogSites::new(url.clone())),
            None => Sites::Static(StaticSites::new(config.network.sites.iter().cloned())),
        };
        info!(
            store = store.backend_name(),
            catalog = config.network.catalog_url.as_deref().unwrap_or("static"),
            "adapters ready"
        );

        Ok(Self {
            store,
            sites: TracedSiteLister::new(sites),
            trigger: TracedTrigger::new(HttpTrigger::new(config.network.verify_tls)),
        })
    }

    /// The job queue, when enabled
    ///
    /// A Redis queue reuses the shared store when that is Redis too.
    pub fn open_queue(
        &self,
        config: &Config,
        settings: &Settings,
    ) -> Result<Option<JobQueue<Store>>, AdapterError> {
        if !config.queue.enabled {
            return Ok(None);
        }
        let store = match config.queue.backend {
            QueueBackend::Store => self.store.clone(),
            QueueBackend::Redis if matches!(self.store, Store::Redis(_)) => self.store.clone(),
            QueueBackend::Redis => Store::Redis(redis_store(settings)?),
        };
        Ok(Some(JobQueue::new(store, settings.queue_key.clone())))
    }
}

impl Adapters for RealAdapters {
    type Store = Store;
    type Sites = TracedSiteLister<Sites>;
    type Trigger = TracedTrigger<HttpTrigger>;

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

/// Shared state store selected by `[store] backend`
pub fn open_store(config: &Config, settings: &Settings) -> Result<Store, AdapterError> {
    Ok(match config.store.backend {
        StoreBackend::Memory => Store::Memory(MemoryStore::new()),
        StoreBackend::File => Store::File(
            JsonFileStore::open(config.store.state_dir()).map_err(|source| {
                AdapterError::Store {
                    backend: "file",
                    source,
                }
            })?,
        ),
        StoreBackend::Redis => Store::Redis(redis_store(settings)?),
    })
}

fn redis_store(settings: &Settings) -> Result<RedisStore, AdapterError> {
    RedisStore::new(&settings.redis).map_err(|source| AdapterError::Store {
        backend: "redis",
        source,
    })
}

#[cfg(test)]
#[path = "real_tests.rs"]
mod tests;

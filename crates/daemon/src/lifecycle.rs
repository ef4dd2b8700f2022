// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon lifecycle management: startup and shutdown

use crate::server::{build_router, AppState};
use asc_adapters::{AdapterError, RealAdapters};
use asc_core::clock::SystemClock;
use asc_core::config::{Config, ConfigError};
use asc_core::lifecycle::{migrate_legacy, LifecycleError as StateError};
use asc_core::orchestrator::{Adapters, Orchestrator};
use axum::Router;
use std::future::Future;
use std::net::SocketAddr;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio_util::task::TaskTracker;
use tracing::info;

/// Errors that stop the daemon
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Adapter(#[from] AdapterError),
    #[error(transparent)]
    State(#[from] StateError),
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Daemon state during operation
pub struct Daemon {
    pub listener: TcpListener,
    pub router: Router,
    pub tracker: TaskTracker,
}

impl Daemon {
    pub fn local_addr(&self) -> Result<SocketAddr, LifecycleError> {
        Ok(self.listener.local_addr()?)
    }

    /// Serve until `shutdown` resolves, then wait for background runs
    pub async fn serve(self, shutdown: impl Future<Output = ()> + Send + 'static) -> Result<(), LifecycleError> {
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await?;

        self.tracker.close();
        if !self.tracker.is_empty() {
            info!(pending = self.tracker.len(), "waiting for background runs");
        }
        self.tracker.wait().await;
        Ok(())
    }
}

/// Build adapters, migrate legacy state and bind the listener
pub async fn startup(config: &Config) -> Result<Daemon, LifecycleError> {
    let settings = config.settings()?;
    let adapters = RealAdapters::from_config(config, &settings)?;
    let queue = adapters.open_queue(config, &settings)?;

    if config.network.multisite && migrate_legacy(&adapters.store(), &SystemClock).await? {
        info!("removed legacy dss_cron state");
    }

    let orchestrator = Orchestrator::new(&adapters, SystemClock, settings.orchestrator());
    let tracker = TaskTracker::new();
    let state = AppState::new(
        orchestrator,
        queue,
        config.network.multisite,
        tracker.clone(),
        SystemClock,
    );

    let listener = TcpListener::bind(&config.server.listen)
        .await
        .map_err(|source| LifecycleError::Bind {
            addr: config.server.listen.clone(),
            source,
        })?;
    info!(
        addr = %listener.local_addr()?,
        cooldown_secs = settings.cooldown.as_secs(),
        batch_size = settings.batch_size,
        max_sites = settings.max_sites,
        "daemon ready"
    );

    Ok(Daemon {
        listener,
        router: build_router(state),
        tracker,
    })
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CLI command implementations

pub mod drain;
pub mod install;
pub mod run;
pub mod status;

use crate::error::CliError;
use asc_adapters::{RealAdapters, Store};
use asc_core::clock::SystemClock;
use asc_core::config::{Config, Settings};
use asc_core::orchestrator::Orchestrator;
use asc_core::queue::JobQueue;
use std::path::Path;

/// Everything a command needs, built from configuration
pub struct Context {
    pub config: Config,
    pub settings: Settings,
    pub adapters: RealAdapters,
    pub queue: Option<JobQueue<Store>>,
}

impl Context {
    pub fn load_config(config_path: Option<&Path>) -> Result<Config, CliError> {
        Config::discover(config_path).map_err(|e| CliError::config(config_path, e))
    }

    pub fn open(config: Config, config_path: Option<&Path>) -> Result<Self, CliError> {
        let settings = config
            .settings()
            .map_err(|e| CliError::config(config_path, e))?;
        let adapters =
            RealAdapters::from_config(&config, &settings).map_err(CliError::store_unavailable)?;
        let queue = adapters
            .open_queue(&config, &settings)
            .map_err(CliError::store_unavailable)?;
        Ok(Self {
            config,
            settings,
            adapters,
            queue,
        })
    }

    pub fn orchestrator(&self) -> Orchestrator<RealAdapters, SystemClock> {
        Orchestrator::new(&self.adapters, SystemClock, self.settings.orchestrator())
    }
}

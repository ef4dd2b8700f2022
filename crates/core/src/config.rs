// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Configuration file and tunable resolution
//!
//! The TOML file holds deployment settings. Run tunables may also be
//! overridden from the environment: each tunable has an ordered list of
//! variable names, current name first and legacy name second, and the
//! first one set wins over the file, which wins over the built-in default.

use crate::coordination::DEFAULT_LOCK_TTL;
use crate::dispatch::DispatchConfig;
use crate::keys;
use crate::orchestrator::OrchestratorConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

pub const ENV_RATE_LIMIT: &[&str] = &[
    "ALL_SITES_CRON_RATE_LIMIT_SECONDS",
    "DSS_CRON_RATE_LIMIT_SECONDS",
];
pub const ENV_REQUEST_TIMEOUT: &[&str] =
    &["ALL_SITES_CRON_REQUEST_TIMEOUT", "DSS_CRON_REQUEST_TIMEOUT"];
pub const ENV_BATCH_SIZE: &[&str] = &["ALL_SITES_CRON_BATCH_SIZE"];
pub const ENV_MAX_SITES: &[&str] = &["ALL_SITES_CRON_MAX_SITES", "DSS_CRON_NUMBER_OF_SITES"];
pub const ENV_QUEUE_KEY: &[&str] = &["ALL_SITES_CRON_REDIS_QUEUE_KEY"];
pub const ENV_REDIS_HOST: &[&str] = &["ALL_SITES_CRON_REDIS_HOST"];
pub const ENV_REDIS_PORT: &[&str] = &["ALL_SITES_CRON_REDIS_PORT"];
pub const ENV_REDIS_DB: &[&str] = &["ALL_SITES_CRON_REDIS_DB"];

/// Errors loading or resolving configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid value {value:?} for {key}")]
    InvalidValue { key: String, value: String },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub network: NetworkConfig,
    pub cron: CronConfig,
    pub store: StoreConfig,
    pub queue: QueueConfig,
    pub redis: RedisConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: "127.0.0.1:8080".to_string(),
        }
    }
}

/// Where the member sites come from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Runs are refused unless the network is a multisite install
    pub multisite: bool,
    /// Fixed site list, used when no catalog URL is set
    pub sites: Vec<String>,
    /// JSON endpoint answering `?offset=N&limit=M` with a list of sites
    pub catalog_url: Option<String>,
    /// Verify TLS certificates on trigger requests
    pub verify_tls: bool,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            multisite: true,
            sites: Vec::new(),
            catalog_url: None,
            verify_tls: false,
        }
    }
}

/// Run tunables as written in the file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CronConfig {
    pub rate_limit_seconds: Option<u64>,
    /// Per-site timeout in fractional seconds
    pub request_timeout: Option<f64>,
    pub batch_size: Option<usize>,
    pub max_sites: Option<usize>,
    #[serde(with = "humantime_serde")]
    pub lock_ttl: Option<Duration>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Memory,
    #[default]
    File,
    Redis,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    /// State directory for the file backend
    pub path: Option<PathBuf>,
}

impl StoreConfig {
    pub fn state_dir(&self) -> PathBuf {
        self.path.clone().unwrap_or_else(default_state_dir)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueueBackend {
    /// The shared state store
    Store,
    #[default]
    Redis,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueConfig {
    pub enabled: bool,
    pub backend: QueueBackend,
    pub key: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RedisConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub db: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Log file; stdout when unset
    pub path: Option<PathBuf>,
    /// Filter used when `RUST_LOG` is unset
    pub level: Option<String>,
}

/// Connection settings for Redis
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedisSettings {
    pub host: String,
    pub port: u16,
    pub db: i64,
}

impl RedisSettings {
    pub fn url(&self) -> String {
        format!("redis://{}:{}/{}", self.host, self.port, self.db)
    }
}

/// Fully resolved tunables
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub cooldown: Duration,
    pub request_timeout: Duration,
    pub batch_size: usize,
    pub max_sites: usize,
    pub lock_ttl: Duration,
    pub queue_key: String,
    pub redis: RedisSettings,
}

impl Settings {
    pub fn orchestrator(&self) -> OrchestratorConfig {
        OrchestratorConfig {
            cooldown: self.cooldown,
            lock_ttl: self.lock_ttl,
            dispatch: DispatchConfig {
                timeout: self.request_timeout,
                batch_size: self.batch_size,
                max_sites: self.max_sites,
            },
        }
    }
}

impl Config {
    /// Parse a config file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load `path`, or the default location if it exists, or defaults
    pub fn discover(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => match default_config_path() {
                Some(path) if path.exists() => Self::load(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    /// Resolve tunables against the process environment
    pub fn settings(&self) -> Result<Settings, ConfigError> {
        self.settings_with(|key| std::env::var(key).ok())
    }

    /// Resolve tunables against an arbitrary variable lookup
    pub fn settings_with(
        &self,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Settings, ConfigError> {
        let dispatch = DispatchConfig::default();

        let cooldown_secs = resolve(&env, ENV_RATE_LIMIT, self.cron.rate_limit_seconds, 60)?;
        let timeout_secs = resolve(
            &env,
            ENV_REQUEST_TIMEOUT,
            self.cron.request_timeout,
            dispatch.timeout.as_secs_f64(),
        )?;
        let request_timeout =
            Duration::try_from_secs_f64(timeout_secs).map_err(|_| ConfigError::InvalidValue {
                key: "request_timeout".to_string(),
                value: timeout_secs.to_string(),
            })?;

        Ok(Settings {
            cooldown: Duration::from_secs(cooldown_secs),
            request_timeout,
            batch_size: resolve(&env, ENV_BATCH_SIZE, self.cron.batch_size, dispatch.batch_size)?,
            max_sites: resolve(&env, ENV_MAX_SITES, self.cron.max_sites, dispatch.max_sites)?,
            lock_ttl: self.cron.lock_ttl.unwrap_or(DEFAULT_LOCK_TTL),
            queue_key: resolve(
                &env,
                ENV_QUEUE_KEY,
                self.queue.key.clone(),
                keys::DEFAULT_QUEUE.to_string(),
            )?,
            redis: RedisSettings {
                host: resolve(
                    &env,
                    ENV_REDIS_HOST,
                    self.redis.host.clone(),
                    "127.0.0.1".to_string(),
                )?,
                port: resolve(&env, ENV_REDIS_PORT, self.redis.port, 6379)?,
                db: resolve(&env, ENV_REDIS_DB, self.redis.db, 0)?,
            },
        })
    }
}

/// First set variable in `names`, then the file value, then `default`
///
/// A variable that is set but empty counts as unset.
pub fn resolve<T: FromStr>(
    env: impl Fn(&str) -> Option<String>,
    names: &[&str],
    file: Option<T>,
    default: T,
) -> Result<T, ConfigError> {
    for name in names {
        let Some(raw) = env(name) else { continue };
        let raw = raw.trim();
        if raw.is_empty() {
            continue;
        }
        return raw.parse().map_err(|_| ConfigError::InvalidValue {
            key: (*name).to_string(),
            value: raw.to_string(),
        });
    }
    Ok(file.unwrap_or(default))
}

/// `~/.config/all-sites-cron/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("all-sites-cron").join("config.toml"))
}

/// `~/.local/share/all-sites-cron`, or a relative directory without a home
pub fn default_state_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join("all-sites-cron"))
        .unwrap_or_else(|| PathBuf::from(".all-sites-cron"))
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;

//! Shared helpers for CLI specs

use assert_cmd::assert::Assert;
use assert_cmd::Command;
use predicates::prelude::*;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Variables that would override the config file
const TUNABLE_VARS: &[&str] = &[
    "ALL_SITES_CRON_RATE_LIMIT_SECONDS",
    "DSS_CRON_RATE_LIMIT_SECONDS",
    "ALL_SITES_CRON_REQUEST_TIMEOUT",
    "DSS_CRON_REQUEST_TIMEOUT",
    "ALL_SITES_CRON_BATCH_SIZE",
    "ALL_SITES_CRON_MAX_SITES",
    "DSS_CRON_NUMBER_OF_SITES",
    "ALL_SITES_CRON_REDIS_QUEUE_KEY",
    "ALL_SITES_CRON_REDIS_HOST",
    "ALL_SITES_CRON_REDIS_PORT",
    "ALL_SITES_CRON_REDIS_DB",
];

/// A temp directory holding a config file and a file-backed store
pub struct Project {
    dir: TempDir,
}

impl Project {
    /// Multisite network with no sites and no queue
    pub fn empty() -> Self {
        Self::with_config("")
    }

    /// Network with a store-backed job queue
    pub fn with_queue() -> Self {
        Self::with_config("[queue]\nenabled = true\nbackend = \"store\"\n")
    }

    /// Base config followed by `extra` TOML
    pub fn with_config(extra: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let state = dir.path().join("state");
        let config = format!(
            "[network]\nsites = []\n\n[store]\nbackend = \"file\"\npath = {:?}\n\n{}",
            state.display().to_string(),
            extra
        );
        std::fs::write(dir.path().join("config.toml"), config).unwrap();
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn config_path(&self) -> PathBuf {
        self.path().join("config.toml")
    }

    /// Write a file in the project directory
    pub fn file(&self, name: &str, content: &str) {
        std::fs::write(self.path().join(name), content).unwrap();
    }

    /// `asc --config <project config>`
    pub fn asc(&self) -> Cli {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_asc"));
        for var in TUNABLE_VARS {
            cmd.env_remove(var);
        }
        cmd.env("RUST_LOG", "warn")
            .arg("--config")
            .arg(self.config_path());
        Cli { cmd }
    }
}

/// `asc` with no project
pub fn asc() -> Cli {
    Cli {
        cmd: Command::new(env!("CARGO_BIN_EXE_asc")),
    }
}

pub struct Cli {
    cmd: Command,
}

impl Cli {
    pub fn args(mut self, args: &[&str]) -> Self {
        self.cmd.args(args);
        self
    }

    pub fn env(mut self, key: &str, value: &str) -> Self {
        self.cmd.env(key, value);
        self
    }

    pub fn passes(mut self) -> Outcome {
        Outcome(self.cmd.assert().success())
    }

    pub fn fails(mut self) -> Outcome {
        Outcome(self.cmd.assert().failure())
    }
}

pub struct Outcome(Assert);

impl Outcome {
    pub fn stdout_has(self, expected: &str) -> Self {
        Self(self.0.stdout(predicate::str::contains(expected)))
    }

    pub fn stdout_lacks(self, unexpected: &str) -> Self {
        Self(self.0.stdout(predicate::str::contains(unexpected).not()))
    }

    pub fn stdout_eq(self, expected: &str) -> Self {
        Self(self.0.stdout(predicate::str::diff(expected.to_string())))
    }

    pub fn stderr_has(self, expected: &str) -> Self {
        Self(self.0.stderr(predicate::str::contains(expected)))
    }

    pub fn stdout_json(self) -> serde_json::Value {
        serde_json::from_slice(&self.0.get_output().stdout).unwrap()
    }
}

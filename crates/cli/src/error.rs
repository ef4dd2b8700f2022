// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! User-friendly error display with context and suggestions.
//!
//! Every error says what went wrong, optionally why, and how an operator
//! can fix it.

use asc_adapters::AdapterError;
use asc_core::config::ConfigError;
use std::fmt;
use std::path::Path;

/// Error with context and recovery suggestions for user-friendly display.
#[derive(Debug)]
pub struct CliError {
    /// What went wrong
    pub message: String,
    /// Why it might have happened
    pub context: Vec<String>,
    /// How to fix it
    pub suggestions: Vec<String>,
    /// Original error if any
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl CliError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            context: Vec::new(),
            suggestions: Vec::new(),
            source: None,
        }
    }

    pub fn with_context(mut self, ctx: impl Into<String>) -> Self {
        self.context.push(ctx.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    pub fn with_source<E: std::error::Error + Send + Sync + 'static>(mut self, source: E) -> Self {
        self.source = Some(Box::new(source));
        self
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "error: {}", self.message)?;

        if !self.context.is_empty() {
            writeln!(f)?;
            for ctx in &self.context {
                writeln!(f, "  -> {}", ctx)?;
            }
        }

        if !self.suggestions.is_empty() {
            writeln!(f)?;
            writeln!(f, "suggestions:")?;
            for (i, suggestion) in self.suggestions.iter().enumerate() {
                writeln!(f, "  {}. {}", i + 1, suggestion)?;
            }
        }

        Ok(())
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Builders for the failures operators run into
impl CliError {
    pub fn config(path: Option<&Path>, err: ConfigError) -> Self {
        let location = path.map_or_else(
            || "the default config location".to_string(),
            |p| p.display().to_string(),
        );
        CliError::new("Failed to load configuration")
            .with_context(err.to_string())
            .with_context(format!("Configuration was read from {}", location))
            .with_suggestion("Check the TOML syntax and the ALL_SITES_CRON_* variables")
            .with_source(err)
    }

    pub fn store_unavailable(err: AdapterError) -> Self {
        CliError::new("Shared state store is unavailable")
            .with_context(err.to_string())
            .with_suggestion("Check the [store] section of the config")
            .with_suggestion("For Redis, check [redis] or ALL_SITES_CRON_REDIS_HOST/PORT/DB")
            .with_source(err)
    }

    pub fn queue_disabled() -> Self {
        CliError::new("Job queue is not configured")
            .with_context("Draining needs a queue to pop jobs from")
            .with_suggestion("Set `enabled = true` in the [queue] section of the config")
    }
}

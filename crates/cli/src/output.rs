// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Output formatting for CLI commands
//!
//! Text output of a run is a single GitHub Actions workflow command line,
//! the same line the daemon sends for `?ga`.

use asc_core::dispatch::DispatchResult;
use asc_core::format::{annotate, timestamp, Annotation};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_flag(json: bool) -> Self {
        if json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

/// Print output in the specified format
pub fn print<T: Serialize + fmt::Display>(value: &T, format: OutputFormat) {
    match format {
        OutputFormat::Text => println!("{}", value),
        OutputFormat::Json => {
            if let Ok(json) = serde_json::to_string_pretty(value) {
                println!("{}", json);
            }
        }
    }
}

/// Outcome of a run or drain, as shown to the operator
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after: Option<u64>,
    pub timestamp: String,
    #[serde(skip)]
    level: Annotation,
    #[serde(skip)]
    text: String,
}

impl RunReport {
    fn new(success: bool, message: impl Into<String>, now: DateTime<Utc>) -> Self {
        let message = message.into();
        Self {
            success,
            text: message.clone(),
            message,
            count: None,
            status: None,
            retry_after: None,
            timestamp: timestamp(now),
            level: if success {
                Annotation::Notice
            } else {
                Annotation::Error
            },
        }
    }

    /// A run that finished, successfully or not
    pub fn finished(result: &DispatchResult, now: DateTime<Utc>) -> Self {
        let mut report = Self::new(result.success, result.message.clone(), now);
        report.count = Some(result.count);
        if result.success && result.message.is_empty() {
            report.text = format!("Running wp-cron on {} sites", result.count);
        }
        report
    }

    /// A run turned away by a lock held elsewhere
    pub fn locked(message: impl Into<String>, now: DateTime<Utc>) -> Self {
        let mut report = Self::new(false, message, now);
        report.level = Annotation::Warning;
        report
    }

    /// A run turned away by the cooldown
    pub fn rate_limited(message: impl Into<String>, retry_after: u64, now: DateTime<Utc>) -> Self {
        let mut report = Self::new(false, message, now);
        report.retry_after = Some(retry_after);
        report
    }

    pub fn refused(message: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self::new(false, message, now)
    }

    /// A run handed to the queue
    pub fn queued(message: impl Into<String>, now: DateTime<Utc>) -> Self {
        let mut report = Self::new(true, message, now);
        report.status = Some("queued");
        report
    }

    #[cfg(test)]
    pub fn level(&self) -> Annotation {
        self.level
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&annotate(self.level, &self.text))
    }
}

#[cfg(test)]
#[path = "output_tests.rs"]
mod tests;

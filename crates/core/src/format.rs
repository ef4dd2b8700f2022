// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Output helpers shared by the daemon and the CLI

use chrono::{DateTime, Utc};
use std::fmt;

/// GitHub Actions annotation level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Annotation {
    Notice,
    Warning,
    Error,
}

impl Annotation {
    pub fn as_str(self) -> &'static str {
        match self {
            Annotation::Notice => "notice",
            Annotation::Warning => "warning",
            Annotation::Error => "error",
        }
    }
}

impl fmt::Display for Annotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One `::level::message` line, without a trailing newline
pub fn annotate(level: Annotation, message: &str) -> String {
    format!("::{}::{}", level, escape_annotation(message))
}

/// Escape workflow-command data so a message stays on one line
pub fn escape_annotation(message: &str) -> String {
    let mut out = String::with_capacity(message.len());
    for ch in message.chars() {
        match ch {
            '%' => out.push_str("%25"),
            '\r' => out.push_str("%0D"),
            '\n' => out.push_str("%0A"),
            _ => out.push(ch),
        }
    }
    out
}

/// `YYYY-MM-DD HH:MM:SS` in UTC
pub fn timestamp(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M:%S").to_string()
}

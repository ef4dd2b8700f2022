// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Response rendering for the run and drain endpoints
//!
//! Every reply renders either as a JSON object or, in annotation mode, as
//! a single GitHub Actions workflow command line.

use asc_core::coordination::RateLimited;
use asc_core::dispatch::DispatchResult;
use asc_core::format::{annotate, timestamp, Annotation};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

pub use asc_core::orchestrator::NOT_MULTISITE_MESSAGE;
pub use asc_core::queue::QUEUED_MESSAGE;

pub const DEFERRED_MESSAGE: &str = "Cron run accepted and continuing in the background";
pub const NO_QUEUE_MESSAGE: &str = "Job queue is not configured";

/// One reply, renderable in either output mode
#[derive(Debug, Clone)]
pub struct Reply {
    status: StatusCode,
    level: Annotation,
    text: String,
    fields: Map<String, Value>,
    retry_after: Option<u64>,
}

impl Reply {
    fn new(status: StatusCode, success: bool, message: impl Into<String>) -> Self {
        let message = message.into();
        let mut fields = Map::new();
        fields.insert("success".to_string(), Value::Bool(success));
        fields.insert("message".to_string(), Value::String(message.clone()));
        Self {
            status,
            level: if success {
                Annotation::Notice
            } else {
                Annotation::Error
            },
            text: message,
            fields,
            retry_after: None,
        }
    }

    fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(key.to_string(), value.into());
        self
    }

    pub fn not_multisite() -> Self {
        Self::new(StatusCode::BAD_REQUEST, false, NOT_MULTISITE_MESSAGE).with("error", "not_multisite")
    }

    pub fn locked(message: impl Into<String>) -> Self {
        let mut reply = Self::new(StatusCode::CONFLICT, false, message).with("error", "locked");
        reply.level = Annotation::Warning;
        reply
    }

    pub fn rate_limited(limited: &RateLimited) -> Self {
        let retry_after = limited.retry_after.as_secs();
        let last_run = limited
            .last_run
            .map_or(Value::Null, |at| Value::from(at.timestamp()));
        let mut reply = Self::new(StatusCode::TOO_MANY_REQUESTS, false, limited.to_string())
            .with("error", "rate_limited")
            .with("retry_after", retry_after)
            .with("cooldown", limited.cooldown.as_secs())
            .with("last_run_gmt", last_run);
        reply.retry_after = Some(retry_after);
        reply
    }

    /// Accepted for deferred processing; `status` is `queued` or `deferred`
    pub fn accepted(status: &str, message: &str) -> Self {
        Self::new(StatusCode::ACCEPTED, true, message).with("status", status)
    }

    /// A synchronous run finished
    pub fn completed(result: &DispatchResult) -> Self {
        let mut reply = Self::new(StatusCode::OK, result.success, result.message.clone())
            .with("count", result.count)
            .with("endpoint", "rest");
        if result.success {
            reply.text = format!("Running wp-cron on {} sites", result.count);
        }
        reply
    }

    /// A drain finished, or found nothing to do
    pub fn drained(result: &DispatchResult) -> Self {
        let status = if result.success {
            StatusCode::OK
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        Self::new(status, result.success, result.message.clone()).with("count", result.count)
    }

    pub fn queue_unavailable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, false, message).with("error", "queue_unavailable")
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// JSON object, including the timestamp
    pub fn to_json(&self, now: DateTime<Utc>) -> Value {
        let mut fields = self.fields.clone();
        fields.insert("timestamp".to_string(), Value::String(timestamp(now)));
        Value::Object(fields)
    }

    /// Annotation line, newline-terminated
    pub fn to_annotation(&self) -> String {
        format!("{}\n", annotate(self.level, &self.text))
    }

    pub fn render(self, annotations: bool, now: DateTime<Utc>) -> Response {
        let mut response = if annotations {
            (
                self.status,
                [(
                    header::CONTENT_TYPE,
                    HeaderValue::from_static("text/plain; charset=utf-8"),
                )],
                self.to_annotation(),
            )
                .into_response()
        } else {
            (self.status, axum::Json(self.to_json(now))).into_response()
        };
        if let Some(secs) = self.retry_after {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(secs));
        }
        response
    }
}

#[cfg(test)]
#[path = "response_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared state store abstraction
//!
//! The lock, the cooldown marker and the job queue live in a store shared by
//! every process that handles run requests. Values are plain strings; typed
//! records are JSON-encoded by the caller.

use crate::clock::{Clock, SystemClock};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;

/// Errors from store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("store error: {0}")]
    Backend(String),
}

impl StoreError {
    /// Whether the backend could not be reached at all
    pub fn is_unavailable(&self) -> bool {
        matches!(self, StoreError::Unavailable(_))
    }
}

/// Key/value store with TTLs and FIFO lists, shared across processes
#[async_trait]
pub trait StateStore: Clone + Send + Sync + 'static {
    /// Read a value; expired values read as absent
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Write a value, optionally expiring after `ttl`
    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), StoreError>;

    /// Delete a value; deleting an absent key is not an error
    async fn delete(&self, key: &str) -> Result<(), StoreError>;

    /// Append to the tail of a list
    async fn push(&self, list: &str, value: &str) -> Result<(), StoreError>;

    /// Pop from the head of a list without blocking
    async fn pop(&self, list: &str) -> Result<Option<String>, StoreError>;

    /// Number of entries in a list
    async fn len(&self, list: &str) -> Result<usize, StoreError>;
}

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Default)]
struct MemoryState {
    values: HashMap<String, Entry>,
    lists: HashMap<String, VecDeque<String>>,
}

/// Process-local store for tests and single-process deployments
#[derive(Clone)]
pub struct MemoryStore<C: Clock = SystemClock> {
    state: Arc<Mutex<MemoryState>>,
    clock: C,
}

impl MemoryStore<SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for MemoryStore<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> MemoryStore<C> {
    /// Create a store whose TTLs are measured against `clock`
    pub fn with_clock(clock: C) -> Self {
        Self {
            state: Arc::new(Mutex::new(MemoryState::default())),
            clock,
        }
    }

    /// All live keys, for assertions in tests
    pub fn keys(&self) -> Vec<String> {
        let now = self.clock.now();
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        let mut keys: Vec<String> = state
            .values
            .iter()
            .filter(|(_, entry)| entry.expires_at.map_or(true, |at| at > now))
            .map(|(key, _)| key.clone())
            .chain(
                state
                    .lists
                    .iter()
                    .filter(|(_, items)| !items.is_empty())
                    .map(|(key, _)| key.clone()),
            )
            .collect();
        keys.sort();
        keys
    }
}

#[async_trait]
impl<C: Clock> StateStore for MemoryStore<C> {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let now = self.clock.now();
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        match state.values.get(key) {
            Some(entry) if entry.expires_at.is_some_and(|at| at <= now) => {
                state.values.remove(key);
                Ok(None)
            }
            Some(entry) => Ok(Some(entry.value.clone())),
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), StoreError> {
        let expires_at = ttl
            .and_then(|ttl| chrono::Duration::from_std(ttl).ok())
            .map(|ttl| self.clock.now() + ttl);
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.values.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at,
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.values.remove(key);
        state.lists.remove(key);
        Ok(())
    }

    async fn push(&self, list: &str, value: &str) -> Result<(), StoreError> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state
            .lists
            .entry(list.to_string())
            .or_default()
            .push_back(value.to_string());
        Ok(())
    }

    async fn pop(&self, list: &str) -> Result<Option<String>, StoreError> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        Ok(state.lists.get_mut(list).and_then(|items| items.pop_front()))
    }

    async fn len(&self, list: &str) -> Result<usize, StoreError> {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        Ok(state.lists.get(list).map_or(0, |items| items.len()))
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;

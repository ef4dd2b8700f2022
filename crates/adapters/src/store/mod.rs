// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared state store backends

mod file;
mod redis;

pub use self::file::JsonFileStore;
pub use self::redis::RedisStore;

use asc_core::store::{MemoryStore, StateStore, StoreError};
use async_trait::async_trait;
use std::time::Duration;

/// Store selected by configuration
#[derive(Clone)]
pub enum Store {
    Memory(MemoryStore),
    File(JsonFileStore),
    Redis(RedisStore),
}

impl Store {
    pub fn backend_name(&self) -> &'static str {
        match self {
            Store::Memory(_) => "memory",
            Store::File(_) => "file",
            Store::Redis(_) => "redis",
        }
    }
}

#[async_trait]
impl StateStore for Store {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        match self {
            Store::Memory(s) => s.get(key).await,
            Store::File(s) => s.get(key).await,
            Store::Redis(s) => s.get(key).await,
        }
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), StoreError> {
        match self {
            Store::Memory(s) => s.set(key, value, ttl).await,
            Store::File(s) => s.set(key, value, ttl).await,
            Store::Redis(s) => s.set(key, value, ttl).await,
        }
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        match self {
            Store::Memory(s) => s.delete(key).await,
            Store::File(s) => s.delete(key).await,
            Store::Redis(s) => s.delete(key).await,
        }
    }

    async fn push(&self, list: &str, value: &str) -> Result<(), StoreError> {
        match self {
            Store::Memory(s) => s.push(list, value).await,
            Store::File(s) => s.push(list, value).await,
            Store::Redis(s) => s.push(list, value).await,
        }
    }

    async fn pop(&self, list: &str) -> Result<Option<String>, StoreError> {
        match self {
            Store::Memory(s) => s.pop(list).await,
            Store::File(s) => s.pop(list).await,
            Store::Redis(s) => s.pop(list).await,
        }
    }

    async fn len(&self, list: &str) -> Result<usize, StoreError> {
        match self {
            Store::Memory(s) => s.len(list).await,
            Store::File(s) => s.len(list).await,
            Store::Redis(s) => s.len(list).await,
        }
    }
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared state store on the local filesystem
//!
//! One JSON file per key under a state directory. Every operation holds an
//! exclusive advisory lock on `<dir>/.lock`, so processes sharing the
//! directory see each other's writes in order. Files are replaced through
//! a rename and never observed half-written.

use asc_core::clock::{Clock, SystemClock};
use asc_core::store::{StateStore, StoreError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fs::{self, File, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

const LOCK_FILE: &str = ".lock";

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
enum Record {
    Value {
        value: String,
        expires_at: Option<DateTime<Utc>>,
    },
    List {
        items: VecDeque<String>,
    },
}

impl Record {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        matches!(self, Record::Value { expires_at: Some(at), .. } if *at <= now)
    }
}

/// File-backed store shared by processes on one host
#[derive(Clone)]
pub struct JsonFileStore<C: Clock = SystemClock> {
    dir: Arc<PathBuf>,
    clock: C,
}

impl JsonFileStore<SystemClock> {
    /// Open (creating if needed) a store rooted at `dir`
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        Self::with_clock(dir, SystemClock)
    }
}

impl<C: Clock> JsonFileStore<C> {
    pub fn with_clock(dir: impl Into<PathBuf>, clock: C) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir: Arc::new(dir),
            clock,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Run `op` on a blocking thread while holding the directory lock
    async fn locked<T, F>(&self, op: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&Path, DateTime<Utc>) -> Result<T, StoreError> + Send + 'static,
    {
        let dir = Arc::clone(&self.dir);
        let now = self.clock.now();
        tokio::task::spawn_blocking(move || {
            let lock = OpenOptions::new()
                .create(true)
                .truncate(false)
                .write(true)
                .open(dir.join(LOCK_FILE))?;
            lock.lock_exclusive()?;
            let result = op(&dir, now);
            if let Err(e) = FileExt::unlock(&lock) {
                warn!(dir = %dir.display(), error = %e, "failed to unlock store directory");
            }
            result
        })
        .await
        .map_err(|e| StoreError::Backend(format!("store task failed: {}", e)))?
    }
}

fn record_path(dir: &Path, key: &str) -> PathBuf {
    let name: String = key
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();
    dir.join(format!("{}.json", name))
}

/// Read a live record; an expired value is removed and reads as absent
fn read_record(path: &Path, now: DateTime<Utc>) -> Result<Option<Record>, StoreError> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let record: Record = serde_json::from_str(&text)?;
    if record.is_expired(now) {
        remove_record(path)?;
        return Ok(None);
    }
    Ok(Some(record))
}

fn write_record(path: &Path, record: &Record) -> Result<(), StoreError> {
    let tmp = path.with_extension("json.tmp");
    {
        let file = File::create(&tmp)?;
        serde_json::to_writer(&file, record)?;
        file.sync_all()?;
    }
    fs::rename(&tmp, path)?;
    Ok(())
}

fn remove_record(path: &Path) -> Result<(), StoreError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

fn wrong_type(key: &str, expected: &str) -> StoreError {
    StoreError::Backend(format!("{} does not hold a {}", key, expected))
}

#[async_trait]
impl<C: Clock> StateStore for JsonFileStore<C> {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let key = key.to_string();
        self.locked(move |dir, now| {
            match read_record(&record_path(dir, &key), now)? {
                Some(Record::Value { value, .. }) => Ok(Some(value)),
                Some(Record::List { .. }) => Err(wrong_type(&key, "value")),
                None => Ok(None),
            }
        })
        .await
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), StoreError> {
        let key = key.to_string();
        let value = value.to_string();
        self.locked(move |dir, now| {
            let expires_at = ttl
                .and_then(|ttl| chrono::Duration::from_std(ttl).ok())
                .map(|ttl| now + ttl);
            write_record(&record_path(dir, &key), &Record::Value { value, expires_at })
        })
        .await
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        let key = key.to_string();
        self.locked(move |dir, _| remove_record(&record_path(dir, &key)))
            .await
    }

    async fn push(&self, list: &str, value: &str) -> Result<(), StoreError> {
        let list = list.to_string();
        let value = value.to_string();
        self.locked(move |dir, now| {
            let path = record_path(dir, &list);
            let mut items = match read_record(&path, now)? {
                Some(Record::List { items }) => items,
                Some(Record::Value { .. }) => return Err(wrong_type(&list, "list")),
                None => VecDeque::new(),
            };
            items.push_back(value);
            write_record(&path, &Record::List { items })
        })
        .await
    }

    async fn pop(&self, list: &str) -> Result<Option<String>, StoreError> {
        let list = list.to_string();
        self.locked(move |dir, now| {
            let path = record_path(dir, &list);
            let mut items = match read_record(&path, now)? {
                Some(Record::List { items }) => items,
                Some(Record::Value { .. }) => return Err(wrong_type(&list, "list")),
                None => return Ok(None),
            };
            let head = items.pop_front();
            if items.is_empty() {
                remove_record(&path)?;
            } else {
                write_record(&path, &Record::List { items })?;
            }
            Ok(head)
        })
        .await
    }

    async fn len(&self, list: &str) -> Result<usize, StoreError> {
        let list = list.to_string();
        self.locked(move |dir, now| match read_record(&record_path(dir, &list), now)? {
            Some(Record::List { items }) => Ok(items.len()),
            Some(Record::Value { .. }) => Err(wrong_type(&list, "list")),
            None => Ok(0),
        })
        .await
    }
}

#[cfg(test)]
#[path = "file_tests.rs"]
mod tests;

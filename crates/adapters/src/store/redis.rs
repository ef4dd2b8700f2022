// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Redis-backed shared state store and queue backend

use asc_core::config::RedisSettings;
use asc_core::store::{StateStore, StoreError};
use async_trait::async_trait;
use redis::aio::{ConnectionManager, ConnectionManagerConfig};
use redis::{AsyncCommands, RedisError};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(1);
const RESPONSE_TIMEOUT: Duration = Duration::from_secs(2);
const RECONNECT_RETRIES: usize = 2;

/// Store over a single Redis database
///
/// The connection is opened on first use and shared by clones. A dropped
/// connection is re-established in the background; the command that hit
/// the drop fails as unavailable and later commands use the new one.
#[derive(Clone)]
pub struct RedisStore {
    client: redis::Client,
    conn: Arc<OnceCell<ConnectionManager>>,
}

impl RedisStore {
    pub fn new(settings: &RedisSettings) -> Result<Self, StoreError> {
        let client = redis::Client::open(settings.url()).map_err(map_error)?;
        Ok(Self {
            client,
            conn: Arc::new(OnceCell::new()),
        })
    }

    async fn connection(&self) -> Result<ConnectionManager, StoreError> {
        let conn = self
            .conn
            .get_or_try_init(|| async {
                let config = ConnectionManagerConfig::new()
                    .set_number_of_retries(RECONNECT_RETRIES)
                    .set_connection_timeout(CONNECT_TIMEOUT)
                    .set_response_timeout(RESPONSE_TIMEOUT);
                ConnectionManager::new_with_config(self.client.clone(), config)
                    .await
                    .map_err(|e| StoreError::Unavailable(e.to_string()))
            })
            .await?;
        Ok(conn.clone())
    }
}

fn map_error(err: RedisError) -> StoreError {
    if err.is_connection_refusal()
        || err.is_connection_dropped()
        || err.is_io_error()
        || err.is_timeout()
    {
        StoreError::Unavailable(err.to_string())
    } else {
        StoreError::Backend(err.to_string())
    }
}

#[async_trait]
impl StateStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut conn = self.connection().await?;
        conn.get(key).await.map_err(map_error)
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), StoreError> {
        let mut conn = self.connection().await?;
        match ttl {
            Some(ttl) => conn
                .set_ex::<_, _, ()>(key, value, ttl.as_secs().max(1))
                .await
                .map_err(map_error),
            None => conn.set::<_, _, ()>(key, value).await.map_err(map_error),
        }
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        let mut conn = self.connection().await?;
        conn.del::<_, ()>(key).await.map_err(map_error)
    }

    async fn push(&self, list: &str, value: &str) -> Result<(), StoreError> {
        let mut conn = self.connection().await?;
        conn.rpush::<_, _, ()>(list, value).await.map_err(map_error)
    }

    async fn pop(&self, list: &str) -> Result<Option<String>, StoreError> {
        let mut conn = self.connection().await?;
        conn.lpop(list, None).await.map_err(map_error)
    }

    async fn len(&self, list: &str) -> Result<usize, StoreError> {
        let mut conn = self.connection().await?;
        conn.llen(list).await.map_err(map_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    #[test]
    fn invalid_url_is_rejected() {
        let settings = RedisSettings {
            host: "bad host/".to_string(),
            port: 6379,
            db: 0,
        };
        assert!(RedisStore::new(&settings).is_err());
    }

    #[tokio::test]
    async fn unreachable_server_is_unavailable() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let store = RedisStore::new(&RedisSettings {
            host: "127.0.0.1".to_string(),
            port,
            db: 0,
        })
        .unwrap();

        let err = store.get("k").await.unwrap_err();
        assert!(err.is_unavailable());
    }

    /// Minimal RESP server: `GET` answers "value", everything else `+OK`
    async fn serve(mut socket: TcpStream, hang_up_after_gets: Option<usize>) {
        let mut buf = Vec::new();
        let mut gets = 0;
        let mut chunk = [0u8; 1024];
        loop {
            let n = match socket.read(&mut chunk).await {
                Ok(0) | Err(_) => return,
                Ok(n) => n,
            };
            buf.extend_from_slice(&chunk[..n]);
            while let Some((command, used)) = parse_command(&buf) {
                buf.drain(..used);
                let is_get = command.eq_ignore_ascii_case("GET");
                let reply: &[u8] = if is_get { b"$5\r\nvalue\r\n" } else { b"+OK\r\n" };
                if socket.write_all(reply).await.is_err() {
                    return;
                }
                if is_get {
                    gets += 1;
                    if hang_up_after_gets == Some(gets) {
                        return;
                    }
                }
            }
        }
    }

    /// Command name and byte length of the first complete RESP array in `buf`
    fn parse_command(buf: &[u8]) -> Option<(String, usize)> {
        let (count, mut pos) = read_header(buf, 0, b'*')?;
        let mut name = None;
        for _ in 0..count {
            let (len, start) = read_header(buf, pos, b'$')?;
            if buf.len() < start + len + 2 {
                return None;
            }
            name.get_or_insert_with(|| String::from_utf8_lossy(&buf[start..start + len]).into_owned());
            pos = start + len + 2;
        }
        Some((name.unwrap_or_default(), pos))
    }

    fn read_header(buf: &[u8], pos: usize, marker: u8) -> Option<(usize, usize)> {
        if buf.get(pos) != Some(&marker) {
            return None;
        }
        let end = pos + buf[pos..].windows(2).position(|w| w == b"\r\n")?;
        let value = std::str::from_utf8(&buf[pos + 1..end]).ok()?.parse().ok()?;
        Some((value, end + 2))
    }

    #[tokio::test]
    async fn dropped_connection_is_reestablished() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let accepted = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&accepted);
        tokio::spawn(async move {
            while let Ok((socket, _)) = listener.accept().await {
                // The first connection goes away after one reply
                let hang_up = (counter.fetch_add(1, Ordering::SeqCst) == 0).then_some(1);
                tokio::spawn(serve(socket, hang_up));
            }
        });

        let store = RedisStore::new(&RedisSettings {
            host: "127.0.0.1".to_string(),
            port,
            db: 0,
        })
        .unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some("value".to_string()));

        let mut recovered = false;
        for _ in 0..40 {
            if let Ok(Some(value)) = store.get("k").await {
                assert_eq!(value, "value");
                recovered = true;
                break;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }

        assert!(recovered);
        assert!(accepted.load(Ordering::SeqCst) >= 2);
    }
}

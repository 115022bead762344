//! Redis-backed store.

use crate::backend::KeyValueStore;
use crate::error::{StoreError, StoreResult};
use parking_lot::Mutex;
use redis::{Client, Connection, RedisError};
use std::time::Duration;
use tracing::debug;

/// A store backed by a single Redis connection.
///
/// The connection is opened eagerly by [`RedisStore::connect`] and reused
/// for every command. Commands are serialized through an internal lock.
///
/// No timeouts are applied unless one is passed to
/// [`RedisStore::connect_with_timeout`]; a blocked server blocks the caller.
///
/// # Example
///
/// ```no_run
/// use redpaste_store::{KeyValueStore, RedisStore};
/// use std::time::Duration;
///
/// let store = RedisStore::connect("redis://127.0.0.1:6379/0").unwrap();
/// store.set_with_ttl("io.luzifer.redpaste", "...", Duration::ZERO).unwrap();
/// ```
pub struct RedisStore {
    conn: Mutex<Connection>,
}

impl RedisStore {
    /// Connects to the server named by a `redis://` connection string.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is invalid or the server is unreachable.
    pub fn connect(url: &str) -> StoreResult<Self> {
        Self::connect_with_timeout(url, None)
    }

    /// Connects with an optional timeout applied to connecting, reads and
    /// writes.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is invalid or the server is unreachable.
    pub fn connect_with_timeout(url: &str, timeout: Option<Duration>) -> StoreResult<Self> {
        let client = Client::open(url).map_err(|e| StoreError::InvalidUrl(e.to_string()))?;

        let conn = match timeout {
            Some(timeout) => {
                let conn = client
                    .get_connection_with_timeout(timeout)
                    .map_err(connection_error)?;
                conn.set_read_timeout(Some(timeout))
                    .map_err(connection_error)?;
                conn.set_write_timeout(Some(timeout))
                    .map_err(connection_error)?;
                conn
            }
            None => client.get_connection().map_err(connection_error)?,
        };

        debug!(timeout = ?timeout, "connected to redis");

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

impl KeyValueStore for RedisStore {
    fn get_range(&self, key: &str, start: isize, end: isize) -> StoreResult<Vec<u8>> {
        let mut conn = self.conn.lock();
        redis::cmd("GETRANGE")
            .arg(key)
            .arg(start)
            .arg(end)
            .query::<Vec<u8>>(&mut *conn)
            .map_err(|e| StoreError::command("GETRANGE", e.to_string()))
    }

    fn set_with_ttl(&self, key: &str, value: &str, ttl: Duration) -> StoreResult<()> {
        let mut cmd = redis::cmd("SET");
        cmd.arg(key).arg(value);
        // EX takes whole seconds; zero means no expiry.
        let secs = ttl.as_secs();
        if secs > 0 {
            cmd.arg("EX").arg(secs);
        }

        let mut conn = self.conn.lock();
        cmd.query::<()>(&mut *conn)
            .map_err(|e| StoreError::command("SET", e.to_string()))
    }
}

fn connection_error(err: RedisError) -> StoreError {
    StoreError::Connection(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_url_is_rejected() {
        let result = RedisStore::connect("not a url");
        assert!(matches!(result, Err(StoreError::InvalidUrl(_))));
    }

    #[test]
    fn unreachable_server_is_a_connection_error() {
        // Port 1 on localhost is reserved and refuses connections.
        let result =
            RedisStore::connect_with_timeout("redis://127.0.0.1:1/0", Some(Duration::from_secs(1)));
        assert!(matches!(result, Err(StoreError::Connection(_))));
    }
}

//! Session store: the token revocation/liveness oracle
//!
//! Maps a raw token string to its subject with a TTL. A token is only
//! honored while its record exists here, which is what makes logout-style
//! revocation possible before the token's embedded expiry. TTL enforcement
//! belongs to the backing store; there is no expiry sweep in this process.

use crate::storage::redis::RedisPool;
use crate::utils::error::{GateError, Result};
use async_trait::async_trait;
use dashmap::DashMap;
use std::time::{Duration, Instant};
use tracing::debug;

const TOKEN_KEY_PREFIX: &str = "jwt:token:";
const USER_KEY_PREFIX: &str = "jwt:user:";

/// Revocation/liveness oracle for issued tokens.
///
/// Implementations must treat `get` on an expired or deleted record as
/// absent, never as an error.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Record a live session, overwriting any prior record for the token.
    async fn put(&self, token: &str, subject: &str, ttl: Duration) -> Result<()>;

    /// Look up the subject recorded for a token.
    async fn get(&self, token: &str) -> Result<Option<String>>;

    /// Remove the record for a token.
    async fn delete(&self, token: &str) -> Result<()>;

    /// Auxiliary lookup index: subject email to numeric account id.
    ///
    /// Not consulted by liveness checks; maintained for parity with the
    /// token record's lifecycle.
    async fn put_user_index(&self, email: &str, user_id: i64, ttl: Duration) -> Result<()>;

    /// Remove the auxiliary index entry for a subject.
    async fn delete_user_index(&self, email: &str) -> Result<()>;
}

/// Redis-backed session store.
///
/// Every command is bounded by `command_timeout`; an elapsed timeout is
/// reported as `SessionStoreUnavailable` so callers fail closed instead of
/// hanging a request on a sick Redis.
pub struct RedisSessionStore {
    pool: RedisPool,
    command_timeout: Duration,
}

impl RedisSessionStore {
    pub fn new(pool: RedisPool, command_timeout: Duration) -> Self {
        Self {
            pool,
            command_timeout,
        }
    }
}

/// Bound a store command by a deadline; an elapsed deadline is a store
/// failure, not a hang.
pub(crate) async fn bounded<T>(
    limit: Duration,
    fut: impl std::future::Future<Output = Result<T>> + Send,
) -> Result<T> {
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(GateError::store_unavailable(format!(
            "command timed out after {:?}",
            limit
        ))),
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn put(&self, token: &str, subject: &str, ttl: Duration) -> Result<()> {
        let key = format!("{}{}", TOKEN_KEY_PREFIX, token);
        bounded(
            self.command_timeout,
            self.pool.set(&key, subject, Some(ttl.as_secs())),
        )
        .await
    }

    async fn get(&self, token: &str) -> Result<Option<String>> {
        let key = format!("{}{}", TOKEN_KEY_PREFIX, token);
        bounded(self.command_timeout, self.pool.get(&key)).await
    }

    async fn delete(&self, token: &str) -> Result<()> {
        let key = format!("{}{}", TOKEN_KEY_PREFIX, token);
        bounded(self.command_timeout, self.pool.delete(&key)).await
    }

    async fn put_user_index(&self, email: &str, user_id: i64, ttl: Duration) -> Result<()> {
        let key = format!("{}{}", USER_KEY_PREFIX, email);
        bounded(
            self.command_timeout,
            self.pool
                .set(&key, &user_id.to_string(), Some(ttl.as_secs())),
        )
        .await
    }

    async fn delete_user_index(&self, email: &str) -> Result<()> {
        let key = format!("{}{}", USER_KEY_PREFIX, email);
        bounded(self.command_timeout, self.pool.delete(&key)).await
    }
}

/// In-memory session store with lazy TTL expiry.
///
/// Used in tests and when Redis is disabled in configuration. Single-node
/// only; records vanish on restart, which is acceptable because tokens are
/// simply re-issued at next login.
#[derive(Default)]
pub struct MemorySessionStore {
    entries: DashMap<String, ExpiringEntry>,
}

struct ExpiringEntry {
    value: String,
    deadline: Instant,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn insert(&self, key: String, value: &str, ttl: Duration) {
        self.entries.insert(
            key,
            ExpiringEntry {
                value: value.to_string(),
                deadline: Instant::now() + ttl,
            },
        );
    }

    fn lookup(&self, key: &str) -> Option<String> {
        let entry = self.entries.get(key)?;
        if entry.deadline <= Instant::now() {
            drop(entry);
            self.entries.remove(key);
            return None;
        }
        Some(entry.value.clone())
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn put(&self, token: &str, subject: &str, ttl: Duration) -> Result<()> {
        self.insert(format!("{}{}", TOKEN_KEY_PREFIX, token), subject, ttl);
        Ok(())
    }

    async fn get(&self, token: &str) -> Result<Option<String>> {
        Ok(self.lookup(&format!("{}{}", TOKEN_KEY_PREFIX, token)))
    }

    async fn delete(&self, token: &str) -> Result<()> {
        self.entries.remove(&format!("{}{}", TOKEN_KEY_PREFIX, token));
        Ok(())
    }

    async fn put_user_index(&self, email: &str, user_id: i64, ttl: Duration) -> Result<()> {
        self.insert(
            format!("{}{}", USER_KEY_PREFIX, email),
            &user_id.to_string(),
            ttl,
        );
        Ok(())
    }

    async fn delete_user_index(&self, email: &str) -> Result<()> {
        self.entries.remove(&format!("{}{}", USER_KEY_PREFIX, email));
        debug!(email, "removed user index entry");
        Ok(())
    }
}

//! Key-value operations with TTL

use super::pool::RedisPool;
use crate::utils::error::{GateError, Result};
use redis::AsyncCommands;

impl RedisPool {
    /// Get a value
    pub async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.connection.clone();
        let value: Option<String> = conn.get(key).await.map_err(GateError::Redis)?;
        Ok(value)
    }

    /// Set a key-value pair with optional TTL in seconds
    pub async fn set(&self, key: &str, value: &str, ttl: Option<u64>) -> Result<()> {
        let mut conn = self.connection.clone();
        if let Some(ttl_seconds) = ttl {
            let _: () = conn
                .set_ex(key, value, ttl_seconds)
                .await
                .map_err(GateError::Redis)?;
        } else {
            let _: () = conn.set(key, value).await.map_err(GateError::Redis)?;
        }
        Ok(())
    }

    /// Delete a key
    pub async fn delete(&self, key: &str) -> Result<()> {
        let mut conn = self.connection.clone();
        let _: () = conn.del(key).await.map_err(GateError::Redis)?;
        Ok(())
    }
}

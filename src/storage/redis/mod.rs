//! Redis storage implementation
//!
//! - `pool` - Connection pool and health checks
//! - `cache` - Key-value operations with TTL (get, set, delete)

mod cache;
mod pool;

pub use pool::RedisPool;

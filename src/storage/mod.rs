//! Storage layer
//!
//! Redis connectivity plus the session store used as the token
//! revocation/liveness oracle.

pub mod redis;
pub mod session;

pub use redis::RedisPool;
pub use session::{MemorySessionStore, RedisSessionStore, SessionStore};

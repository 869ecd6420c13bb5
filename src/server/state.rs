//! Application state shared across HTTP handlers

use crate::auth::{AuthGate, JwtCodec, MemoryUserDirectory, UserDirectory};
use crate::config::Config;
use crate::pipeline::{RequestPipeline, routes};
use crate::ratelimit::{RateLimiter, TokenBucket};
use crate::storage::SessionStore;
use crate::utils::error::Result;
use std::sync::Arc;
use std::time::Duration;

/// HTTP server state shared across handlers.
///
/// All gating components are wired here by explicit construction; handlers
/// and middleware reach them through `web::Data<AppState>`.
#[derive(Clone)]
pub struct AppState {
    /// Gateway configuration (shared read-only)
    pub config: Arc<Config>,
    /// Token issuance, revocation, and identity checks
    pub auth: Arc<AuthGate>,
    /// Account storage and credential verification
    pub directory: Arc<dyn UserDirectory>,
    /// The ordered gate chain applied to every request
    pub pipeline: Arc<RequestPipeline>,
}

impl AppState {
    /// Assemble the full gate chain on top of a session store.
    pub fn assemble(
        config: Config,
        sessions: Arc<dyn SessionStore>,
        directory: Arc<dyn UserDirectory>,
    ) -> Result<Self> {
        let codec = JwtCodec::new(&config.auth)?;
        let auth = Arc::new(AuthGate::new(
            codec,
            sessions,
            Duration::from_secs(config.auth.session_ttl_secs),
        ));

        let limiter = Arc::new(RateLimiter::new(
            TokenBucket::new(
                config.rate_limit.general.capacity,
                config.rate_limit.general.refill_per_sec,
            ),
            TokenBucket::new(
                config.rate_limit.auth.capacity,
                config.rate_limit.auth.refill_per_sec,
            ),
            routes::AUTH_PREFIX,
        ));

        let pipeline = Arc::new(RequestPipeline::new(limiter, Arc::clone(&auth)));

        Ok(Self {
            config: Arc::new(config),
            auth,
            directory,
            pipeline,
        })
    }

    /// Assemble with in-memory collaborators (tests, redis-disabled runs).
    pub fn assemble_in_memory(config: Config) -> Result<Self> {
        Self::assemble(
            config,
            Arc::new(crate::storage::MemorySessionStore::new()),
            Arc::new(MemoryUserDirectory::new()),
        )
    }
}

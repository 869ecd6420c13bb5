//! Token-bucket rate limiting
//!
//! Two independently tuned buckets guard inbound traffic: a general bucket
//! for API endpoints and a stricter one for authentication endpoints, so
//! credential brute-forcing is throttled harder than normal load. Buckets
//! refill lazily on each admission check; no background timer task.

use parking_lot::Mutex;
use std::time::Instant;
use tracing::debug;

/// Default capacity of the general API bucket.
pub const GENERAL_CAPACITY: u32 = 20;
/// Default refill rate of the general API bucket, tokens per second.
pub const GENERAL_REFILL_PER_SEC: f64 = 10.0;
/// Default capacity of the auth bucket. Always the stricter policy.
pub const AUTH_CAPACITY: u32 = 10;
/// Default refill rate of the auth bucket, tokens per second.
pub const AUTH_REFILL_PER_SEC: f64 = 5.0;

/// Fixed-capacity token pool with lazy refill.
///
/// Tokens are stored as `f64` so fractional accrual between checks is never
/// dropped; at low refill rates an integer counter would starve callers.
pub struct TokenBucket {
    capacity: f64,
    refill_per_sec: f64,
    state: Mutex<BucketState>,
}

struct BucketState {
    tokens: f64,
    last_refill: Instant,
}

impl TokenBucket {
    /// Create a bucket starting full.
    pub fn new(capacity: u32, refill_per_sec: f64) -> Self {
        Self {
            capacity: f64::from(capacity),
            refill_per_sec,
            state: Mutex::new(BucketState {
                tokens: f64::from(capacity),
                last_refill: Instant::now(),
            }),
        }
    }

    /// Attempt to consume `n` tokens; returns whether the request is admitted.
    ///
    /// Refill and consume happen under one lock so two concurrent callers can
    /// never both succeed on the last remaining token. The critical section is
    /// arithmetic only and never blocks.
    pub fn try_consume(&self, n: u32) -> bool {
        let needed = f64::from(n);
        let mut state = self.state.lock();

        let now = Instant::now();
        let elapsed = now.duration_since(state.last_refill).as_secs_f64();
        state.tokens = (state.tokens + elapsed * self.refill_per_sec).min(self.capacity);
        state.last_refill = now;

        if state.tokens >= needed {
            state.tokens -= needed;
            true
        } else {
            // No partial consumption on reject
            false
        }
    }

    /// Tokens currently available, after applying pending refill.
    pub fn available(&self) -> f64 {
        let mut state = self.state.lock();
        let now = Instant::now();
        let elapsed = now.duration_since(state.last_refill).as_secs_f64();
        state.tokens = (state.tokens + elapsed * self.refill_per_sec).min(self.capacity);
        state.last_refill = now;
        state.tokens
    }

    /// Maximum number of tokens the bucket can hold.
    pub fn capacity(&self) -> f64 {
        self.capacity
    }
}

/// Which bucket governs a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrafficClass {
    /// General API traffic.
    General,
    /// Authentication endpoints (login, register, logout).
    Auth,
}

/// Owns the two buckets and classifies requests by path prefix.
pub struct RateLimiter {
    general: TokenBucket,
    auth: TokenBucket,
    auth_prefix: String,
}

impl RateLimiter {
    pub fn new(general: TokenBucket, auth: TokenBucket, auth_prefix: impl Into<String>) -> Self {
        Self {
            general,
            auth,
            auth_prefix: auth_prefix.into(),
        }
    }

    /// Classify a request path into its traffic class.
    pub fn classify(&self, path: &str) -> TrafficClass {
        if path.starts_with(&self.auth_prefix) {
            TrafficClass::Auth
        } else {
            TrafficClass::General
        }
    }

    /// Admission check: consumes one token from the governing bucket.
    pub fn admit(&self, path: &str) -> bool {
        let class = self.classify(path);
        let admitted = match class {
            TrafficClass::Auth => self.auth.try_consume(1),
            TrafficClass::General => self.general.try_consume(1),
        };
        if !admitted {
            debug!(path, ?class, "rate limit rejection");
        }
        admitted
    }

    /// The bucket for a traffic class, for introspection.
    pub fn bucket(&self, class: TrafficClass) -> &TokenBucket {
        match class {
            TrafficClass::General => &self.general,
            TrafficClass::Auth => &self.auth,
        }
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(
            TokenBucket::new(GENERAL_CAPACITY, GENERAL_REFILL_PER_SEC),
            TokenBucket::new(AUTH_CAPACITY, AUTH_REFILL_PER_SEC),
            "/api/auth/",
        )
    }
}

//! The request gate chain
//!
//! One request walks an explicit, ordered sequence of admission gates:
//! rate limiter first, then either an auth-gate bypass or an authentication
//! check, then dispatch. The order is a hard contract: rate limiting runs
//! before authentication on every path, including bypassed ones, so
//! unauthenticated brute-force attempts are still throttled. Keeping the
//! chain framework-free makes that ordering directly testable.

pub mod routes;

use crate::auth::{AuthGate, RequestContext};
use crate::ratelimit::RateLimiter;
use std::sync::Arc;

/// Terminal outcome of gating one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Forward to the handler, with an identity when one was established.
    Dispatch(Option<RequestContext>),
    /// Reject with 429; the handler must not run.
    RateLimited,
    /// Reject with 401; the handler must not run.
    Unauthorized,
}

/// Ordered composition of the rate limiter and the auth gate.
pub struct RequestPipeline {
    limiter: Arc<RateLimiter>,
    auth: Arc<AuthGate>,
}

impl RequestPipeline {
    pub fn new(limiter: Arc<RateLimiter>, auth: Arc<AuthGate>) -> Self {
        Self { limiter, auth }
    }

    /// Evaluate the gate chain for one request.
    pub async fn evaluate(&self, path: &str, authorization: Option<&str>) -> Decision {
        // Gate 1: rate limit, unconditionally first
        if !self.limiter.admit(path) {
            return Decision::RateLimited;
        }

        // Gate 2: bypass set dispatches with no identity
        if routes::is_bypassed(path) {
            return Decision::Dispatch(None);
        }

        // Gate 3: authentication
        match self.auth.authenticate(authorization.unwrap_or_default()).await {
            Some(ctx) => Decision::Dispatch(Some(ctx)),
            None if routes::requires_auth(path) => Decision::Unauthorized,
            None => Decision::Dispatch(None),
        }
    }

    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    pub fn auth(&self) -> &AuthGate {
        &self.auth
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{JwtCodec, Role};
    use crate::config::AuthConfig;
    use crate::ratelimit::{TokenBucket, TrafficClass};
    use crate::storage::MemorySessionStore;
    use std::time::Duration;

    fn test_auth_gate() -> Arc<AuthGate> {
        let config = AuthConfig {
            jwt_secret: "test-secret-key-for-testing-only-0123456789".to_string(),
            jwt_expiration_ms: 86_400_000,
            session_ttl_secs: 86_400,
        };
        Arc::new(AuthGate::new(
            JwtCodec::new(&config).unwrap(),
            Arc::new(MemorySessionStore::new()),
            Duration::from_secs(86_400),
        ))
    }

    fn pipeline_with_buckets(general: TokenBucket, auth: TokenBucket) -> RequestPipeline {
        RequestPipeline::new(
            Arc::new(RateLimiter::new(general, auth, routes::AUTH_PREFIX)),
            test_auth_gate(),
        )
    }

    fn fresh_pipeline() -> RequestPipeline {
        pipeline_with_buckets(TokenBucket::new(20, 0.0), TokenBucket::new(10, 0.0))
    }

    #[tokio::test]
    async fn test_rate_check_precedes_bypass() {
        // Empty auth bucket: even the always-bypassed auth endpoints get 429,
        // proving the rate gate runs before the bypass check.
        let pipeline = pipeline_with_buckets(TokenBucket::new(20, 0.0), TokenBucket::new(0, 0.0));
        assert_eq!(
            pipeline.evaluate("/api/auth/login", None).await,
            Decision::RateLimited
        );
    }

    #[tokio::test]
    async fn test_auth_endpoints_bypass_auth_but_consume_auth_bucket() {
        let pipeline = fresh_pipeline();
        let before = pipeline.limiter().bucket(TrafficClass::Auth).available();

        let decision = pipeline.evaluate("/api/auth/login", None).await;
        assert_eq!(decision, Decision::Dispatch(None));
        assert_eq!(
            pipeline.limiter().bucket(TrafficClass::Auth).available(),
            before - 1.0
        );
        // General bucket untouched
        assert_eq!(pipeline.limiter().bucket(TrafficClass::General).available(), 20.0);
    }

    #[tokio::test]
    async fn test_non_auth_endpoints_consume_general_bucket() {
        let pipeline = fresh_pipeline();
        pipeline.evaluate("/api/users", None).await;
        assert_eq!(pipeline.limiter().bucket(TrafficClass::General).available(), 19.0);
        assert_eq!(pipeline.limiter().bucket(TrafficClass::Auth).available(), 10.0);
    }

    #[tokio::test]
    async fn test_protected_route_without_token_unauthorized() {
        let pipeline = fresh_pipeline();
        assert_eq!(
            pipeline.evaluate("/api/users", None).await,
            Decision::Unauthorized
        );
    }

    #[tokio::test]
    async fn test_public_route_dispatches_unauthenticated() {
        let pipeline = fresh_pipeline();
        assert_eq!(
            pipeline.evaluate("/api/hello", None).await,
            Decision::Dispatch(None)
        );
    }

    #[tokio::test]
    async fn test_live_token_attaches_identity() {
        let pipeline = fresh_pipeline();
        let token = pipeline
            .auth()
            .issue_session("a@x.com", Role::User)
            .await
            .unwrap();
        let header = format!("Bearer {}", token);

        let decision = pipeline.evaluate("/api/users/me", Some(&header)).await;
        match decision {
            Decision::Dispatch(Some(ctx)) => {
                assert_eq!(ctx.subject, "a@x.com");
                assert_eq!(ctx.role, Role::User);
            }
            other => panic!("expected dispatch with identity, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_revoked_token_unauthorized() {
        let pipeline = fresh_pipeline();
        let token = pipeline
            .auth()
            .issue_session("a@x.com", Role::User)
            .await
            .unwrap();
        let header = format!("Bearer {}", token);
        pipeline.auth().revoke(&token).await;

        assert_eq!(
            pipeline.evaluate("/api/users/me", Some(&header)).await,
            Decision::Unauthorized
        );
    }

    #[tokio::test]
    async fn test_public_route_attaches_identity_when_presented() {
        let pipeline = fresh_pipeline();
        let token = pipeline
            .auth()
            .issue_session("a@x.com", Role::User)
            .await
            .unwrap();
        let header = format!("Bearer {}", token);

        let decision = pipeline.evaluate("/api/hello", Some(&header)).await;
        assert!(matches!(decision, Decision::Dispatch(Some(_))));
    }

    #[tokio::test]
    async fn test_burst_split_25_requests() {
        let pipeline = fresh_pipeline();
        let mut dispatched = 0;
        let mut limited = 0;
        for _ in 0..25 {
            match pipeline.evaluate("/api/hello", None).await {
                Decision::Dispatch(_) => dispatched += 1,
                Decision::RateLimited => limited += 1,
                Decision::Unauthorized => panic!("public route must not 401"),
            }
        }
        assert_eq!(dispatched, 20);
        assert_eq!(limited, 5);
    }
}

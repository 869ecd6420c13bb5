//! Authentication: token issuance, revocation, and request identity
//!
//! The [`AuthGate`] combines the stateless JWT codec with the external
//! session store. A token is honored only while both agree: the signature
//! verifies, the expiry has not passed, and a session record still maps the
//! token to its embedded subject. Deleting the record revokes the token
//! even though its signature remains valid.

pub mod directory;
pub mod jwt;

pub use directory::{MemoryUserDirectory, NewUser, UserDirectory, UserRecord};
pub use jwt::{Claims, JwtCodec, Role};

use crate::storage::SessionStore;
use crate::utils::error::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Per-request identity, attached only after a successful liveness check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    pub subject: String,
    pub role: Role,
}

/// Orchestrates the JWT codec and the session store.
pub struct AuthGate {
    codec: JwtCodec,
    sessions: Arc<dyn SessionStore>,
    session_ttl: Duration,
}

impl AuthGate {
    pub fn new(codec: JwtCodec, sessions: Arc<dyn SessionStore>, session_ttl: Duration) -> Self {
        Self {
            codec,
            sessions,
            session_ttl,
        }
    }

    /// Issue a token and record its session.
    ///
    /// The caller (login/registration) is responsible for having verified
    /// credentials and subject uniqueness first.
    pub async fn issue_session(&self, subject: &str, role: Role) -> Result<String> {
        let token = self.codec.issue(subject, role)?;
        self.sessions
            .put(&token, subject, self.session_ttl)
            .await?;
        debug!(subject, "session issued");
        Ok(token)
    }

    /// Record the auxiliary email-to-id index alongside a session.
    pub async fn record_user_index(&self, email: &str, user_id: i64) -> Result<()> {
        self.sessions
            .put_user_index(email, user_id, self.session_ttl)
            .await
    }

    /// Revoke a token by deleting its session record. Best effort: the
    /// token's signature remains valid, but liveness checks fail from now on.
    pub async fn revoke(&self, token: &str) {
        if let Err(e) = self.sessions.delete(token).await {
            warn!(error = %e, "session delete failed during revoke");
        }
        // The user index entry shares the session's lifecycle
        if let Ok(claims) = self.codec.verify(token) {
            if let Err(e) = self.sessions.delete_user_index(&claims.sub).await {
                warn!(error = %e, "user index delete failed during revoke");
            }
        }
    }

    /// Whether a raw token is currently live.
    ///
    /// Live means: signature verifies, not expired, and the session store
    /// still maps the token to its embedded subject. Store failures and
    /// timeouts fail closed.
    pub async fn is_live(&self, token: &str) -> bool {
        self.live_claims(token).await.is_some()
    }

    /// Establish a request identity from an Authorization header value.
    ///
    /// Absent (not an error) unless the header carries a `Bearer ` token
    /// that is currently live.
    pub async fn authenticate(&self, authorization: &str) -> Option<RequestContext> {
        let token = JwtCodec::extract_token_from_header(authorization)?;
        let claims = self.live_claims(token).await?;
        Some(RequestContext {
            subject: claims.sub,
            role: claims.role,
        })
    }

    async fn live_claims(&self, token: &str) -> Option<Claims> {
        let claims = match self.codec.verify(token) {
            Ok(claims) => claims,
            Err(e) => {
                debug!(error = %e, "token rejected");
                return None;
            }
        };

        if let Err(e) = self.codec.check_expiry(&claims) {
            debug!(subject = %claims.sub, error = %e, "token rejected");
            return None;
        }

        match self.sessions.get(token).await {
            Ok(Some(subject)) if subject == claims.sub => Some(claims),
            Ok(_) => None,
            Err(e) => {
                // Degraded store: fail closed, keep serving
                warn!(error = %e, "session store unavailable, treating token as not live");
                None
            }
        }
    }

    /// The codec, for collaborators that only need token operations.
    pub fn codec(&self) -> &JwtCodec {
        &self.codec
    }
}

//! Core JWT codec implementation

use super::types::{Claims, JwtCodec, Role};
use crate::config::AuthConfig;
use crate::utils::error::{GateError, Result};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use tracing::debug;

impl JwtCodec {
    /// Create a new codec from configuration.
    ///
    /// The secret is read once here; it must never appear in logs.
    pub fn new(config: &AuthConfig) -> Result<Self> {
        let secret = config.jwt_secret.as_bytes();

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            algorithm: Algorithm::HS256,
            validity_secs: config.jwt_expiration_ms / 1000,
            issuer: "apigate".to_string(),
        })
    }

    /// Issue a signed token for a subject with the default validity.
    pub fn issue(&self, subject: &str, role: Role) -> Result<String> {
        self.issue_with_validity(subject, role, self.validity_secs)
    }

    /// Issue a signed token with an explicit validity in seconds.
    pub fn issue_with_validity(
        &self,
        subject: &str,
        role: Role,
        validity_secs: u64,
    ) -> Result<String> {
        self.issue_at(subject, role, validity_secs, now_secs())
    }

    pub(crate) fn issue_at(
        &self,
        subject: &str,
        role: Role,
        validity_secs: u64,
        issued_at: u64,
    ) -> Result<String> {
        let claims = Claims {
            sub: subject.to_string(),
            role,
            iat: issued_at,
            exp: issued_at + validity_secs,
            iss: self.issuer.clone(),
        };

        let header = Header::new(self.algorithm);
        let token = encode(&header, &claims, &self.encoding_key)
            .map_err(|_| GateError::internal("token signing failed"))?;

        debug!(subject, "issued token");
        Ok(token)
    }

    /// Verify a token's signature and structure, returning its claims.
    ///
    /// Expiry is deliberately not checked here; see [`JwtCodec::is_expired`].
    pub fn verify(&self, token: &str) -> Result<Claims> {
        let mut validation = Validation::new(self.algorithm);
        validation.set_issuer(&[&self.issuer]);
        validation.validate_exp = false;

        let token_data =
            decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
                match e.kind() {
                    ErrorKind::InvalidSignature => GateError::InvalidSignature,
                    _ => GateError::MalformedToken,
                }
            })?;

        Ok(token_data.claims)
    }

    /// Enforce the claims' expiry.
    pub fn check_expiry(&self, claims: &Claims) -> Result<()> {
        if now_secs() > claims.exp {
            Err(GateError::ExpiredToken)
        } else {
            Ok(())
        }
    }

    /// Whether the claims' expiry has passed.
    pub fn is_expired(&self, claims: &Claims) -> bool {
        self.check_expiry(claims).is_err()
    }

    /// Default validity in seconds used by [`JwtCodec::issue`].
    pub fn validity_secs(&self) -> u64 {
        self.validity_secs
    }

    /// Strip the `Bearer ` scheme prefix from an Authorization header value.
    pub fn extract_token_from_header(header: &str) -> Option<&str> {
        header.strip_prefix("Bearer ")
    }
}

pub(super) fn now_secs() -> u64 {
    chrono::Utc::now().timestamp().max(0) as u64
}

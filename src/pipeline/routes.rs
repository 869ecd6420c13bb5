//! Route classification for the gate chain

/// Path prefix for authentication endpoints. These are governed by the
/// stricter auth rate bucket and never pass through the auth gate.
pub const AUTH_PREFIX: &str = "/api/auth/";

/// Routes that skip the auth gate entirely: no identity is ever attached.
const BYPASSED_ROUTES: &[&str] = &[AUTH_PREFIX, "/api/health", "/api/info"];

/// Public routes that pass through the auth gate (identity is attached when
/// a live token is presented) but never reject for a missing one.
const PUBLIC_ROUTES: &[&str] = &["/api/hello"];

/// Whether a path skips authentication entirely.
pub fn is_bypassed(path: &str) -> bool {
    BYPASSED_ROUTES.iter().any(|route| path.starts_with(route))
}

/// Whether a path rejects unauthenticated requests with 401.
pub fn requires_auth(path: &str) -> bool {
    !is_bypassed(path) && !PUBLIC_ROUTES.iter().any(|route| path.starts_with(route))
}

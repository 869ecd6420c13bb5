//! JWT issuance and verification
//!
//! Stateless signing and verification of bearer tokens. Signature
//! verification and expiry are independent checks: a tampered token fails
//! on signature before its expiry is ever considered.

mod handler;
mod types;

#[cfg(test)]
mod tests;

pub use types::{Claims, JwtCodec, Role};

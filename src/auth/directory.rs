//! User directory: the opaque credential-verifier collaborator
//!
//! Account storage and password hashing live behind this trait; the gating
//! layer only needs "does this email/password pair belong to an account".
//! The in-memory implementation stands in for a relational store.

use crate::auth::jwt::Role;
use crate::utils::error::{GateError, Result};
use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::atomic::{AtomicI64, Ordering};

/// An account as seen by the gating layer. Never carries the password hash.
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: Role,
}

/// Registration input.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: Option<String>,
}

/// Account lookup and credential verification.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Create an account. Fails with `Conflict` if the email is taken.
    async fn register(&self, new_user: NewUser) -> Result<UserRecord>;

    /// Verify an email/password pair; absent means bad email or password.
    async fn verify_credentials(&self, email: &str, password: &str)
    -> Result<Option<UserRecord>>;

    /// All known accounts.
    async fn list(&self) -> Result<Vec<UserRecord>>;
}

struct StoredUser {
    record: UserRecord,
    password_hash: String,
}

/// In-memory directory keyed by email.
#[derive(Default)]
pub struct MemoryUserDirectory {
    users: DashMap<String, StoredUser>,
    next_id: AtomicI64,
}

impl MemoryUserDirectory {
    pub fn new() -> Self {
        Self {
            users: DashMap::new(),
            next_id: AtomicI64::new(1),
        }
    }
}

#[async_trait]
impl UserDirectory for MemoryUserDirectory {
    async fn register(&self, new_user: NewUser) -> Result<UserRecord> {
        if self.users.contains_key(&new_user.email) {
            return Err(GateError::conflict(format!(
                "Email already exists: {}",
                new_user.email
            )));
        }

        let record = UserRecord {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            name: new_user.name,
            email: new_user.email.clone(),
            phone: new_user.phone,
            role: Role::User,
        };
        let stored = StoredUser {
            record: record.clone(),
            password_hash: hash_password(&new_user.password)?,
        };

        // A racing duplicate registration loses here
        match self.users.entry(new_user.email) {
            dashmap::mapref::entry::Entry::Occupied(entry) => Err(GateError::conflict(format!(
                "Email already exists: {}",
                entry.key()
            ))),
            dashmap::mapref::entry::Entry::Vacant(entry) => {
                entry.insert(stored);
                Ok(record)
            }
        }
    }

    async fn verify_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<UserRecord>> {
        let Some(stored) = self.users.get(email) else {
            return Ok(None);
        };
        if verify_password(password, &stored.password_hash)? {
            Ok(Some(stored.record.clone()))
        } else {
            Ok(None)
        }
    }

    async fn list(&self) -> Result<Vec<UserRecord>> {
        let mut records: Vec<UserRecord> =
            self.users.iter().map(|e| e.record.clone()).collect();
        records.sort_by_key(|r| r.id);
        Ok(records)
    }
}

fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| GateError::credential(e.to_string()))
}

fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let parsed = PasswordHash::new(hash).map_err(|e| GateError::credential(e.to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user(email: &str) -> NewUser {
        NewUser {
            name: "Ada".to_string(),
            email: email.to_string(),
            password: "correct horse battery".to_string(),
            phone: None,
        }
    }

    #[tokio::test]
    async fn test_register_and_verify() {
        let dir = MemoryUserDirectory::new();
        let record = dir.register(sample_user("a@x.com")).await.unwrap();
        assert_eq!(record.role, Role::User);
        assert_eq!(record.id, 1);

        let verified = dir
            .verify_credentials("a@x.com", "correct horse battery")
            .await
            .unwrap();
        assert!(verified.is_some());

        let rejected = dir.verify_credentials("a@x.com", "wrong").await.unwrap();
        assert!(rejected.is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let dir = MemoryUserDirectory::new();
        dir.register(sample_user("a@x.com")).await.unwrap();
        let result = dir.register(sample_user("a@x.com")).await;
        assert!(matches!(result, Err(GateError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_unknown_email_absent() {
        let dir = MemoryUserDirectory::new();
        let verified = dir.verify_credentials("ghost@x.com", "pw").await.unwrap();
        assert!(verified.is_none());
    }

    #[tokio::test]
    async fn test_list_ordered_by_id() {
        let dir = MemoryUserDirectory::new();
        dir.register(sample_user("a@x.com")).await.unwrap();
        dir.register(sample_user("b@x.com")).await.unwrap();
        let records = dir.list().await.unwrap();
        assert_eq!(records.len(), 2);
        assert!(records[0].id < records[1].id);
    }
}

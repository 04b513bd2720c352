//! # Users
//!
//! User accounts and their repository. Accounts persist in the `users`
//! collection log next to the student records.

use std::collections::HashMap;
use std::path::Path;
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::crypto::{hash_password, verify_password, PasswordPolicy};
use super::errors::{AuthError, AuthResult};
use crate::storage::{LogWriter, StorageError, StorageResult};

/// Log file name (without extension) for user accounts
pub const USERS_COLLECTION: &str = "users";

/// A stored account. Serialized only to the log, never to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    /// Trimmed and lower-cased
    pub email: String,
    /// Argon2id PHC string
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(email: &str, password: &str, policy: &PasswordPolicy) -> AuthResult<Self> {
        policy.validate(password)?;

        Ok(Self {
            id: Uuid::new_v4(),
            email: canonical_email(email),
            password_hash: hash_password(password)?,
            created_at: Utc::now(),
        })
    }

    pub fn verify_password(&self, password: &str) -> AuthResult<bool> {
        verify_password(password, &self.password_hash)
    }

    pub fn public(&self) -> PublicUser {
        PublicUser {
            id: self.id,
            email: self.email.clone(),
        }
    }
}

/// What clients see of an account
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublicUser {
    pub id: Uuid,
    pub email: String,
}

/// Body of register and login requests. Fields are optional so that a
/// missing one is reported by name.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

pub fn canonical_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub trait UserRepository: Send + Sync {
    fn find_by_email(&self, email: &str) -> AuthResult<Option<User>>;

    /// Fails with `EmailAlreadyExists` when the email is taken.
    fn create(&self, user: &User) -> AuthResult<()>;

    fn count(&self) -> AuthResult<u64>;

    fn close(&self) -> AuthResult<()>;
}

/// User repository over the `users` collection log
pub struct UserDirectory {
    inner: RwLock<Accounts>,
}

#[derive(Default)]
struct Accounts {
    by_email: HashMap<String, User>,
    log: Option<LogWriter>,
}

impl UserDirectory {
    pub fn in_memory() -> Self {
        Self {
            inner: RwLock::new(Accounts::default()),
        }
    }

    /// Opens and replays `<data_dir>/data/users.dat`.
    pub fn open(data_dir: &Path) -> StorageResult<Self> {
        let (writer, live) = LogWriter::open_and_replay(data_dir, USERS_COLLECTION)?;

        let mut by_email = HashMap::with_capacity(live.len());
        for (document_id, body) in live {
            let user: User = serde_json::from_slice(&body).map_err(|e| {
                StorageError::corruption_for_document(&document_id, e.to_string())
            })?;
            if by_email.insert(user.email.clone(), user).is_some() {
                return Err(StorageError::corruption_for_document(
                    &document_id,
                    "duplicate email",
                ));
            }
        }

        Ok(Self {
            inner: RwLock::new(Accounts {
                by_email,
                log: Some(writer),
            }),
        })
    }
}

fn poisoned<T>(_: T) -> AuthError {
    AuthError::StorageError("Lock poisoned".to_string())
}

impl UserRepository for UserDirectory {
    fn find_by_email(&self, email: &str) -> AuthResult<Option<User>> {
        let accounts = self.inner.read().map_err(poisoned)?;
        Ok(accounts.by_email.get(&canonical_email(email)).cloned())
    }

    fn create(&self, user: &User) -> AuthResult<()> {
        let mut accounts = self.inner.write().map_err(poisoned)?;

        if accounts.by_email.contains_key(&user.email) {
            return Err(AuthError::EmailAlreadyExists);
        }

        if let Some(log) = accounts.log.as_mut() {
            let body = serde_json::to_vec(user)
                .map_err(|e| AuthError::StorageError(e.to_string()))?;
            log.put(&user.id.to_string(), body)?;
        }

        accounts.by_email.insert(user.email.clone(), user.clone());
        Ok(())
    }

    fn count(&self) -> AuthResult<u64> {
        Ok(self.inner.read().map_err(poisoned)?.by_email.len() as u64)
    }

    fn close(&self) -> AuthResult<()> {
        let mut accounts = self.inner.write().map_err(poisoned)?;
        if let Some(mut log) = accounts.log.take() {
            log.sync()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn user(email: &str) -> User {
        User::new(email, "secret1", &PasswordPolicy::default()).unwrap()
    }

    #[test]
    fn test_email_is_canonicalized() {
        let user = user("  Ada@Example.COM ");
        assert_eq!(user.email, "ada@example.com");
        assert!(user.verify_password("secret1").unwrap());
    }

    #[test]
    fn test_duplicate_email_rejected() {
        let directory = UserDirectory::in_memory();
        directory.create(&user("a@x.com")).unwrap();

        assert!(matches!(
            directory.create(&user("A@X.com")),
            Err(AuthError::EmailAlreadyExists)
        ));
        assert_eq!(directory.count().unwrap(), 1);
    }

    #[test]
    fn test_lookup_ignores_case() {
        let directory = UserDirectory::in_memory();
        directory.create(&user("a@x.com")).unwrap();

        assert!(directory.find_by_email(" A@X.COM").unwrap().is_some());
        assert!(directory.find_by_email("b@x.com").unwrap().is_none());
    }

    #[test]
    fn test_public_view_hides_hash() {
        let json = serde_json::to_value(user("a@x.com").public()).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["email"], "a@x.com");
    }

    #[test]
    fn test_accounts_survive_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let created = user("a@x.com");
        {
            let directory = UserDirectory::open(temp_dir.path()).unwrap();
            directory.create(&created).unwrap();
            directory.close().unwrap();
        }

        let directory = UserDirectory::open(temp_dir.path()).unwrap();
        assert_eq!(directory.find_by_email("a@x.com").unwrap(), Some(created));
    }
}

// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! User lookup collaborator and password digest service.
//!
//! The authentication middleware only depends on the [`UserStore`] trait;
//! the backing storage is a deployment concern. Lookups never expose the
//! password digest and always exclude soft-deleted records.

use std::collections::HashMap;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::ApiError;

// =============================================================================
// UserRecord
// =============================================================================

/// A user as seen by the authentication pipeline.
///
/// Password and soft-delete markers are stripped before the record leaves
/// the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    /// User identifier.
    pub id: String,
    /// User email address.
    pub email: String,
    /// User role, upper-case.
    pub role: String,
}

/// Input for creating a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Display name.
    pub username: String,
    /// Email address, unique per user.
    pub email: String,
    /// Role, normalized to upper-case on insert.
    pub role: String,
    /// Argon2 password digest produced by [`PasswordService::hash`].
    pub password_digest: String,
}

// =============================================================================
// UserStore
// =============================================================================

/// User lookup collaborator.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Finds a non-deleted user by email.
    async fn find_by_email(&self, email: &str) -> Option<UserRecord>;

    /// Finds a non-deleted user by id.
    async fn find_by_id(&self, id: &str) -> Option<UserRecord>;

    /// Finds a non-deleted user by email together with its password digest.
    ///
    /// Only the login flow may call this; everything downstream of
    /// authentication sees [`UserRecord`] without the digest.
    async fn find_with_password(&self, email: &str) -> Option<(UserRecord, String)>;

    /// Inserts a new user; fails with a conflict if the email is taken.
    async fn insert(&self, user: NewUser) -> Result<UserRecord, ApiError>;
}

// =============================================================================
// MemoryUserStore
// =============================================================================

#[derive(Debug, Clone)]
struct StoredUser {
    id: String,
    username: String,
    email: String,
    role: String,
    password_digest: String,
    deleted: bool,
}

impl StoredUser {
    fn record(&self) -> UserRecord {
        UserRecord {
            id: self.id.clone(),
            email: self.email.clone(),
            role: self.role.clone(),
        }
    }
}

/// In-memory user store, keyed by email.
///
/// Backs tests and the demo binary; production deployments implement
/// [`UserStore`] over their database.
#[derive(Debug, Default)]
pub struct MemoryUserStore {
    users: RwLock<HashMap<String, StoredUser>>,
}

impl MemoryUserStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a user as soft-deleted.
    pub async fn soft_delete(&self, email: &str) -> bool {
        let mut users = self.users.write().await;
        match users.get_mut(email) {
            Some(user) => {
                user.deleted = true;
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_email(&self, email: &str) -> Option<UserRecord> {
        let users = self.users.read().await;
        users
            .get(email)
            .filter(|user| !user.deleted)
            .map(StoredUser::record)
    }

    async fn find_by_id(&self, id: &str) -> Option<UserRecord> {
        let users = self.users.read().await;
        users
            .values()
            .find(|user| user.id == id && !user.deleted)
            .map(StoredUser::record)
    }

    async fn find_with_password(&self, email: &str) -> Option<(UserRecord, String)> {
        let users = self.users.read().await;
        users
            .get(email)
            .filter(|user| !user.deleted)
            .map(|user| (user.record(), user.password_digest.clone()))
    }

    async fn insert(&self, user: NewUser) -> Result<UserRecord, ApiError> {
        let mut users = self.users.write().await;
        if users.contains_key(&user.email) {
            return Err(ApiError::conflict(format!(
                "users with email {} already exists",
                user.email
            )));
        }

        let stored = StoredUser {
            id: generate_user_id(),
            username: user.username,
            email: user.email.clone(),
            role: user.role.to_uppercase(),
            password_digest: user.password_digest,
            deleted: false,
        };
        let record = stored.record();
        tracing::debug!(user_id = %record.id, username = %stored.username, "User created");
        users.insert(user.email, stored);
        Ok(record)
    }
}

/// Generates a 25-character user identifier.
fn generate_user_id() -> String {
    let hex = Uuid::now_v7().simple().to_string();
    format!("c{}", &hex[..24])
}

// =============================================================================
// PasswordService
// =============================================================================

/// Opaque password digest service.
///
/// The rest of the system only sees `hash(password) -> digest` and
/// `verify(password, digest) -> bool`.
#[derive(Debug, Clone, Default)]
pub struct PasswordService;

impl PasswordService {
    /// Creates the service.
    pub fn new() -> Self {
        Self
    }

    /// Hashes a password with a fresh salt.
    pub fn hash(&self, password: &str) -> Result<String, ApiError> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|err| ApiError::internal(format!("Password hashing failed: {}", err)))
    }

    /// Verifies a password against a stored digest.
    ///
    /// An unparsable digest verifies as false rather than erroring; the
    /// caller cannot distinguish it from a wrong password.
    pub fn verify(&self, password: &str, digest: &str) -> bool {
        match PasswordHash::new(digest) {
            Ok(parsed) => Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok(),
            Err(_) => false,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

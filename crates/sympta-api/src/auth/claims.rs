// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Identity claims embedded in tokens.

use serde::{Deserialize, Serialize};

use super::error::AuthError;
use crate::users::UserRecord;

/// Length of a user identifier (cuid).
const USER_ID_LEN: usize = 25;

/// Maximum accepted email length.
const EMAIL_MAX_LEN: usize = 255;

/// Roles a token may carry.
const VALID_ROLES: [&str; 2] = ["ADMIN", "USER"];

// =============================================================================
// TokenClaims
// =============================================================================

/// The decrypted identity payload embedded in a token.
///
/// Created at login/refresh time, consumed and discarded per-request by the
/// authentication middleware. Must pass [`TokenClaims::validate`] before it
/// is trusted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TokenClaims {
    /// User identifier.
    pub id: String,
    /// User email address.
    pub email: String,
    /// User role, upper-case.
    pub role: String,
}

impl TokenClaims {
    /// Creates claims with the role normalized to upper-case.
    pub fn new(
        id: impl Into<String>,
        email: impl Into<String>,
        role: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            role: role.into().to_uppercase(),
        }
    }

    /// Creates claims from a user record.
    pub fn from_user(user: &UserRecord) -> Self {
        Self::new(&user.id, &user.email, &user.role)
    }

    /// Deserializes and validates a decrypted payload.
    pub fn from_value(value: serde_json::Value) -> Result<Self, AuthError> {
        let claims: Self = serde_json::from_value(value)
            .map_err(|err| AuthError::InvalidPayload(err.to_string()))?;
        claims.validate()?;
        Ok(claims)
    }

    /// Validates the claims against the token payload schema.
    ///
    /// The id must be exactly 25 characters, the email well-formed and at
    /// most 255 characters, and the role one of the declared role names.
    pub fn validate(&self) -> Result<(), AuthError> {
        if self.id.len() != USER_ID_LEN {
            return Err(AuthError::InvalidPayload(format!(
                "invalid length id must be equal {}",
                USER_ID_LEN
            )));
        }

        if self.email.is_empty() || self.email.len() > EMAIL_MAX_LEN {
            return Err(AuthError::InvalidPayload(
                "email must have between 1 and 255 characters".to_string(),
            ));
        }
        if !is_valid_email(&self.email) {
            return Err(AuthError::InvalidPayload("invalid format email".to_string()));
        }

        if !VALID_ROLES.contains(&self.role.as_str()) {
            return Err(AuthError::InvalidPayload(format!(
                "the role must be one of {:?}",
                VALID_ROLES
            )));
        }

        Ok(())
    }
}

/// Minimal structural email check: non-empty local part and a dotted domain.
fn is_valid_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    }
}

// =============================================================================
// Tests
// =============================================================================

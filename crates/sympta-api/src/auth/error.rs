// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Error taxonomy for the token pipeline.
//!
//! Each stage of the authentication pipeline fails with its own kind so the
//! middleware can report which stage rejected a request without nesting
//! handlers.

use thiserror::Error;

use crate::error::ApiError;

/// Errors produced by the token pipeline and the authorization checks.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Token signing failed.
    #[error("Token signing failed: {0}")]
    Signing(String),

    /// Signature verification failed for any reason other than expiration.
    #[error("Token verification failed: {0}")]
    InvalidSignature(String),

    /// The token's expiration claim is in the past.
    ///
    /// Kept distinct from [`AuthError::InvalidSignature`] so clients can
    /// auto-refresh on expiry but not on tampering.
    #[error("Token has been expired")]
    TokenExpired,

    /// Payload encryption failed.
    #[error("Payload encryption failed: {0}")]
    Encryption(String),

    /// Payload decryption failed.
    ///
    /// Malformed ciphertext, a wrong key and a failed authentication tag are
    /// reported identically.
    #[error("Token decryption failed")]
    Decryption,

    /// The decrypted payload does not match the token claims schema.
    #[error("Invalid token payload: {0}")]
    InvalidPayload(String),

    /// No user record matches the token's identity claims.
    #[error("User not found or invalid")]
    UserNotFound,

    /// The user's role does not satisfy the route's required role.
    #[error("Access denied. Required role: {required}")]
    AccessDenied {
        /// The role the matched route rule requires.
        required: String,
    },

    /// The Authorization header is missing or not a bearer token.
    #[error("Missing or invalid authorization token")]
    MissingToken,
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingToken => {
                ApiError::unauthorized("Missing or invalid authorization token")
            }
            AuthError::TokenExpired => ApiError::unauthorized("Token has been expired"),
            AuthError::InvalidSignature(detail) => {
                ApiError::unauthorized(format!("Token verification failed: {}", detail))
            }
            AuthError::Decryption => ApiError::unauthorized("Token decryption failed"),
            AuthError::InvalidPayload(_) => ApiError::unauthorized("Invalid token payload"),
            AuthError::UserNotFound => ApiError::unauthorized("User not found or invalid"),
            AuthError::AccessDenied { required } => {
                ApiError::forbidden(format!("Access denied. Required role: {}", required))
            }
            // Issuance-side failures never carry their cause to the client.
            AuthError::Signing(_) | AuthError::Encryption(_) => {
                ApiError::unauthorized("Authentication failed")
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_expired_maps_to_unauthorized() {
        let api: ApiError = AuthError::TokenExpired.into();
        assert_eq!(api.status_code(), StatusCode::UNAUTHORIZED);
        assert!(api.detail().contains("expired"));
    }

    #[test]
    fn test_access_denied_maps_to_forbidden() {
        let api: ApiError = AuthError::AccessDenied {
            required: "ADMIN".to_string(),
        }
        .into();
        assert_eq!(api.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(api.error_code(), "FORBIDDEN");
        assert!(api.detail().contains("ADMIN"));
    }

    #[test]
    fn test_decryption_detail_is_uniform() {
        let api: ApiError = AuthError::Decryption.into();
        assert_eq!(api.detail(), "Token decryption failed");
    }

    #[test]
    fn test_issuance_errors_stay_generic() {
        let api: ApiError = AuthError::Signing("key mismatch".to_string()).into();
        assert_eq!(api.detail(), "Authentication failed");
    }
}

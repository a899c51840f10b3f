// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Compact signed tokens (JWS).

use std::time::SystemTime;

use chrono::{Duration, Utc};
use josekit::jws::alg::eddsa::{EddsaJwsAlgorithm, EddsaJwsSigner, EddsaJwsVerifier};
use josekit::jws::JwsHeader;
use josekit::jwt::{self, JwtPayload};
use serde_json::{Map, Value};

use super::error::AuthError;
use super::keys::KeyPair;

// =============================================================================
// TokenSigner
// =============================================================================

/// Produces and validates compact signed tokens for one key pair.
///
/// Signing uses the pair's private key; verification is restricted to the
/// configured algorithm and the pair's public key. Two signers exist per
/// deployment (access and refresh), each bound to its own key pair so
/// possession of one token kind cannot forge the other.
pub struct TokenSigner {
    issuer: String,
    signer: EddsaJwsSigner,
    verifier: EddsaJwsVerifier,
}

impl TokenSigner {
    /// Creates a signer/verifier for the given signing key pair.
    pub fn new(keys: &KeyPair, issuer: impl Into<String>) -> Result<Self, AuthError> {
        let signer = EddsaJwsAlgorithm::Eddsa
            .signer_from_jwk(&keys.private_key)
            .map_err(|err| AuthError::Signing(err.to_string()))?;
        let verifier = EddsaJwsAlgorithm::Eddsa
            .verifier_from_jwk(&keys.public_key)
            .map_err(|err| AuthError::Signing(err.to_string()))?;

        Ok(Self {
            issuer: issuer.into(),
            signer,
            verifier,
        })
    }

    /// Returns the configured issuer name.
    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// Generates a signed compact token.
    ///
    /// The token carries the given claims plus `iss`, `iat` and `exp`
    /// (now + `ttl`).
    pub fn generate_token(
        &self,
        claims: Map<String, Value>,
        ttl: Duration,
    ) -> Result<String, AuthError> {
        let mut payload = JwtPayload::new();
        for (name, value) in claims {
            payload
                .set_claim(&name, Some(value))
                .map_err(|err| AuthError::Signing(err.to_string()))?;
        }

        let now = Utc::now();
        payload.set_issuer(&self.issuer);
        payload.set_issued_at(&SystemTime::from(now));
        payload.set_expires_at(&SystemTime::from(now + ttl));

        let mut header = JwsHeader::new();
        header.set_token_type("JWT");

        jwt::encode_with_signer(&payload, &header, &self.signer)
            .map_err(|err| AuthError::Signing(err.to_string()))
    }

    /// Verifies a compact token and returns its payload.
    ///
    /// Signature verification happens before any claim is inspected. An
    /// expired token is reported as [`AuthError::TokenExpired`]; every other
    /// failure (malformed token, wrong key, tampered payload, algorithm
    /// mismatch) as [`AuthError::InvalidSignature`].
    pub fn verify_token(&self, token: &str) -> Result<JwtPayload, AuthError> {
        let (payload, _header) = jwt::decode_with_verifier(token, &self.verifier)
            .map_err(|err| AuthError::InvalidSignature(err.to_string()))?;

        let expires_at = payload
            .expires_at()
            .ok_or_else(|| AuthError::InvalidSignature("missing expiration claim".to_string()))?;
        if SystemTime::now() >= expires_at {
            return Err(AuthError::TokenExpired);
        }

        Ok(payload)
    }
}

impl std::fmt::Debug for TokenSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSigner")
            .field("issuer", &self.issuer)
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================

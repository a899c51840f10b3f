// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Access and refresh token issuance.

use chrono::Duration;
use josekit::jwt::JwtPayload;
use serde_json::{Map, Value};

use super::claims::TokenClaims;
use super::error::AuthError;
use super::jwe::PayloadCipher;
use super::jws::TokenSigner;
use super::keys::KeyMaterial;
use crate::users::UserStore;

/// Outer claim carrying the encrypted identity payload.
const DATA_CLAIM: &str = "data";

// =============================================================================
// TokenIssuer
// =============================================================================

/// Issues access and refresh tokens.
///
/// Each token is produced by encrypting the identity claims with the JWE
/// pair and signing `{"data": <ciphertext>}` with the kind's own JWS pair.
/// Access and refresh tokens use independent signing pairs, so a leaked
/// refresh token cannot be used to mint an access token signature and vice
/// versa. Refresh tokens are never persisted server-side; expiry is their
/// only invalidation mechanism.
pub struct TokenIssuer {
    cipher: PayloadCipher,
    access: TokenSigner,
    refresh: TokenSigner,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenIssuer {
    /// Creates an issuer from its parts.
    pub fn new(
        cipher: PayloadCipher,
        access: TokenSigner,
        refresh: TokenSigner,
        access_ttl: Duration,
        refresh_ttl: Duration,
    ) -> Self {
        Self {
            cipher,
            access,
            refresh,
            access_ttl,
            refresh_ttl,
        }
    }

    /// Creates an issuer from loaded key material.
    pub fn from_key_material(
        keys: &KeyMaterial,
        issuer_name: &str,
        access_ttl: Duration,
        refresh_ttl: Duration,
    ) -> Result<Self, AuthError> {
        Ok(Self::new(
            PayloadCipher::new(&keys.encryption)?,
            TokenSigner::new(&keys.access, issuer_name)?,
            TokenSigner::new(&keys.refresh, issuer_name)?,
            access_ttl,
            refresh_ttl,
        ))
    }

    /// Issues a short-lived access token for the given identity.
    pub fn issue_access_token(&self, identity: &TokenClaims) -> Result<String, AuthError> {
        self.issue(&self.access, self.access_ttl, identity)
    }

    /// Issues a long-lived refresh token for the given identity.
    pub fn issue_refresh_token(&self, identity: &TokenClaims) -> Result<String, AuthError> {
        self.issue(&self.refresh, self.refresh_ttl, identity)
    }

    fn issue(
        &self,
        signer: &TokenSigner,
        ttl: Duration,
        identity: &TokenClaims,
    ) -> Result<String, AuthError> {
        let ciphertext = self.cipher.encrypt_payload(identity)?;

        let mut claims = Map::new();
        claims.insert(DATA_CLAIM.to_string(), Value::String(ciphertext));

        signer.generate_token(claims, ttl)
    }

    /// Verifies a compact access token's signature and expiration.
    pub fn verify_access_token(&self, token: &str) -> Result<JwtPayload, AuthError> {
        self.access.verify_token(token)
    }

    /// Decrypts the identity payload embedded in a verified token.
    pub fn decrypt_token_payload(&self, payload: &JwtPayload) -> Result<Value, AuthError> {
        let ciphertext = payload
            .claim(DATA_CLAIM)
            .and_then(Value::as_str)
            .ok_or(AuthError::Decryption)?;

        self.cipher.decrypt_payload(ciphertext)
    }

    /// Exchanges a still-valid refresh token for a new access token.
    ///
    /// The refresh token itself is not rotated; calling this twice with the
    /// same token yields two independently valid access tokens. Fails with
    /// [`AuthError::TokenExpired`] when the refresh token's signature
    /// verification reports expiration and [`AuthError::UserNotFound`] when
    /// the identity no longer resolves.
    pub async fn refresh(
        &self,
        refresh_token: &str,
        users: &dyn UserStore,
    ) -> Result<String, AuthError> {
        let payload = self.refresh.verify_token(refresh_token)?;
        let decrypted = self.decrypt_token_payload(&payload)?;
        let claims = TokenClaims::from_value(decrypted)?;

        let user = users
            .find_by_email(&claims.email)
            .await
            .ok_or(AuthError::UserNotFound)?;

        self.issue_access_token(&TokenClaims::from_user(&user))
    }
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("issuer", &self.access.issuer())
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================

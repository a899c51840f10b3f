// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Compact encrypted payloads (JWE).

use josekit::jwe::alg::ecdh_es::{
    EcdhEsJweAlgorithm, EcdhEsJweDecrypter, EcdhEsJweEncrypter,
};
use josekit::jwe::{deserialize_compact, serialize_compact, JweHeader};
use serde::Serialize;
use serde_json::Value;

use super::error::AuthError;
use super::keys::KeyPair;

/// Content-encryption algorithm for all payloads.
const CONTENT_ENCRYPTION: &str = "A256GCM";

// =============================================================================
// PayloadCipher
// =============================================================================

/// Encrypts and decrypts JSON payloads as compact JWE strings.
///
/// Sensitive identity claims are wrapped with this cipher before being
/// embedded in a signed token, so the claims are confidential even though
/// the outer token is only signed.
pub struct PayloadCipher {
    encrypter: EcdhEsJweEncrypter,
    decrypter: EcdhEsJweDecrypter,
}

impl PayloadCipher {
    /// Creates a cipher for the given key-agreement pair.
    pub fn new(keys: &KeyPair) -> Result<Self, AuthError> {
        let encrypter = EcdhEsJweAlgorithm::EcdhEsA256kw
            .encrypter_from_jwk(&keys.public_key)
            .map_err(|err| AuthError::Encryption(err.to_string()))?;
        let decrypter = EcdhEsJweAlgorithm::EcdhEsA256kw
            .decrypter_from_jwk(&keys.private_key)
            .map_err(|err| AuthError::Encryption(err.to_string()))?;

        Ok(Self {
            encrypter,
            decrypter,
        })
    }

    /// Serializes `payload` to JSON and encrypts it to a compact JWE string.
    pub fn encrypt_payload<T: Serialize>(&self, payload: &T) -> Result<String, AuthError> {
        let plaintext =
            serde_json::to_vec(payload).map_err(|err| AuthError::Encryption(err.to_string()))?;

        let mut header = JweHeader::new();
        header.set_content_encryption(CONTENT_ENCRYPTION);

        serialize_compact(&plaintext, &header, &self.encrypter)
            .map_err(|err| AuthError::Encryption(err.to_string()))
    }

    /// Decrypts a compact JWE string and parses the plaintext as JSON.
    ///
    /// A malformed ciphertext, a wrong key and a failed authentication tag
    /// all surface as the same [`AuthError::Decryption`]; the distinction is
    /// deliberately not observable.
    pub fn decrypt_payload(&self, ciphertext: &str) -> Result<Value, AuthError> {
        let (plaintext, _header) =
            deserialize_compact(ciphertext, &self.decrypter).map_err(|_| AuthError::Decryption)?;

        serde_json::from_slice(&plaintext).map_err(|_| AuthError::Decryption)
    }
}

impl std::fmt::Debug for PayloadCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PayloadCipher").finish()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::TokenClaims;

    fn test_cipher() -> PayloadCipher {
        let keys = KeyPair::generate_encryption().unwrap();
        PayloadCipher::new(&keys).unwrap()
    }

    #[test]
    fn test_round_trip() {
        let cipher = test_cipher();
        let claims = TokenClaims::new("c000000000000000000000001", "alice@example.com", "USER");

        let ciphertext = cipher.encrypt_payload(&claims).unwrap();
        assert_eq!(ciphertext.split('.').count(), 5);

        let value = cipher.decrypt_payload(&ciphertext).unwrap();
        assert_eq!(TokenClaims::from_value(value).unwrap(), claims);
    }

    #[test]
    fn test_ciphertexts_are_unique() {
        // ECDH-ES uses an ephemeral key per encryption, so encrypting the
        // same payload twice must not produce the same string.
        let cipher = test_cipher();
        let claims = TokenClaims::new("c000000000000000000000001", "alice@example.com", "USER");

        let a = cipher.encrypt_payload(&claims).unwrap();
        let b = cipher.encrypt_payload(&claims).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_tampered_ciphertext_fails_uniformly() {
        let cipher = test_cipher();
        let claims = TokenClaims::new("c000000000000000000000001", "alice@example.com", "USER");
        let ciphertext = cipher.encrypt_payload(&claims).unwrap();

        // Flip one character inside the ciphertext segment.
        let mut parts: Vec<String> = ciphertext.split('.').map(String::from).collect();
        let segment = &mut parts[3];
        let flipped = if segment.as_bytes()[0] == b'A' { "B" } else { "A" };
        segment.replace_range(0..1, flipped);
        let tampered = parts.join(".");

        assert!(matches!(
            cipher.decrypt_payload(&tampered),
            Err(AuthError::Decryption)
        ));
    }

    #[test]
    fn test_wrong_key_fails_uniformly() {
        let cipher_a = test_cipher();
        let cipher_b = test_cipher();
        let claims = TokenClaims::new("c000000000000000000000001", "alice@example.com", "USER");

        let ciphertext = cipher_a.encrypt_payload(&claims).unwrap();
        assert!(matches!(
            cipher_b.decrypt_payload(&ciphertext),
            Err(AuthError::Decryption)
        ));
    }

    #[test]
    fn test_malformed_input_fails_uniformly() {
        let cipher = test_cipher();
        assert!(matches!(
            cipher.decrypt_payload("garbage"),
            Err(AuthError::Decryption)
        ));
    }
}

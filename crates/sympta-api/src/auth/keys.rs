// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! JWK key material loading.
//!
//! Three asymmetric key pairs are read from JWK files at process startup:
//! one EdDSA pair for signing access tokens, one EdDSA pair for signing
//! refresh tokens and one ECDH-ES pair for encrypting identity payloads.
//! A missing or malformed file is a fatal startup error; the loaded keys
//! are immutable for the process lifetime.

use std::fs;
use std::path::{Path, PathBuf};

use josekit::jwk::alg::ec::{EcCurve, EcKeyPair};
use josekit::jwk::alg::ed::{EdCurve, EdKeyPair};
use josekit::jwk::{Jwk, KeyPair as _};
use thiserror::Error;
use tracing::info;

/// Signing algorithm for access and refresh tokens.
pub const SIGNING_ALGORITHM: &str = "EdDSA";

/// Key-agreement algorithm for payload encryption.
pub const ENCRYPTION_ALGORITHM: &str = "ECDH-ES+A256KW";

/// JWK file names, one pair per cryptographic purpose.
pub const ACCESS_PRIVATE_KEY_FILE: &str = "jws-access-token-key-private.json";
/// Public half of the access-token signing pair.
pub const ACCESS_PUBLIC_KEY_FILE: &str = "jws-access-token-key-public.json";
/// Private half of the refresh-token signing pair.
pub const REFRESH_PRIVATE_KEY_FILE: &str = "jws-refresh-token-key-private.json";
/// Public half of the refresh-token signing pair.
pub const REFRESH_PUBLIC_KEY_FILE: &str = "jws-refresh-token-key-public.json";
/// Private half of the payload encryption pair.
pub const JWE_PRIVATE_KEY_FILE: &str = "jwe-key-private.json";
/// Public half of the payload encryption pair.
pub const JWE_PUBLIC_KEY_FILE: &str = "jwe-key-public.json";

// =============================================================================
// KeyError
// =============================================================================

/// Errors raised while loading key material.
#[derive(Debug, Error)]
pub enum KeyError {
    /// A key file could not be read.
    #[error("Failed to read key file {path}: {source}")]
    Io {
        /// The file that could not be read.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A key file is not a valid JWK document.
    #[error("Failed to parse key file {path}: {source}")]
    Parse {
        /// The file that could not be parsed.
        path: PathBuf,
        /// The underlying JOSE error.
        #[source]
        source: josekit::JoseError,
    },

    /// Key generation failed.
    #[error("Failed to generate key pair: {0}")]
    Generate(#[source] josekit::JoseError),
}

// =============================================================================
// KeyPair
// =============================================================================

/// An asymmetric key pair bound to one cryptographic purpose.
#[derive(Debug, Clone)]
pub struct KeyPair {
    /// Private half, used for signing or decryption.
    pub private_key: Jwk,
    /// Public half, used for verification or encryption.
    pub public_key: Jwk,
    /// Algorithm the pair is restricted to.
    pub algorithm: String,
}

impl KeyPair {
    /// Loads a key pair from two JWK files.
    pub fn load(
        dir: &Path,
        private_file: &str,
        public_file: &str,
        algorithm: &str,
    ) -> Result<Self, KeyError> {
        Ok(Self {
            private_key: read_jwk(&dir.join(private_file))?,
            public_key: read_jwk(&dir.join(public_file))?,
            algorithm: algorithm.to_string(),
        })
    }

    /// Generates a fresh EdDSA (Ed25519) signing pair.
    pub fn generate_signing() -> Result<Self, KeyError> {
        let pair = EdKeyPair::generate(EdCurve::Ed25519).map_err(KeyError::Generate)?;
        Ok(Self {
            private_key: pair.to_jwk_private_key(),
            public_key: pair.to_jwk_public_key(),
            algorithm: SIGNING_ALGORITHM.to_string(),
        })
    }

    /// Generates a fresh ECDH-ES (P-256) encryption pair.
    pub fn generate_encryption() -> Result<Self, KeyError> {
        let pair = EcKeyPair::generate(EcCurve::P256).map_err(KeyError::Generate)?;
        Ok(Self {
            private_key: pair.to_jwk_private_key(),
            public_key: pair.to_jwk_public_key(),
            algorithm: ENCRYPTION_ALGORITHM.to_string(),
        })
    }
}

// =============================================================================
// KeyMaterial
// =============================================================================

/// The full set of key pairs the token pipeline needs.
///
/// Loaded once at startup and shared read-only for the process lifetime;
/// rotating keys requires a restart.
#[derive(Debug, Clone)]
pub struct KeyMaterial {
    /// Access-token signing pair.
    pub access: KeyPair,
    /// Refresh-token signing pair, independent from the access pair.
    pub refresh: KeyPair,
    /// Payload encryption pair.
    pub encryption: KeyPair,
}

impl KeyMaterial {
    /// Loads all key pairs from the given directory.
    pub fn load(dir: &Path) -> Result<Self, KeyError> {
        info!(dir = %dir.display(), "Loading key material");

        let material = Self {
            access: KeyPair::load(
                dir,
                ACCESS_PRIVATE_KEY_FILE,
                ACCESS_PUBLIC_KEY_FILE,
                SIGNING_ALGORITHM,
            )?,
            refresh: KeyPair::load(
                dir,
                REFRESH_PRIVATE_KEY_FILE,
                REFRESH_PUBLIC_KEY_FILE,
                SIGNING_ALGORITHM,
            )?,
            encryption: KeyPair::load(
                dir,
                JWE_PRIVATE_KEY_FILE,
                JWE_PUBLIC_KEY_FILE,
                ENCRYPTION_ALGORITHM,
            )?,
        };

        info!("Key material loaded");
        Ok(material)
    }

    /// Generates ephemeral key material.
    ///
    /// Used by the key generation tool and by tests; production deployments
    /// load persisted keys with [`KeyMaterial::load`].
    pub fn generate() -> Result<Self, KeyError> {
        Ok(Self {
            access: KeyPair::generate_signing()?,
            refresh: KeyPair::generate_signing()?,
            encryption: KeyPair::generate_encryption()?,
        })
    }
}

fn read_jwk(path: &Path) -> Result<Jwk, KeyError> {
    let bytes = fs::read(path).map_err(|source| KeyError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    Jwk::from_bytes(&bytes).map_err(|source| KeyError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

// =============================================================================
// Tests
// =============================================================================

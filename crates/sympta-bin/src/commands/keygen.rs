// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `keygen` command.
//!
//! Generates the three key pairs the token pipeline needs and writes the
//! six JWK files into the key directory.

use std::fs;
use std::path::Path;

use josekit::jwk::Jwk;

use sympta_api::auth::{keys, KeyMaterial};

use crate::cli::{Cli, KeygenArgs};
use crate::error::{BinError, BinResult};

/// Executes the `keygen` command.
pub fn keygen(_cli: &Cli, args: KeygenArgs) -> BinResult<()> {
    fs::create_dir_all(&args.out_dir)?;

    let material = KeyMaterial::generate()?;
    let files: [(&str, &Jwk); 6] = [
        (keys::ACCESS_PRIVATE_KEY_FILE, &material.access.private_key),
        (keys::ACCESS_PUBLIC_KEY_FILE, &material.access.public_key),
        (keys::REFRESH_PRIVATE_KEY_FILE, &material.refresh.private_key),
        (keys::REFRESH_PUBLIC_KEY_FILE, &material.refresh.public_key),
        (keys::JWE_PRIVATE_KEY_FILE, &material.encryption.private_key),
        (keys::JWE_PUBLIC_KEY_FILE, &material.encryption.public_key),
    ];

    for (filename, _) in &files {
        let path = args.out_dir.join(filename);
        if path.exists() && !args.force {
            return Err(BinError::config(format!(
                "{} already exists (use --force to overwrite)",
                path.display()
            )));
        }
    }

    for (filename, jwk) in files {
        let path = args.out_dir.join(filename);
        write_jwk(&path, jwk)?;
        println!("Key saved at: {}", path.display());
    }

    Ok(())
}

fn write_jwk(path: &Path, jwk: &Jwk) -> BinResult<()> {
    let json = serde_json::to_vec_pretty(jwk)
        .map_err(|err| BinError::init(format!("Failed to serialize JWK: {}", err)))?;
    fs::write(path, json)?;
    Ok(())
}

// =============================================================================
// Tests
// =============================================================================

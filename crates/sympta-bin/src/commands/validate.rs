// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `validate` command.

use chrono::Duration;

use sympta_api::auth::{KeyMaterial, RoleHierarchy, RoutePolicy, TokenIssuer};

use crate::cli::{Cli, ValidateArgs};
use crate::error::BinResult;

/// Executes the `validate` command.
///
/// Loads the key material and builds the whole auth pipeline without
/// starting the server, so a broken deployment fails here instead of at
/// first request.
pub fn validate(_cli: &Cli, args: ValidateArgs) -> BinResult<()> {
    let keys = KeyMaterial::load(&args.keys_dir)?;
    println!("Key material: ok ({})", args.keys_dir.display());

    TokenIssuer::from_key_material(
        &keys,
        "sympta-validate",
        Duration::minutes(5),
        Duration::days(7),
    )?;
    println!("Token pipeline: ok");

    let policy = RoutePolicy::default_table();
    println!("Route policy: ok ({} rules)", policy.len());

    let hierarchy = RoleHierarchy::default_hierarchy();
    println!("Role hierarchy: ok ({} roles)", hierarchy.roles().len());

    Ok(())
}

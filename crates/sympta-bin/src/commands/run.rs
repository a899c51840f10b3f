// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `run` command.

use std::sync::Arc;

use tracing::info;

use sympta_api::auth::KeyMaterial;
use sympta_api::{ApiConfig, ApiServer, AppState, MemoryUserStore, TokenIssuer};

use crate::cli::{Cli, RunArgs};
use crate::error::BinResult;

/// Executes the `run` command to start the API server.
pub async fn run(_cli: &Cli, args: RunArgs) -> BinResult<()> {
    info!("Starting Sympta API server...");

    let config = build_config(&args);

    // Key material is the only fatal startup dependency.
    let keys = KeyMaterial::load(&config.keys_dir)?;
    let issuer = TokenIssuer::from_key_material(
        &keys,
        &config.issuer,
        config.access_ttl(),
        config.refresh_ttl(),
    )?;

    let state = AppState::builder()
        .config(config)
        .issuer(Arc::new(issuer))
        .users(Arc::new(MemoryUserStore::new()))
        .build()?;

    let server = ApiServer::new(state);
    info!("Sympta API is ready ({})", server.addr());

    server.run_with_shutdown(shutdown_signal()).await?;
    Ok(())
}

fn build_config(args: &RunArgs) -> ApiConfig {
    let mut config = ApiConfig::default()
        .with_keys_dir(&args.keys_dir)
        .with_production(args.production);

    if let Some(host) = args.host {
        config = config.with_host(host);
    }
    if let Some(port) = args.port {
        config = config.with_port(port);
    }
    if let Some(issuer) = &args.issuer {
        config = config.with_issuer(issuer.clone());
    }
    if let Some(secs) = args.access_ttl_secs {
        config = config.with_access_ttl(secs);
    }
    if let Some(secs) = args.refresh_ttl_secs {
        config = config.with_refresh_ttl(secs);
    }

    config
}

/// Resolves when SIGINT is received.
async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Failed to install shutdown signal handler");
        return;
    }
    info!("Shutdown signal received");
}

// =============================================================================
// Tests
// =============================================================================

// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! CLI argument parsing and command definitions.
//!
//! Subcommands:
//!
//! - `run`: Start the API server (default)
//! - `keygen`: Generate the JWK key files
//! - `validate`: Validate key material and auth configuration
//! - `version`: Show version information

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// =============================================================================
// Main CLI Structure
// =============================================================================

/// Sympta - symptom/disease diagnosis REST API.
#[derive(Parser, Debug)]
#[command(
    name = "sympta",
    author = "Sylvex <contact@sylvex.io>",
    version = sympta_api::VERSION,
    about = "Symptom/disease diagnosis REST API server",
    long_about = None,
    propagate_version = true
)]
pub struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(
        short,
        long,
        default_value = "info",
        env = "SYMPTA_LOG_LEVEL",
        global = true
    )]
    pub log_level: String,

    /// Log format (text, json, compact)
    #[arg(long, default_value = "text", env = "SYMPTA_LOG_FORMAT", global = true)]
    pub log_format: LogFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Log output format.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable text output.
    Text,
    /// JSON output for log aggregation.
    Json,
    /// Minimal compact output.
    Compact,
}

// =============================================================================
// Subcommands
// =============================================================================

/// Available subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start the API server
    ///
    /// This is the default command when no subcommand is specified.
    Run(RunArgs),

    /// Generate the JWK key files
    ///
    /// Writes the access-token, refresh-token and payload-encryption key
    /// pairs as JWK files into the key directory.
    Keygen(KeygenArgs),

    /// Validate key material and auth configuration
    ///
    /// Loads the key files and builds the token pipeline without starting
    /// the server. Useful for checking a deployment before rollout.
    Validate(ValidateArgs),

    /// Show version information
    Version,
}

impl Default for Commands {
    fn default() -> Self {
        Commands::Run(RunArgs::default())
    }
}

// =============================================================================
// Command Arguments
// =============================================================================

/// Arguments for the `run` command.
#[derive(Args, Debug, Default, Clone)]
pub struct RunArgs {
    /// Host address to bind
    #[arg(long, env = "SYMPTA_HOST")]
    pub host: Option<std::net::IpAddr>,

    /// Port to bind
    #[arg(short, long, env = "SYMPTA_PORT")]
    pub port: Option<u16>,

    /// Directory holding the JWK key files
    #[arg(long, default_value = "cert", env = "SYMPTA_KEYS_DIR")]
    pub keys_dir: PathBuf,

    /// Token issuer name
    #[arg(long, env = "JWT_AUTH_NAME")]
    pub issuer: Option<String>,

    /// Access token lifetime in seconds
    #[arg(long, env = "SYMPTA_ACCESS_TTL_SECS")]
    pub access_ttl_secs: Option<i64>,

    /// Refresh token lifetime in seconds
    #[arg(long, env = "SYMPTA_REFRESH_TTL_SECS")]
    pub refresh_ttl_secs: Option<i64>,

    /// Mark the deployment as production (Secure refresh cookie)
    #[arg(long, env = "SYMPTA_PRODUCTION")]
    pub production: bool,
}

/// Arguments for the `keygen` command.
#[derive(Args, Debug, Clone)]
pub struct KeygenArgs {
    /// Output directory for the key files
    #[arg(long, default_value = "cert", env = "SYMPTA_KEYS_DIR")]
    pub out_dir: PathBuf,

    /// Overwrite existing key files
    #[arg(long)]
    pub force: bool,
}

/// Arguments for the `validate` command.
#[derive(Args, Debug, Clone)]
pub struct ValidateArgs {
    /// Directory holding the JWK key files
    #[arg(long, default_value = "cert", env = "SYMPTA_KEYS_DIR")]
    pub keys_dir: PathBuf,
}

// =============================================================================
// Tests
// =============================================================================

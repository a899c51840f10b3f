// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Sympta - symptom/disease diagnosis API server.
//!
//! Main binary entry point.

mod cli;
mod commands;
mod error;
mod logging;

use clap::Parser;

use crate::cli::{Cli, Commands};
use crate::error::report_error_and_exit;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    logging::init_logging(&cli.log_level, cli.log_format);

    let result = match cli.command.clone().unwrap_or_default() {
        Commands::Run(args) => commands::run(&cli, args).await,
        Commands::Keygen(args) => commands::keygen(&cli, args),
        Commands::Validate(args) => commands::validate(&cli, args),
        Commands::Version => commands::version(&cli),
    };

    if let Err(error) = result {
        report_error_and_exit(error);
    }
}

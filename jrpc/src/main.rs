//! # Jrpc CLI Entry Point
//!
//! The main executable for the jrpc tool. This file drives the application lifecycle:
//!
//! 1. **Initialization**: Parses command-line arguments using [`cli::Cli`] and sets up logging.
//! 2. **Execution**: Delegates the call to [`crate::core::run`], which builds a proxy over HTTP.
//! 3. **Presentation**: Formats and prints the result or the error to standard output/error.
//!
//! Logging goes to standard error and is controlled with `RUST_LOG` (e.g. `RUST_LOG=jrpc_core=debug`).
mod cli;
mod core;
mod formatter;

use clap::Parser;
use cli::{Cli, Commands};
use crate::core::{CallParams, Input};
use formatter::{FormattedString, GenericError};
use std::{process, time::Duration};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "jrpc=warn,jrpc_core=warn".into()),
        )
        .init();

    let args = Cli::parse();

    match args.command {
        Commands::Call {
            method,
            params,
            named,
            headers,
            timeout,
        } => {
            let params = if named.is_empty() {
                CallParams::ByPosition(params)
            } else {
                CallParams::ByName(named)
            };

            let input = Input {
                url: args.url,
                method,
                params,
                headers,
                timeout: timeout.map(Duration::from_secs),
            };

            run_call(input).await;
        }
    }
}

async fn run_call(input: Input) {
    match crate::core::run(input).await {
        Ok(Ok(value)) => println!("{}", FormattedString::from(value)),
        Ok(Err(err)) => {
            eprintln!("{}", FormattedString::from(err));
            process::exit(1);
        }
        Err(err) => {
            eprintln!("{}", FormattedString::from(GenericError("Setup Failed", format!("{err:#}"))));
            process::exit(1);
        }
    }
}

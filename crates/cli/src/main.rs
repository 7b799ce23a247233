//! Siteulation command-line tools.
//!
//! Drives the client core from a terminal: seed and inspect the durable
//! local cache, debug route resolution, and open a path end to end (with
//! the usual remote-first, local-fallback behavior).

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::print_stdout)]

mod commands;

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "siteulation", version, about = "Siteulation client tools")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Seed the local cache with a demo account and project.
    Seed {
        /// Account handle to create.
        #[arg(long, default_value = "demo")]
        username: String,
        /// Account password.
        #[arg(long, default_value = "demo-pass")]
        password: String,
    },
    /// Print a summary of the local cache record.
    Inspect,
    /// Resolve a path against the route table without rendering.
    Resolve {
        /// Path to resolve, e.g. `/@demo/my-site`.
        path: String,
    },
    /// Bootstrap the app and open a path, printing the resulting view.
    Open {
        /// Target to open, e.g. `/` or `/@demo/my-site?version=1`.
        target: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "siteulation=info,siteulation_client=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Command::Seed { username, password } => commands::seed::run(&username, &password),
        Command::Inspect => commands::inspect::run(),
        Command::Resolve { path } => commands::resolve::run(&path),
        Command::Open { target } => commands::open::run(&target).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

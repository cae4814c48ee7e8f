//! Operator command line for the Agentrix / PayMind payments API.
//!
//! # Usage
//!
//! ```bash
//! # List recent payments
//! AGENTRIX_API_KEY=sk_live_... agentrix payments list --limit 10
//!
//! # Talk to PayMind instead
//! agentrix --brand paymind --api-key sk_... agents show-grant
//!
//! # Search the agent marketplace
//! agentrix marketplace search "coffee beans" --limit 5
//!
//! # Check a webhook delivery offline
//! agentrix webhook verify --payload-file body.json --signature 3f2a... --secret whsec_...
//!
//! # Read-only checks against a live deployment
//! RUST_LOG=debug agentrix smoke
//! ```
//!
//! # Environment Variables
//!
//! - `AGENTRIX_*` / `PAYMIND_*` - `API_KEY`, `BASE_URL`, `TIMEOUT_SECS`,
//!   `RETRIES`, `WEBHOOK_SECRET` for the selected brand; flags win, and
//!   `--api-key` replaces only the key
//! - `RUST_LOG` - Log level filter (default: `info`)
//!
//! A `.env` file in the working directory is loaded first.

mod cli;
mod commands;
mod error;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;
use crate::error::CliError;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // Logs go to stderr so stdout stays machine-readable
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        if let CliError::Smoke { report, .. } = &e {
            print_json(report);
        }
        tracing::error!("{e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let output = commands::execute(cli.command, &cli.connection).await?;
    print_json(&output);
    Ok(())
}

#[allow(clippy::print_stdout)]
fn print_json(value: &serde_json::Value) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{text}"),
        Err(_) => println!("{value}"),
    }
}

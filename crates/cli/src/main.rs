//! Three Words CLI - database migrations.
//!
//! # Usage
//!
//! ```bash
//! # Apply pending migrations
//! threewords-cli migrate
//!
//! # List applied and pending migrations
//! threewords-cli migrate --status
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "threewords-cli")]
#[command(author, version, about = "Three Words CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate {
        /// Only report which migrations are applied
        #[arg(long)]
        status: bool,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::migrate::MigrationError> {
    match cli.command {
        Commands::Migrate { status: true } => commands::migrate::status().await,
        Commands::Migrate { status: false } => commands::migrate::run().await,
    }
}

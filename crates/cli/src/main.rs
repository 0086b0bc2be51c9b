//! Aurelia Joyería CLI - operator commands.
//!
//! # Usage
//!
//! ```bash
//! # Create the session table used by the storefront and admin
//! aurelia-cli migrate
//!
//! # Grant or revoke admin access
//! aurelia-cli admin promote -e ana@aurelia.mx
//! aurelia-cli admin demote -e ana@aurelia.mx
//!
//! # Insert products from a YAML file
//! aurelia-cli seed products -f crates/cli/seed/products.yaml
//!
//! # Print current gold and dollar quotes
//! aurelia-cli prices
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` - `PostgreSQL` for the session table (`migrate`)
//! - `BACKEND_URL`, `BACKEND_ANON_KEY`, `BACKEND_SERVICE_ROLE_KEY` - hosted
//!   backend (`admin`, `seed`)
//! - `GOLD_API_KEY`, `GOLD_API_URL`, `FX_API_URL` - quote providers (`prices`)

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "aurelia-cli")]
#[command(author, version, about = "Aurelia Joyería operator tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the session table
    Migrate,
    /// Manage administrator roles
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
    /// Load data into the backend
    Seed {
        #[command(subcommand)]
        target: SeedTarget,
    },
    /// Print current market prices as JSON
    Prices,
}

#[derive(Subcommand)]
enum AdminAction {
    /// Give a user the admin role
    Promote {
        /// Email of an existing account
        #[arg(short, long)]
        email: String,
    },
    /// Return an admin to the customer role
    Demote {
        /// Email of an existing account
        #[arg(short, long)]
        email: String,
    },
}

#[derive(Subcommand)]
enum SeedTarget {
    /// Insert products from a YAML file
    Products {
        /// Path to the YAML file
        #[arg(short, long)]
        file: String,
    },
}

#[tokio::main]
async fn main() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "aurelia_cli=info,aurelia_backend=info".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    match cli.command {
        Commands::Migrate => commands::migrate::sessions().await?,
        Commands::Admin { action } => match action {
            AdminAction::Promote { email } => commands::admin::promote(&email).await?,
            AdminAction::Demote { email } => commands::admin::demote(&email).await?,
        },
        Commands::Seed { target } => match target {
            SeedTarget::Products { file } => {
                commands::seed::products(&file).await?;
            }
        },
        Commands::Prices => commands::prices::print().await?,
    }
    Ok(())
}

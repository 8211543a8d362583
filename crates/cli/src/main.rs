//! Juniper CLI - Catalog maintenance and admin management tools.
//!
//! # Usage
//!
//! ```bash
//! # Check platform reachability
//! juniper-cli check
//!
//! # List catalog products
//! juniper-cli products list --category Jeans
//!
//! # Seed the catalog with sample products
//! juniper-cli products seed
//!
//! # Grant the admin flag to an account
//! juniper-cli grant-admin -e admin@example.com
//! ```
//!
//! # Commands
//!
//! - `check` - Verify the platform is reachable
//! - `products list` - List catalog products
//! - `products seed` - Insert sample catalog rows
//! - `grant-admin` - Set the admin flag on a profile

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "juniper-cli")]
#[command(author, version, about = "Juniper CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Verify the platform is reachable
    Check,
    /// Manage catalog products
    Products {
        #[command(subcommand)]
        action: ProductAction,
    },
    /// Grant the admin flag to an account
    GrantAdmin {
        /// Account email address
        #[arg(short, long)]
        email: String,
    },
}

#[derive(Subcommand)]
enum ProductAction {
    /// List catalog products
    List {
        /// Only list products in this category
        #[arg(short, long)]
        category: Option<String>,
        /// Maximum number of products to list
        #[arg(short, long)]
        limit: Option<u32>,
    },
    /// Insert sample catalog rows
    Seed,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Check => commands::check::run().await?,
        Commands::Products { action } => match action {
            ProductAction::List { category, limit } => {
                commands::products::list(category, limit).await?;
            }
            ProductAction::Seed => commands::products::seed().await?,
        },
        Commands::GrantAdmin { email } => commands::admin::grant(&email).await?,
    }
    Ok(())
}

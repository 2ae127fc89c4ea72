//! Bazaar CLI - a command-line view over the storefront session.
//!
//! # Usage
//!
//! ```bash
//! # Log in and export the token for later commands
//! bazaar login alice
//! export BAZAAR_TOKEN=<printed token>
//!
//! # Browse the catalog
//! bazaar items --search lap --category all
//!
//! # Cart and checkout
//! bazaar add 5
//! bazaar cart
//! bazaar checkout
//! bazaar orders
//! ```
//!
//! # Credential handling
//!
//! The CLI does not store the token; `login` prints it and each invocation
//! reads `BAZAAR_PASSWORD` / `BAZAAR_TOKEN` from the environment and
//! injects them at the session boundary.

#![cfg_attr(not(test), forbid(unsafe_code))]
// User-facing command output goes to stdout/stderr by design.
#![allow(clippy::print_stdout)]
#![allow(clippy::print_stderr)]

use clap::{Parser, Subcommand};
use secrecy::SecretString;

use bazaar_storefront::config::ClientConfig;
use bazaar_storefront::session::Session;

mod commands;

#[derive(Parser)]
#[command(name = "bazaar")]
#[command(author, version, about = "Bazaar storefront command-line client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and print the bearer token for export
    Login {
        /// Username
        username: String,

        /// Password (defaults to the BAZAAR_PASSWORD environment variable)
        #[arg(short, long, env = "BAZAAR_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// List catalog items, optionally filtered
    Items {
        /// Case-insensitive substring to match against item names
        #[arg(short, long, default_value = "")]
        search: String,

        /// Category token ("all" disables category filtering)
        #[arg(short, long, default_value = "all")]
        category: String,
    },
    /// Add an item to the cart
    Add {
        /// Item ID
        item_id: i64,
    },
    /// Show the current cart
    Cart,
    /// Convert the cart into an order
    Checkout,
    /// Show order history
    Orders,
}

#[tokio::main]
async fn main() {
    // Load .env before anything reads the environment
    dotenvy::dotenv().ok();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "bazaar=warn".into());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();

    if let Err(err) = run(cli).await {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = ClientConfig::from_env()?;
    let session = Session::new(config)?;

    // Token storage is external to the session; inject it if present.
    if let Ok(token) = std::env::var("BAZAAR_TOKEN") {
        session.attach_token(SecretString::from(token));
    }

    match cli.command {
        Commands::Login { username, password } => {
            commands::login(&session, &username, SecretString::from(password)).await
        }
        Commands::Items { search, category } => {
            commands::items(&session, &search, &category).await
        }
        Commands::Add { item_id } => commands::add(&session, item_id.into()).await,
        Commands::Cart => commands::cart(&session).await,
        Commands::Checkout => commands::checkout(&session).await,
        Commands::Orders => commands::orders(&session).await,
    }
}

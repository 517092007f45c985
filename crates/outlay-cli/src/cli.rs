//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI
//! arguments. The actual command implementations are in the `commands`
//! module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Outlay - Track expenses and keep budgets honest
#[derive(Parser)]
#[command(name = "outlay")]
#[command(about = "Self-hosted expense and budget tracker", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path
    #[arg(long, default_value = "outlay.db", global = true)]
    pub db: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable database encryption (not recommended for production)
    ///
    /// By default, the database is encrypted using SQLCipher.
    /// Set OUTLAY_DB_KEY environment variable with your passphrase.
    /// Use --no-encrypt only for development or testing.
    #[arg(long, global = true)]
    pub no_encrypt: bool,

    /// User whose records the local commands operate on
    ///
    /// The web API derives this from authentication headers; local commands
    /// default to the identity unauthenticated server requests are filed
    /// under.
    #[arg(long, default_value = "local-dev", global = true)]
    pub user: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database
    Init,

    /// Start the web server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Disable authentication (for local development only)
        ///
        /// WARNING: Do not use this flag when exposing the server to a
        /// network. By default, the server requires Cloudflare Access
        /// authentication headers or an API key.
        #[arg(long)]
        no_auth: bool,

        /// Directory containing static files to serve (e.g., ui/dist)
        #[arg(long)]
        static_dir: Option<PathBuf>,
    },

    /// Show database status (encryption, size, record counts)
    Status,

    /// Show budget status for a month (defaults to the current month)
    Budgets {
        /// Month (1-12)
        #[arg(short, long)]
        month: Option<u32>,

        /// Year
        #[arg(short, long)]
        year: Option<i32>,
    },

    /// List the most recent expenses
    Expenses {
        /// Number of expenses to show
        #[arg(short, long, default_value = "20")]
        limit: i64,
    },

    /// Show spending statistics for a month
    Stats {
        /// Month (1-12)
        #[arg(short, long)]
        month: Option<u32>,

        /// Year
        #[arg(short, long)]
        year: Option<i32>,
    },
}

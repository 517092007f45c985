//! Outlay CLI - expense and budget tracker
//!
//! Usage:
//!   outlay init                 Initialize database
//!   outlay serve --port 3000    Start web server
//!   outlay budgets --month 3    Show budget status for a month
//!   outlay expenses             List recent expenses

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    match cli.command {
        Commands::Init => commands::cmd_init(&cli.db, cli.no_encrypt),
        Commands::Serve {
            port,
            host,
            no_auth,
            static_dir,
        } => {
            commands::cmd_serve(
                &cli.db,
                &host,
                port,
                no_auth,
                cli.no_encrypt,
                static_dir.as_deref(),
            )
            .await
        }
        Commands::Status => commands::cmd_status(&cli.db, cli.no_encrypt),
        Commands::Budgets { month, year } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_budgets_status(&db, &cli.user, month, year)
        }
        Commands::Expenses { limit } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_expenses_list(&db, &cli.user, limit)
        }
        Commands::Stats { month, year } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_expense_stats(&db, &cli.user, month, year)
        }
    }
}

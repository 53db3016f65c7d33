//! # Dokan Storefront
//!
//! Command-line storefront over the Dokan database.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Storefront CLI                                   │
//! │                                                                         │
//! │  env (DOKAN_*) ──► StoreConfig ◄── --db / --locale flags                │
//! │                        │                                                │
//! │                        ▼                                                │
//! │  Database::new ──► Context::execute(command) ──► render / --json        │
//! │                        │                                                │
//! │                        ▼                                                │
//! │        Storefront (catalog + live sales ──► resolve_price)              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Examples
//! ```bash
//! storefront catalog --category sarees
//! storefront --locale bn product HM-NKQ-003
//! storefront sales
//! storefront checkout --customer cust-1 --item GR-TEA-500:2 --coupon WELCOME100
//! ```

mod commands;
mod config;
mod error;
mod render;

use chrono::Utc;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use dokan_core::Locale;
use dokan_db::{Database, DbConfig};

use crate::commands::{Command, Context};
use crate::config::StoreConfig;
use crate::error::AppResult;

#[derive(Debug, Parser)]
#[command(name = "storefront", version, about = "Dokan storefront")]
struct Cli {
    /// Database file (overrides DOKAN_DB_PATH).
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Display language: en or bn (overrides DOKAN_LOCALE).
    #[arg(long, global = true)]
    locale: Option<Locale>,

    /// Print JSON instead of text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(error = %err, "Command failed");
            eprintln!("{}", err.user_message());
            ExitCode::from(err.exit_code())
        }
    }
}

async fn run(cli: Cli) -> AppResult<String> {
    let mut config = StoreConfig::from_env()?;
    if let Some(db) = cli.db {
        config.db_path = db;
    }
    if let Some(locale) = cli.locale {
        config.locale = locale;
    }

    info!(
        db = %config.db_path.display(),
        locale = %config.locale,
        "Configuration loaded"
    );

    let db = Database::new(
        DbConfig::new(&config.db_path).max_connections(config.max_connections),
    )
    .await?;

    let ctx = Context {
        db,
        config,
        json: cli.json,
        now: Utc::now(),
    };

    let result = ctx.execute(&cli.command).await;
    ctx.db.close().await;
    result
}

/// Logs go to stderr so `--json` output stays clean on stdout.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,dokan=info,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

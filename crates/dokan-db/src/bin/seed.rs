//! # Seed Data Loader
//!
//! Populates the database with a bilingual demo catalog.
//!
//! ## Usage
//! ```bash
//! # Bundled demo catalog into ./dokan.db
//! cargo run -p dokan-db --bin seed
//!
//! # Custom fixture file and database
//! cargo run -p dokan-db --bin seed -- --db ./data/dokan.db --fixtures ./my-catalog.json
//! ```
//!
//! The demo catalog has four categories, a store-wide festival sale, a
//! category sale on sarees, a six-hour flash sale and a sale that starts in
//! two days.

use chrono::Utc;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use dokan_db::seed::CatalogFixture;
use dokan_db::{Database, DbConfig};

#[derive(Debug, Parser)]
#[command(name = "seed", about = "Load a demo catalog into the Dokan database")]
struct Args {
    /// Database file path.
    #[arg(short, long, env = "DOKAN_DB_PATH", default_value = "./dokan.db")]
    db: PathBuf,

    /// JSON fixture file (defaults to the bundled demo catalog).
    #[arg(short, long)]
    fixtures: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let args = Args::parse();

    println!("🌱 Dokan Seed Loader");
    println!("====================");
    println!("Database: {}", args.db.display());
    println!();

    let catalog = match &args.fixtures {
        Some(path) => CatalogFixture::from_json(&std::fs::read_to_string(path)?)?,
        None => CatalogFixture::demo()?,
    };

    let db = Database::new(DbConfig::new(&args.db)).await?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let report = catalog.apply(&db, Utc::now()).await?;

    println!();
    println!("✓ {} categories", report.categories);
    println!("✓ {} products", report.products);
    println!("✓ {} sales", report.sales);
    println!("✓ {} coupons", report.coupons);

    let live = db.storefront().live_sales(Utc::now()).await?;
    println!();
    println!("Live sales right now: {}", live.len());
    for sale in &live {
        println!("  • {} (-{})", sale.title_en, sale.discount());
    }

    db.close().await;
    println!();
    println!("✓ Seed complete!");

    Ok(())
}

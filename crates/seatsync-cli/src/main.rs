mod db;
mod inventory;
mod products;

use std::sync::Arc;

use clap::{Parser, Subcommand};
use seatsync_db::WordPressDb;
use seatsync_inventory::{InventoryService, TicketOracle, UnavailableOracle};
use seatsync_woo::WooClient;
use tracing_subscriber::EnvFilter;

use crate::db::DbCommands;
use crate::inventory::InventoryCommands;
use crate::products::{CacheCommands, ProductsCommands};

#[derive(Debug, Parser)]
#[command(name = "seatsync")]
#[command(about = "FooEvents ticket inventory for WooCommerce")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Read or change stock for one product
    Inventory {
        #[command(subcommand)]
        command: InventoryCommands,
    },
    /// Catalog snapshot of event products
    Products {
        #[command(subcommand)]
        command: ProductsCommands,
    },
    /// Snapshot cache
    Cache {
        #[command(subcommand)]
        command: CacheCommands,
    },
    /// WordPress database diagnostics
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = seatsync_core::load_app_config_from_env()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let database = config
        .wordpress_db
        .as_ref()
        .map(WordPressDb::connect_lazy)
        .transpose()?
        .map(Arc::new);
    if database.is_none() {
        tracing::info!("no WordPress database configured; tickets sold will be unavailable");
    }

    match cli.command {
        Commands::Inventory { command } => {
            let service = build_service(&config, database.clone())?;
            inventory::run(&service, command).await?;
        }
        Commands::Products { command } => {
            let service = build_service(&config, database.clone())?;
            products::run_products(&service, &config, command).await?;
        }
        Commands::Cache { command } => products::run_cache(&config, command)?,
        Commands::Db { command } => db::run(database.as_deref(), command).await?,
    }

    if let Some(db) = database {
        db.close().await;
    }
    Ok(())
}

fn build_service(
    config: &seatsync_core::AppConfig,
    database: Option<Arc<WordPressDb>>,
) -> anyhow::Result<InventoryService> {
    let client = WooClient::new(&config.woo, config.http_timeout_secs)
        .map_err(|e| anyhow::anyhow!("failed to build WooCommerce client: {e}"))?;
    let oracle: Arc<dyn TicketOracle> = match database {
        Some(db) => db,
        None => Arc::new(UnavailableOracle),
    };
    Ok(InventoryService::new(Arc::new(client), oracle))
}

/// Prints a record as pretty JSON on stdout.
fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

//! Catalog snapshot and cache command handlers.

use clap::Subcommand;
use seatsync_core::AppConfig;
use seatsync_inventory::{
    cache_info, CachePolicy, FileSnapshotCache, InventoryService, ProductSelection,
};

/// Sub-commands available under `products`.
#[derive(Debug, Subcommand)]
pub enum ProductsCommands {
    /// List event products with their slots and dates
    List {
        /// Ignore the cached snapshot and rebuild from the store
        #[arg(long)]
        refresh: bool,
        /// Use the configured product list instead of discovering products
        #[arg(long)]
        configured: bool,
    },
}

/// Sub-commands available under `cache`.
#[derive(Debug, Subcommand)]
pub enum CacheCommands {
    /// Show what the snapshot cache holds
    Info,
}

pub(crate) async fn run_products(
    service: &InventoryService,
    config: &AppConfig,
    command: ProductsCommands,
) -> anyhow::Result<()> {
    match command {
        ProductsCommands::List {
            refresh,
            configured,
        } => {
            let selection = if configured {
                let list = seatsync_core::load_product_list(&config.products_path)?;
                ProductSelection::Configured(list.products)
            } else {
                ProductSelection::Discover
            };
            let cache = FileSnapshotCache::new(&config.cache_path);
            let policy = CachePolicy::new(config.cache_ttl());

            let snapshot = service
                .snapshot(&selection, &cache, &policy, refresh)
                .await;
            tracing::info!(
                products = snapshot.total_products,
                failed = snapshot.failed_count,
                slots = snapshot.total_slots,
                dates = snapshot.total_dates,
                "catalog snapshot ready"
            );
            crate::print_json(&snapshot)
        }
    }
}

pub(crate) fn run_cache(config: &AppConfig, command: CacheCommands) -> anyhow::Result<()> {
    match command {
        CacheCommands::Info => {
            let cache = FileSnapshotCache::new(&config.cache_path);
            crate::print_json(&cache_info(&cache))
        }
    }
}

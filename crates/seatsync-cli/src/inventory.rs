//! Inventory command handlers.

use clap::{Args, Subcommand};
use seatsync_inventory::{InventoryService, StockChange};

/// Slot and date selection shared by every inventory command.
#[derive(Debug, Args)]
pub struct Target {
    /// WooCommerce product id
    pub product_id: i64,
    /// Booking slot id; may be omitted for single-event products
    #[arg(long = "slot")]
    pub slot_id: Option<String>,
    /// Booking date id; may be omitted for single-event products
    #[arg(long = "date")]
    pub date_id: Option<String>,
}

/// Sub-commands available under `inventory`.
#[derive(Debug, Subcommand)]
pub enum InventoryCommands {
    /// Show stock, tickets sold and capacity
    Show {
        #[command(flatten)]
        target: Target,
    },
    /// Add one ticket to a date's stock
    Increment {
        #[command(flatten)]
        target: Target,
    },
    /// Remove one ticket from a date's stock
    Decrement {
        #[command(flatten)]
        target: Target,
    },
    /// Set a date's stock to an exact value
    Set {
        #[command(flatten)]
        target: Target,
        /// New stock value
        value: i64,
    },
}

pub(crate) async fn run(
    service: &InventoryService,
    command: InventoryCommands,
) -> anyhow::Result<()> {
    let (target, change) = match command {
        InventoryCommands::Show { target } => {
            let view = service
                .get_inventory(
                    target.product_id,
                    target.slot_id.as_deref(),
                    target.date_id.as_deref(),
                )
                .await?;
            return crate::print_json(&view);
        }
        InventoryCommands::Increment { target } => (target, StockChange::Increment),
        InventoryCommands::Decrement { target } => (target, StockChange::Decrement),
        InventoryCommands::Set { target, value } => (target, StockChange::Set(value)),
    };

    let outcome = service
        .apply_change(
            target.product_id,
            target.slot_id.as_deref(),
            target.date_id.as_deref(),
            change,
        )
        .await?;
    tracing::info!(
        product_id = outcome.product_id,
        slot_id = %outcome.slot_id,
        date_id = %outcome.date_id,
        old_stock = outcome.old_stock,
        new_stock = outcome.new_stock,
        "inventory updated"
    );
    crate::print_json(&outcome)
}

//! WordPress database diagnostics.

use clap::Subcommand;
use seatsync_db::{DbError, WordPressDb};

/// Sub-commands available under `db`.
#[derive(Debug, Subcommand)]
pub enum DbCommands {
    /// Check that the database answers
    Ping,
    /// Connection details, MySQL version and ticket count
    Status,
    /// Tickets issued for a product, newest first
    Tickets {
        /// WooCommerce product id
        product_id: i64,
    },
}

pub(crate) async fn run(database: Option<&WordPressDb>, command: DbCommands) -> anyhow::Result<()> {
    let Some(db) = database else {
        if matches!(command, DbCommands::Status) {
            return crate::print_json(&serde_json::json!({
                "connected": false,
                "error": DbError::NotConfigured.to_string(),
            }));
        }
        return Err(DbError::NotConfigured.into());
    };

    match command {
        DbCommands::Ping => {
            db.ping().await?;
            println!("database reachable at {}/{}", db.host(), db.database());
            Ok(())
        }
        DbCommands::Status => crate::print_json(&db.database_status().await),
        DbCommands::Tickets { product_id } => {
            let tickets = db.tickets_for_product(product_id).await?;
            tracing::info!(product_id, count = tickets.len(), "loaded tickets");
            crate::print_json(&tickets)
        }
    }
}

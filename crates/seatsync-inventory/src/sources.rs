//! The two collaborators the engine reads from and writes to.
//!
//! [`Catalog`] is the store's product API and [`TicketOracle`] the read-only
//! ticket-sales queries. Production code plugs in [`WooClient`] and
//! [`WordPressDb`]; tests plug in in-memory fakes.

use async_trait::async_trait;

use seatsync_core::{MetaEntry, Product};
use seatsync_db::{DbError, WordPressDb};
use seatsync_woo::{WooClient, WooError};

#[async_trait]
pub trait Catalog: Send + Sync {
    async fn fetch_product(&self, product_id: i64) -> Result<Product, WooError>;

    /// Replaces the listed metadata entries on the product.
    async fn patch_product_metadata(
        &self,
        product_id: i64,
        fields: &[MetaEntry],
    ) -> Result<(), WooError>;

    /// Sets the native stock quantity (and turns stock management on).
    async fn patch_product_stock(&self, product_id: i64, quantity: i64) -> Result<(), WooError>;

    async fn list_products_page(&self, page: u32, per_page: u32)
        -> Result<Vec<Product>, WooError>;
}

#[async_trait]
pub trait TicketOracle: Send + Sync {
    /// Live tickets for a product whose slot tag starts with `slot_label` and
    /// whose date tag equals `booking_date`.
    async fn tickets_sold_for_date(
        &self,
        product_id: i64,
        slot_label: &str,
        booking_date: &str,
    ) -> Result<i64, DbError>;

    /// Live tickets for a product, tags ignored.
    async fn total_tickets_for_product(&self, product_id: i64) -> Result<i64, DbError>;

    /// Whether any ticket of the product carries a slot tag.
    async fn has_slot_tickets(&self, product_id: i64) -> Result<bool, DbError>;
}

#[async_trait]
impl Catalog for WooClient {
    async fn fetch_product(&self, product_id: i64) -> Result<Product, WooError> {
        self.get_product(product_id).await
    }

    async fn patch_product_metadata(
        &self,
        product_id: i64,
        fields: &[MetaEntry],
    ) -> Result<(), WooError> {
        self.update_product_meta(product_id, fields).await
    }

    async fn patch_product_stock(&self, product_id: i64, quantity: i64) -> Result<(), WooError> {
        self.update_stock_quantity(product_id, quantity).await
    }

    async fn list_products_page(
        &self,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<Product>, WooError> {
        WooClient::list_products_page(self, page, per_page).await
    }
}

#[async_trait]
impl TicketOracle for WordPressDb {
    async fn tickets_sold_for_date(
        &self,
        product_id: i64,
        slot_label: &str,
        booking_date: &str,
    ) -> Result<i64, DbError> {
        WordPressDb::tickets_sold_for_date(self, product_id, slot_label, booking_date).await
    }

    async fn total_tickets_for_product(&self, product_id: i64) -> Result<i64, DbError> {
        WordPressDb::total_tickets_for_product(self, product_id).await
    }

    async fn has_slot_tickets(&self, product_id: i64) -> Result<bool, DbError> {
        self.has_tickets_with_slot_metadata(product_id).await
    }
}

/// Stand-in when no database is configured. Every query fails, so sales
/// figures come out as unavailable rather than zero.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableOracle;

#[async_trait]
impl TicketOracle for UnavailableOracle {
    async fn tickets_sold_for_date(&self, _: i64, _: &str, _: &str) -> Result<i64, DbError> {
        Err(DbError::NotConfigured)
    }

    async fn total_tickets_for_product(&self, _: i64) -> Result<i64, DbError> {
        Err(DbError::NotConfigured)
    }

    async fn has_slot_tickets(&self, _: i64) -> Result<bool, DbError> {
        Err(DbError::NotConfigured)
    }
}

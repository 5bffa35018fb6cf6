//! In-memory collaborators for the inventory engine.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use seatsync_core::{meta_keys, MetaEntry, Product};
use seatsync_db::DbError;
use seatsync_inventory::{Catalog, InventoryService, TicketOracle};
use seatsync_woo::WooError;
use serde_json::{json, Value};

/// A write the engine sent to the catalog.
#[derive(Debug, Clone, PartialEq)]
pub enum Write {
    Metadata { product_id: i64, fields: Vec<MetaEntry> },
    Stock { product_id: i64, quantity: i64 },
}

/// Product store that applies writes the way WooCommerce does.
#[derive(Default)]
pub struct FakeCatalog {
    products: Mutex<HashMap<i64, Product>>,
    writes: Mutex<Vec<Write>>,
    fail_writes: bool,
    stored_quantity: Option<i64>,
}

impl FakeCatalog {
    pub fn with(products: Vec<Product>) -> Self {
        Self {
            products: Mutex::new(products.into_iter().map(|p| (p.id, p)).collect()),
            ..Self::default()
        }
    }

    pub fn failing_writes(mut self) -> Self {
        self.fail_writes = true;
        self
    }

    /// Stores `quantity` whatever native stock is written, like a store
    /// that clamps or rejects the value while still answering 200.
    pub fn storing_quantity(mut self, quantity: i64) -> Self {
        self.stored_quantity = Some(quantity);
        self
    }

    pub fn writes(&self) -> Vec<Write> {
        self.writes.lock().unwrap().clone()
    }

    pub fn product(&self, product_id: i64) -> Product {
        self.products.lock().unwrap()[&product_id].clone()
    }

    /// The stored booking blob, decoded.
    pub fn booking_blob(&self, product_id: i64) -> Value {
        let product = self.product(product_id);
        let text = product
            .meta_str(meta_keys::BOOKING_OPTIONS)
            .expect("booking blob stored as a string");
        serde_json::from_str(text).unwrap()
    }

    fn write_error(product_id: i64) -> WooError {
        WooError::UnexpectedStatus {
            status: 500,
            url: format!("http://store.test/wp-json/wc/v3/products/{product_id}"),
        }
    }
}

#[async_trait]
impl Catalog for FakeCatalog {
    async fn fetch_product(&self, product_id: i64) -> Result<Product, WooError> {
        self.products
            .lock()
            .unwrap()
            .get(&product_id)
            .cloned()
            .ok_or(WooError::ProductNotFound { product_id })
    }

    async fn patch_product_metadata(
        &self,
        product_id: i64,
        fields: &[MetaEntry],
    ) -> Result<(), WooError> {
        self.writes.lock().unwrap().push(Write::Metadata {
            product_id,
            fields: fields.to_vec(),
        });
        if self.fail_writes {
            return Err(Self::write_error(product_id));
        }

        let mut products = self.products.lock().unwrap();
        let product = products
            .get_mut(&product_id)
            .ok_or(WooError::ProductNotFound { product_id })?;
        for field in fields {
            product.meta_data.retain(|entry| entry.key != field.key);
            product.meta_data.push(field.clone());
        }
        Ok(())
    }

    async fn patch_product_stock(&self, product_id: i64, quantity: i64) -> Result<(), WooError> {
        self.writes.lock().unwrap().push(Write::Stock {
            product_id,
            quantity,
        });
        if self.fail_writes {
            return Err(Self::write_error(product_id));
        }

        let mut products = self.products.lock().unwrap();
        let product = products
            .get_mut(&product_id)
            .ok_or(WooError::ProductNotFound { product_id })?;
        product.manage_stock = true;
        product.stock_quantity = Some(self.stored_quantity.unwrap_or(quantity));
        Ok(())
    }

    async fn list_products_page(
        &self,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<Product>, WooError> {
        let mut products: Vec<Product> = self.products.lock().unwrap().values().cloned().collect();
        products.sort_by_key(|p| p.id);
        let start = usize::try_from((page - 1) * per_page).unwrap();
        Ok(products
            .into_iter()
            .skip(start)
            .take(usize::try_from(per_page).unwrap())
            .collect())
    }
}

/// Oracle answering every query with fixed figures.
pub struct FixedOracle {
    pub per_date: i64,
    pub total: i64,
    pub tagged: bool,
}

#[async_trait]
impl TicketOracle for FixedOracle {
    async fn tickets_sold_for_date(&self, _: i64, _: &str, _: &str) -> Result<i64, DbError> {
        Ok(self.per_date)
    }

    async fn total_tickets_for_product(&self, _: i64) -> Result<i64, DbError> {
        Ok(self.total)
    }

    async fn has_slot_tickets(&self, _: i64) -> Result<bool, DbError> {
        Ok(self.tagged)
    }
}

/// Oracle whose database connection always times out.
pub struct DownOracle;

#[async_trait]
impl TicketOracle for DownOracle {
    async fn tickets_sold_for_date(&self, _: i64, _: &str, _: &str) -> Result<i64, DbError> {
        Err(DbError::Sqlx(sqlx::Error::PoolTimedOut))
    }

    async fn total_tickets_for_product(&self, _: i64) -> Result<i64, DbError> {
        Err(DbError::Sqlx(sqlx::Error::PoolTimedOut))
    }

    async fn has_slot_tickets(&self, _: i64) -> Result<bool, DbError> {
        Err(DbError::Sqlx(sqlx::Error::PoolTimedOut))
    }
}

pub fn service(catalog: &Arc<FakeCatalog>, oracle: impl TicketOracle + 'static) -> InventoryService {
    InventoryService::new(catalog.clone(), Arc::new(oracle))
}

/// A product as the store's REST API returns it.
pub fn product(value: Value) -> Product {
    serde_json::from_value(value).unwrap()
}

/// Single event sold through native stock.
pub fn native_event(id: i64, name: &str, quantity: i64) -> Product {
    product(json!({
        "id": id,
        "name": name,
        "price": "25.00",
        "manage_stock": true,
        "stock_quantity": quantity,
        "stock_status": "instock",
        "total_sales": 3,
        "meta_data": [
            { "id": 1, "key": "WooCommerceEventsEvent", "value": "Event" },
            { "id": 2, "key": "WooCommerceEventsDate", "value": "October 22, 2026" },
            { "id": 3, "key": "WooCommerceEventsHour", "value": "20" },
            { "id": 4, "key": "WooCommerceEventsMinutes", "value": "00" }
        ]
    }))
}

/// Product with a booking blob stored as a JSON string.
pub fn booking_product(id: i64, name: &str, blob: &Value) -> Product {
    product(json!({
        "id": id,
        "name": name,
        "price": "30.00",
        "manage_stock": false,
        "stock_quantity": null,
        "stock_status": "instock",
        "total_sales": 12,
        "meta_data": [
            { "id": 10, "key": "fooevents_bookings_options_serialized", "value": blob.to_string() }
        ]
    }))
}

/// Two slots with two nested dates each, dates listed out of order.
pub fn two_by_two_blob() -> Value {
    json!({
        "slot_early": {
            "label": "Saturday 8pm",
            "hour": "20",
            "minute": "00",
            "add_time": "enabled",
            "add_date": {
                "d_nov": { "date": "November 7, 2026", "stock": "10" },
                "d_oct": { "date": "October 31, 2026", "stock": "4" }
            }
        },
        "slot_late": {
            "label": "Saturday 10pm",
            "hour": "22",
            "minute": "00",
            "add_time": "enabled",
            "add_date": {
                "l_nov": { "date": "November 7, 2026", "stock": "20" },
                "l_oct": { "date": "October 31, 2026", "stock": "15" }
            }
        }
    })
}

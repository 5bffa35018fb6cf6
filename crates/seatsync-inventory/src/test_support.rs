//! Product fixtures shared by the unit tests.

use serde_json::Value;

use seatsync_core::{meta_keys, MetaEntry, Product};

pub(crate) fn product(id: i64, name: &str) -> Product {
    Product {
        id,
        name: name.to_string(),
        price: "20.00".to_string(),
        manage_stock: false,
        stock_quantity: None,
        stock_status: Some("instock".to_string()),
        total_sales: 0,
        meta_data: Vec::new(),
    }
}

pub(crate) fn with_native_stock(mut product: Product, quantity: i64) -> Product {
    product.manage_stock = true;
    product.stock_quantity = Some(quantity);
    product
}

pub(crate) fn with_event_flag(mut product: Product) -> Product {
    product
        .meta_data
        .push(MetaEntry::new(meta_keys::EVENT_FLAG, meta_keys::EVENT_FLAG_VALUE));
    product
}

/// Attaches a booking blob encoded as a JSON string, the way the store
/// returns it.
pub(crate) fn with_blob(mut product: Product, blob: &Value) -> Product {
    product
        .meta_data
        .push(MetaEntry::new(meta_keys::BOOKING_OPTIONS, blob.to_string()));
    product
}

pub(crate) fn with_meta(mut product: Product, key: &str, value: impl Into<Value>) -> Product {
    product.meta_data.push(MetaEntry::new(key, value));
    product
}

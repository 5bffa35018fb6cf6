//! Booking map extraction.
//!
//! Single-event products are given a one-slot, one-date booking map so every
//! shape flows through the same model. The map follows a fixed naming
//! convention (`event_N`, `date_N_add_date`, `date_N_stock`) and is
//! recognized again when it comes back from the store.

use serde_json::{Map, Value};

use seatsync_core::{meta_keys, Product};

use crate::booking::{synthetic_date_id, synthetic_slot_id, BookingMap, StockValue};
use crate::classify::{BookingShape, Classification};
use crate::error::InventoryError;

/// Stock reported for a single event whose stock the store does not manage.
pub const UNMANAGED_STOCK: i64 = 999;

/// Builds the canonical booking map for a classified product.
///
/// # Errors
///
/// Returns [`InventoryError::Unclassifiable`] if a multi-booking
/// classification arrives without its blob.
pub fn extract(
    product: &Product,
    classification: &Classification,
) -> Result<BookingMap, InventoryError> {
    match classification.shape {
        BookingShape::MultiBooking => {
            classification
                .blob
                .clone()
                .ok_or(InventoryError::Unclassifiable {
                    product_id: product.id,
                })
        }
        BookingShape::SingleNativeStock => {
            let stock = product.stock_quantity.unwrap_or(0);
            Ok(synthesize(product, stock))
        }
        BookingShape::SingleSynthetic => {
            let stored = classification
                .blob
                .as_ref()
                .filter(|b| b.is_synthetic_for(product.id));
            let stock = synthetic_stock(product, stored);
            Ok(build_synthetic(product, stock, stored))
        }
    }
}

/// Stock for a synthetic single event: what an earlier write left in the
/// synthetic map, else the native quantity, else a placeholder.
fn synthetic_stock(product: &Product, stored: Option<&BookingMap>) -> i64 {
    let from_blob = stored
        .and_then(|b| b.slots().first())
        .and_then(|slot| slot.dates.first())
        .and_then(|date| match &date.stock {
            StockValue::Count(n) => Some(*n),
            StockValue::Malformed(raw) => {
                tracing::warn!(product_id = product.id, raw = %raw, "ignoring malformed synthetic stock");
                None
            }
        });

    from_blob
        .or(product.stock_quantity)
        .unwrap_or(if product.manage_stock { 0 } else { UNMANAGED_STOCK })
}

/// The one-slot, one-date map for a single-event product.
///
/// Event date and time come from the product's event meta, defaulting to an
/// empty date and `00:00`.
#[must_use]
pub fn synthesize(product: &Product, stock: i64) -> BookingMap {
    build_synthetic(product, stock, None)
}

/// Like [`synthesize`], but fields the event meta lacks are taken from a
/// synthetic map already stored on the product before falling back to the
/// defaults.
fn build_synthetic(product: &Product, stock: i64, stored: Option<&BookingMap>) -> BookingMap {
    let date_id = synthetic_date_id(product.id);
    let stored_slot = stored
        .and_then(|b| b.raw().get(&synthetic_slot_id(product.id)))
        .and_then(Value::as_object);

    let event_field = |meta_key: &str, slot_key: &str, default: &str| -> Value {
        let text = |value: &Value| match value {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        };
        let value = product
            .meta(meta_key)
            .and_then(text)
            .or_else(|| stored_slot.and_then(|slot| slot.get(slot_key)).and_then(text))
            .unwrap_or_else(|| default.to_string());
        Value::String(value)
    };

    let mut slot = Map::new();
    slot.insert(
        "label".to_string(),
        Value::String(format!("{} Show", product.name)),
    );
    slot.insert("hour".to_string(), event_field(meta_keys::EVENT_HOUR, "hour", "00"));
    slot.insert(
        "minute".to_string(),
        event_field(meta_keys::EVENT_MINUTES, "minute", "00"),
    );
    slot.insert(
        "period".to_string(),
        event_field(meta_keys::EVENT_PERIOD, "period", ""),
    );
    slot.insert("add_time".to_string(), Value::String("enabled".to_string()));
    let add_date = format!("{date_id}_add_date");
    slot.insert(add_date.clone(), event_field(meta_keys::EVENT_DATE, &add_date, ""));
    slot.insert(format!("{date_id}_stock"), Value::String(stock.to_string()));

    let mut raw = Map::new();
    raw.insert(synthetic_slot_id(product.id), Value::Object(slot));
    BookingMap::from_raw(raw)
}
